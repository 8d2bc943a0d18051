//! Flowsync CLI
//!
//! Command-line frontend for the Flowsync sync engine.
//!
//! # Commands
//!
//! - `seed` - Create a state file with the demo catalog and flow
//! - `heartbeat` - Schedule and execute due runs (manual or cron trigger)
//! - `flows` - List registered flows
//! - `runs` - Show the run history of a flow
//! - `exports` - Show destination rows
//! - `toggle` - Flip a flow between active and inactive
//! - `reset` - Clear cursors so flows reprocess from the beginning
//! - `purge` - Delete run history

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Flowsync command-line sync tools.
#[derive(Parser)]
#[command(name = "flowsync")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the state file
    #[arg(global = true, short, long, default_value = "flowsync.json")]
    state: PathBuf,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a state file seeded with the demo catalog and flow
    Seed {
        /// Overwrite an existing state file
        #[arg(short, long)]
        force: bool,
    },

    /// Schedule and execute due runs for all active flows
    Heartbeat {
        /// Keep running, sleeping the flows' configured interval between
        /// heartbeats
        #[arg(short, long)]
        watch: bool,
    },

    /// List registered flows
    Flows {
        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Show the run history of a flow
    Runs {
        /// Flow name
        flow: String,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Show destination rows
    Exports {
        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Flip a flow between active and inactive
    Toggle {
        /// Flow name
        flow: String,
    },

    /// Clear cursors so flows reprocess from the beginning
    Reset {
        /// Reset only this flow
        #[arg(short, long)]
        flow: Option<String>,
    },

    /// Delete run history
    Purge {
        /// Purge only this flow's runs
        #[arg(short, long)]
        flow: Option<String>,
    },

    /// Show version information
    Version,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Commands::Seed { force } => {
            commands::seed::run(&cli.state, force)?;
        }
        Commands::Heartbeat { watch } => {
            commands::heartbeat::run(&cli.state, watch)?;
        }
        Commands::Flows { format } => {
            commands::flows::run(&cli.state, &format)?;
        }
        Commands::Runs { flow, format } => {
            commands::runs::run(&cli.state, &flow, &format)?;
        }
        Commands::Exports { format } => {
            commands::exports::run(&cli.state, &format)?;
        }
        Commands::Toggle { flow } => {
            commands::toggle::run(&cli.state, &flow)?;
        }
        Commands::Reset { flow } => {
            commands::reset::run(&cli.state, flow.as_deref())?;
        }
        Commands::Purge { flow } => {
            commands::purge::run(&cli.state, flow.as_deref())?;
        }
        Commands::Version => {
            println!("Flowsync CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("Flowsync Core v{}", flowsync_core::VERSION);
        }
    }

    Ok(())
}
