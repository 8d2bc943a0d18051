//! Purge command implementation.
//!
//! Deletes run history. Cursors are untouched, so purging never changes
//! what the next run processes.

use super::{load_service, save_service};
use std::path::Path;

/// Runs the purge command.
pub fn run(path: &Path, flow: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let (service, store) = load_service(path)?;

    let count = match flow {
        Some(name) => {
            let count = service.purge_flow_runs(name)?;
            println!("Purged {count} run(s) for '{name}'");
            count
        }
        None => {
            let count = service.purge_run_history()?;
            println!("Purged {count} run(s)");
            count
        }
    };

    if count > 0 {
        save_service(&service, &store)?;
    }
    Ok(())
}
