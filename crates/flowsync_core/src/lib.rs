//! # Flowsync Core
//!
//! Domain model for the Flowsync incremental sync engine.
//!
//! This crate provides:
//! - Flow definitions (name, specs, status, cursor position)
//! - Run records (the durable log of execution attempts)
//! - Source and transformed record types
//! - Timestamp helpers
//! - Validation errors
//!
//! ## Key Invariants
//!
//! - A flow's cursor only advances forward within successful runs
//! - Runs reaching a terminal state are never mutated again
//! - Destination rows are keyed by the source record's id, one row per key

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod flow;
mod record;
mod run;
mod time;

pub use error::{CoreError, CoreResult};
pub use flow::{Flow, FlowStatus, RuntimeSpec, SinkSpec, SourceScope, SourceSpec};
pub use record::{SourceRecord, TransformedRecord};
pub use run::{Run, RunStatus};
pub use time::{now_millis, UnixMillis};

/// Crate version, surfaced by the CLI.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
