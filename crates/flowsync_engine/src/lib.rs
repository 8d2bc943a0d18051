//! # Flowsync Engine
//!
//! Incremental data-synchronization engine.
//!
//! This crate provides:
//! - Flow registry and run ledger storage traits with in-memory backends
//! - Scheduler (heartbeat tick, pending-run uniqueness guard)
//! - Executor (cursor-bounded batch processing)
//! - Transform stage (price and category normalization)
//! - Collision resolver (new / updated / redundant classification)
//! - A service facade exposing the external entry points
//! - A JSON state file for durability
//!
//! ## Architecture
//!
//! An external trigger calls [`SyncService::trigger_heartbeat`]. The
//! scheduler ensures every active flow has at most one due pending run,
//! then the executor claims each due run, pulls a batch from the source
//! starting at the flow's cursor, transforms every record, lets the
//! collision resolver decide whether a write is needed, advances the
//! cursor and closes the run.
//!
//! ## Key Invariants
//!
//! - At most one due pending run per flow at any time
//! - Within a run, records are processed in ascending source-id order
//! - The cursor only advances to the id of the last processed record
//! - A failed run leaves the cursor untouched; the window is retried
//! - Destination writes are idempotent per business key, so re-delivery
//!   after a crash or retry produces identical destination state

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod collision;
mod config;
mod error;
mod executor;
mod ledger;
mod registry;
mod scheduler;
mod service;
mod sink;
mod source;
mod store;
mod transform;

pub use collision::{resolve, FieldChange, Resolution, WriteOutcome};
pub use config::EngineConfig;
pub use error::{EngineError, EngineResult};
pub use executor::{Executor, RunReport};
pub use ledger::{MemoryRunLedger, RunLedger};
pub use registry::{FlowRegistry, MemoryFlowRegistry};
pub use scheduler::{FlowFailure, HeartbeatReport, Scheduler, TickReport};
pub use service::{MemorySyncService, SyncService};
pub use sink::{ExportSink, MemoryExportSink};
pub use source::{MemorySource, SourceReader};
pub use store::{PersistedState, StateFile};
pub use transform::{price_to_cents, slugify, transform, FALLBACK_CATEGORY};
