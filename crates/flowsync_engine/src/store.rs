//! JSON state file: durability for flows, runs and destination rows.
//!
//! The engine works against in-memory stores; the state file is the
//! durable snapshot they are restored from at startup and saved to after
//! every command. Saves go through a temp file and an atomic rename so a
//! crash mid-write never leaves a torn state file behind.

use crate::error::EngineResult;
use flowsync_core::{Flow, Run, SourceRecord, TransformedRecord};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Everything the engine persists between invocations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PersistedState {
    /// Registered flows, including cursors and run summaries.
    pub flows: Vec<Flow>,
    /// Run history.
    pub runs: Vec<Run>,
    /// Ledger id counter, so run ids stay unique across restarts.
    pub next_run_id: u64,
    /// The demo source table.
    pub source_records: Vec<SourceRecord>,
    /// Destination rows, keyed by business key.
    pub exports: Vec<TransformedRecord>,
}

/// A JSON state file on disk.
#[derive(Debug, Clone)]
pub struct StateFile {
    path: PathBuf,
}

impl StateFile {
    /// Creates a handle for the given path. The file need not exist yet.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the underlying path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the persisted state, or `None` when the file does not exist.
    pub fn load(&self) -> EngineResult<Option<PersistedState>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let bytes = fs::read(&self.path)?;
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    /// Saves the state: temp file, then atomic rename.
    pub fn save(&self, state: &PersistedState) -> EngineResult<()> {
        let bytes = serde_json::to_vec_pretty(state)?;

        let mut tmp = self.path.clone();
        tmp.set_extension("json.tmp");
        fs::write(&tmp, &bytes)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}
