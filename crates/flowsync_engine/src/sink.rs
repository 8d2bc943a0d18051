//! Sink connector: the destination table, keyed by business key.

use crate::error::{EngineError, EngineResult};
use flowsync_core::TransformedRecord;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};

/// Writes transformed records to the destination table.
///
/// The destination holds at most one row per business key (the source
/// record's id); `upsert` overwrites in place, which is what makes
/// re-delivery idempotent.
pub trait ExportSink: Send + Sync {
    /// Looks up the last written row for a business key.
    fn find(&self, source_id: u64) -> EngineResult<Option<TransformedRecord>>;

    /// Inserts or overwrites the row for the record's business key.
    fn upsert(&self, record: &TransformedRecord) -> EngineResult<()>;

    /// Returns every destination row, ascending by business key.
    fn rows(&self) -> EngineResult<Vec<TransformedRecord>>;
}

/// An in-memory destination table.
///
/// `set_available(false)` makes every write fail, simulating destination
/// connectivity loss.
#[derive(Debug, Default)]
pub struct MemoryExportSink {
    rows: RwLock<BTreeMap<u64, TransformedRecord>>,
    available: AtomicBool,
}

impl MemoryExportSink {
    /// Creates an empty, available sink.
    pub fn new() -> Self {
        Self {
            rows: RwLock::new(BTreeMap::new()),
            available: AtomicBool::new(true),
        }
    }

    /// Restores a sink from previously persisted rows.
    pub fn from_rows(rows: Vec<TransformedRecord>) -> Self {
        Self {
            rows: RwLock::new(rows.into_iter().map(|r| (r.source_id, r)).collect()),
            available: AtomicBool::new(true),
        }
    }

    /// Number of destination rows.
    pub fn len(&self) -> usize {
        self.rows.read().len()
    }

    /// Returns true when the destination is empty.
    pub fn is_empty(&self) -> bool {
        self.rows.read().is_empty()
    }

    /// Removes every destination row. Returns the count removed.
    pub fn clear(&self) -> usize {
        let mut rows = self.rows.write();
        let count = rows.len();
        rows.clear();
        count
    }

    /// Toggles availability for fault injection.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }
}

impl ExportSink for MemoryExportSink {
    fn find(&self, source_id: u64) -> EngineResult<Option<TransformedRecord>> {
        Ok(self.rows.read().get(&source_id).cloned())
    }

    fn upsert(&self, record: &TransformedRecord) -> EngineResult<()> {
        if !self.available.load(Ordering::SeqCst) {
            return Err(EngineError::SinkWrite("destination unavailable".into()));
        }
        self.rows.write().insert(record.source_id, record.clone());
        Ok(())
    }

    fn rows(&self) -> EngineResult<Vec<TransformedRecord>> {
        Ok(self.rows.read().values().cloned().collect())
    }
}
