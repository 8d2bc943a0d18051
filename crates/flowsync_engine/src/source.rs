//! Source connector: cursor-bounded batch reads.

use crate::error::{EngineError, EngineResult};
use flowsync_core::{SourceRecord, SourceScope, SourceSpec};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};

/// Reads batches from the source table.
///
/// Implementations must return records with `id > after` (everything when
/// `after` is `None`), filtered to the spec's scope, in strictly ascending
/// id order, at most `limit` of them. The executor relies on this ordering
/// to advance the cursor safely.
pub trait SourceReader: Send + Sync {
    /// Fetches the next batch after the given cursor position.
    fn fetch_batch(
        &self,
        spec: &SourceSpec,
        after: Option<u64>,
        limit: u32,
    ) -> EngineResult<Vec<SourceRecord>>;
}

/// An in-memory source table.
///
/// Doubles as the test double: `set_available(false)` makes every fetch
/// fail with a retryable read error, simulating source connectivity loss.
#[derive(Debug, Default)]
pub struct MemorySource {
    records: RwLock<BTreeMap<u64, SourceRecord>>,
    available: AtomicBool,
}

impl MemorySource {
    /// Creates an empty, available source.
    pub fn new() -> Self {
        Self {
            records: RwLock::new(BTreeMap::new()),
            available: AtomicBool::new(true),
        }
    }

    /// Restores a source from previously persisted records.
    pub fn from_records(records: Vec<SourceRecord>) -> Self {
        let source = Self::new();
        source.insert_all(records);
        source
    }

    /// Inserts or replaces a record by id.
    pub fn insert(&self, record: SourceRecord) {
        self.records.write().insert(record.id, record);
    }

    /// Inserts or replaces a batch of records.
    pub fn insert_all(&self, records: Vec<SourceRecord>) {
        let mut map = self.records.write();
        for record in records {
            map.insert(record.id, record);
        }
    }

    /// Snapshots every record for persistence, ascending by id.
    pub fn snapshot(&self) -> Vec<SourceRecord> {
        self.records.read().values().cloned().collect()
    }

    /// Number of records in the table.
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    /// Returns true when the table is empty.
    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    /// Toggles availability for fault injection.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }
}

impl SourceReader for MemorySource {
    fn fetch_batch(
        &self,
        spec: &SourceSpec,
        after: Option<u64>,
        limit: u32,
    ) -> EngineResult<Vec<SourceRecord>> {
        if !self.available.load(Ordering::SeqCst) {
            return Err(EngineError::source_unavailable("source unavailable"));
        }

        let records = self.records.read();
        let start = match after {
            Some(id) => std::ops::Bound::Excluded(id),
            None => std::ops::Bound::Unbounded,
        };
        Ok(records
            .range((start, std::ops::Bound::Unbounded))
            .map(|(_, r)| r)
            .filter(|r| match spec.scope {
                SourceScope::All => true,
                SourceScope::ActiveOnly => r.active,
            })
            .take(limit as usize)
            .cloned()
            .collect())
    }
}
