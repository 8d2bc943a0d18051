//! Flow registry: storage for flow definitions.

use crate::error::{EngineError, EngineResult};
use flowsync_core::{Flow, FlowStatus, UnixMillis};
use parking_lot::RwLock;
use std::collections::BTreeMap;

/// Storage contract for flow definitions.
///
/// All mutations are single-entry last-write-wins; no flow-level locking is
/// required because the scheduler's run-uniqueness guard already prevents
/// concurrent processing of the same flow.
pub trait FlowRegistry: Send + Sync {
    /// Registers a flow unless one with the same name exists.
    ///
    /// Returns true if the flow was inserted, false if it already existed
    /// (registration is a no-op in that case).
    fn insert_if_absent(&self, flow: Flow) -> EngineResult<bool>;

    /// Returns every registered flow, ordered by name.
    fn list_all(&self) -> EngineResult<Vec<Flow>>;

    /// Returns every active flow, ordered by name.
    fn list_active(&self) -> EngineResult<Vec<Flow>>;

    /// Looks up a flow by its unique name.
    fn find_by_name(&self, name: &str) -> EngineResult<Option<Flow>>;

    /// Sets the flow's status.
    fn update_status(&self, name: &str, status: FlowStatus) -> EngineResult<()>;

    /// Advances the cursor to `cursor`.
    ///
    /// Rejects regression: the cursor only moves forward, except through
    /// [`FlowRegistry::reset_cursor`].
    fn advance_cursor(&self, name: &str, cursor: u64) -> EngineResult<()>;

    /// Clears the cursor so the next run reprocesses from the beginning.
    fn reset_cursor(&self, name: &str) -> EngineResult<()>;

    /// Clears every flow's cursor. Returns the number of flows touched.
    fn reset_all_cursors(&self) -> EngineResult<usize>;

    /// Records the most-recent-run summary shown alongside the flow.
    fn record_run_summary(
        &self,
        name: &str,
        last_run_at: UnixMillis,
        last_error: Option<String>,
    ) -> EngineResult<()>;
}

/// An in-memory flow registry.
#[derive(Debug, Default)]
pub struct MemoryFlowRegistry {
    flows: RwLock<BTreeMap<String, Flow>>,
}

impl MemoryFlowRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restores a registry from previously persisted flows.
    pub fn from_flows(flows: Vec<Flow>) -> Self {
        Self {
            flows: RwLock::new(flows.into_iter().map(|f| (f.name.clone(), f)).collect()),
        }
    }

    /// Snapshots every flow for persistence.
    pub fn snapshot(&self) -> Vec<Flow> {
        self.flows.read().values().cloned().collect()
    }

    fn with_flow<T>(
        &self,
        name: &str,
        f: impl FnOnce(&mut Flow) -> EngineResult<T>,
    ) -> EngineResult<T> {
        let mut flows = self.flows.write();
        let flow = flows
            .get_mut(name)
            .ok_or_else(|| EngineError::FlowNotFound(name.to_string()))?;
        f(flow)
    }
}

impl FlowRegistry for MemoryFlowRegistry {
    fn insert_if_absent(&self, flow: Flow) -> EngineResult<bool> {
        let mut flows = self.flows.write();
        if flows.contains_key(&flow.name) {
            return Ok(false);
        }
        flows.insert(flow.name.clone(), flow);
        Ok(true)
    }

    fn list_all(&self) -> EngineResult<Vec<Flow>> {
        Ok(self.flows.read().values().cloned().collect())
    }

    fn list_active(&self) -> EngineResult<Vec<Flow>> {
        Ok(self
            .flows
            .read()
            .values()
            .filter(|f| f.is_active())
            .cloned()
            .collect())
    }

    fn find_by_name(&self, name: &str) -> EngineResult<Option<Flow>> {
        Ok(self.flows.read().get(name).cloned())
    }

    fn update_status(&self, name: &str, status: FlowStatus) -> EngineResult<()> {
        self.with_flow(name, |flow| {
            flow.status = status;
            Ok(())
        })
    }

    fn advance_cursor(&self, name: &str, cursor: u64) -> EngineResult<()> {
        self.with_flow(name, |flow| {
            if let Some(current) = flow.cursor {
                if cursor < current {
                    return Err(EngineError::CursorRegression {
                        flow: flow.name.clone(),
                        from: current,
                        to: cursor,
                    });
                }
            }
            flow.cursor = Some(cursor);
            Ok(())
        })
    }

    fn reset_cursor(&self, name: &str) -> EngineResult<()> {
        self.with_flow(name, |flow| {
            flow.cursor = None;
            Ok(())
        })
    }

    fn reset_all_cursors(&self) -> EngineResult<usize> {
        let mut flows = self.flows.write();
        for flow in flows.values_mut() {
            flow.cursor = None;
        }
        Ok(flows.len())
    }

    fn record_run_summary(
        &self,
        name: &str,
        last_run_at: UnixMillis,
        last_error: Option<String>,
    ) -> EngineResult<()> {
        self.with_flow(name, |flow| {
            flow.last_run_at = Some(last_run_at);
            flow.last_error = last_error;
            Ok(())
        })
    }
}
