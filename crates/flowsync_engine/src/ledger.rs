//! Run ledger: the durable log of execution attempts.

use crate::error::{EngineError, EngineResult};
use flowsync_core::{Run, RunStatus, UnixMillis};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// Storage contract for run records.
///
/// Runs are append-only history: terminal runs are never mutated, only
/// purged in bulk. [`RunLedger::schedule_pending`] is the scheduler's
/// idempotence guard and must be atomic — check and insert under one
/// critical section, never check-then-act across two calls.
pub trait RunLedger: Send + Sync {
    /// Creates a pending run with `run_after = now` unless a pending run
    /// with `run_after <= now` already exists for the flow.
    ///
    /// Returns the new run, or `None` when a due pending run already
    /// covers this flow. A pending run scheduled in the future does not
    /// suppress creating an immediate one.
    fn schedule_pending(&self, flow_name: &str, now: UnixMillis) -> EngineResult<Option<Run>>;

    /// Claims a pending run for execution: `Pending -> Running`.
    ///
    /// Fails with [`EngineError::InvalidRunTransition`] if the run is not
    /// pending, enforcing at-most-one executor per run.
    fn claim(&self, run_id: u64, now: UnixMillis) -> EngineResult<Run>;

    /// Closes a running run as `Success`, recording the processed id
    /// bounds (`None` for an empty batch).
    fn close_success(
        &self,
        run_id: u64,
        now: UnixMillis,
        bounds: Option<(u64, u64)>,
    ) -> EngineResult<Run>;

    /// Closes a running run as `Failed`, recording the error.
    fn close_failed(
        &self,
        run_id: u64,
        now: UnixMillis,
        message: &str,
        detail: &str,
    ) -> EngineResult<Run>;

    /// Returns a run by id.
    fn get(&self, run_id: u64) -> EngineResult<Option<Run>>;

    /// Returns every due pending run across all flows, ordered by id.
    fn due_runs(&self, now: UnixMillis) -> EngineResult<Vec<Run>>;

    /// Returns the run history for one flow, newest first.
    fn runs_for_flow(&self, flow_name: &str) -> EngineResult<Vec<Run>>;

    /// Returns runs stuck in `Running` that started at or before `cutoff`.
    fn stale_running(&self, cutoff: UnixMillis) -> EngineResult<Vec<Run>>;

    /// Deletes the run history for one flow. Returns the count removed.
    fn purge_flow(&self, flow_name: &str) -> EngineResult<usize>;

    /// Deletes all run history. Returns the count removed.
    fn purge_all(&self) -> EngineResult<usize>;
}

/// An in-memory run ledger.
#[derive(Debug, Default)]
pub struct MemoryRunLedger {
    runs: RwLock<BTreeMap<u64, Run>>,
    next_run_id: AtomicU64,
}

impl MemoryRunLedger {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Self {
            runs: RwLock::new(BTreeMap::new()),
            next_run_id: AtomicU64::new(1),
        }
    }

    /// Restores a ledger from previously persisted runs.
    ///
    /// The id counter resumes past both the persisted counter and the
    /// highest run id present, whichever is larger.
    pub fn from_runs(runs: Vec<Run>, next_run_id: u64) -> Self {
        let max_id = runs.iter().map(|r| r.id).max().unwrap_or(0);
        Self {
            runs: RwLock::new(runs.into_iter().map(|r| (r.id, r)).collect()),
            next_run_id: AtomicU64::new(next_run_id.max(max_id + 1)),
        }
    }

    /// Snapshots every run plus the id counter for persistence.
    pub fn snapshot(&self) -> (Vec<Run>, u64) {
        (
            self.runs.read().values().cloned().collect(),
            self.next_run_id.load(Ordering::SeqCst),
        )
    }

    fn close(
        &self,
        run_id: u64,
        now: UnixMillis,
        to: RunStatus,
        f: impl FnOnce(&mut Run),
    ) -> EngineResult<Run> {
        let mut runs = self.runs.write();
        let run = runs
            .get_mut(&run_id)
            .ok_or(EngineError::RunNotFound(run_id))?;
        if run.status != RunStatus::Running {
            return Err(EngineError::InvalidRunTransition {
                run_id,
                from: run.status.as_str().into(),
                to: to.as_str().into(),
            });
        }
        run.status = to;
        run.ended_at = Some(now);
        f(run);
        Ok(run.clone())
    }
}

impl RunLedger for MemoryRunLedger {
    fn schedule_pending(&self, flow_name: &str, now: UnixMillis) -> EngineResult<Option<Run>> {
        // Check and insert under one write lock: the guard is structural,
        // two overlapping ticks cannot both insert.
        let mut runs = self.runs.write();
        let already_due = runs
            .values()
            .any(|r| r.flow_name == flow_name && r.status == RunStatus::Pending && r.run_after <= now);
        if already_due {
            return Ok(None);
        }

        let id = self.next_run_id.fetch_add(1, Ordering::SeqCst);
        let run = Run::pending(id, flow_name, now, now);
        runs.insert(id, run.clone());
        Ok(Some(run))
    }

    fn claim(&self, run_id: u64, now: UnixMillis) -> EngineResult<Run> {
        let mut runs = self.runs.write();
        let run = runs
            .get_mut(&run_id)
            .ok_or(EngineError::RunNotFound(run_id))?;
        if run.status != RunStatus::Pending {
            return Err(EngineError::InvalidRunTransition {
                run_id,
                from: run.status.as_str().into(),
                to: RunStatus::Running.as_str().into(),
            });
        }
        run.status = RunStatus::Running;
        run.started_at = Some(now);
        Ok(run.clone())
    }

    fn close_success(
        &self,
        run_id: u64,
        now: UnixMillis,
        bounds: Option<(u64, u64)>,
    ) -> EngineResult<Run> {
        self.close(run_id, now, RunStatus::Success, |run| {
            if let Some((first, last)) = bounds {
                run.first_id = Some(first);
                run.last_id = Some(last);
            }
        })
    }

    fn close_failed(
        &self,
        run_id: u64,
        now: UnixMillis,
        message: &str,
        detail: &str,
    ) -> EngineResult<Run> {
        self.close(run_id, now, RunStatus::Failed, |run| {
            run.error_message = Some(message.to_string());
            run.error_detail = Some(detail.to_string());
        })
    }

    fn get(&self, run_id: u64) -> EngineResult<Option<Run>> {
        Ok(self.runs.read().get(&run_id).cloned())
    }

    fn due_runs(&self, now: UnixMillis) -> EngineResult<Vec<Run>> {
        Ok(self
            .runs
            .read()
            .values()
            .filter(|r| r.is_due(now))
            .cloned()
            .collect())
    }

    fn runs_for_flow(&self, flow_name: &str) -> EngineResult<Vec<Run>> {
        let mut runs: Vec<Run> = self
            .runs
            .read()
            .values()
            .filter(|r| r.flow_name == flow_name)
            .cloned()
            .collect();
        runs.reverse();
        Ok(runs)
    }

    fn stale_running(&self, cutoff: UnixMillis) -> EngineResult<Vec<Run>> {
        Ok(self
            .runs
            .read()
            .values()
            .filter(|r| {
                r.status == RunStatus::Running && r.started_at.is_some_and(|s| s <= cutoff)
            })
            .cloned()
            .collect())
    }

    fn purge_flow(&self, flow_name: &str) -> EngineResult<usize> {
        let mut runs = self.runs.write();
        let before = runs.len();
        runs.retain(|_, r| r.flow_name != flow_name);
        Ok(before - runs.len())
    }

    fn purge_all(&self) -> EngineResult<usize> {
        let mut runs = self.runs.write();
        let count = runs.len();
        runs.clear();
        Ok(count)
    }
}
