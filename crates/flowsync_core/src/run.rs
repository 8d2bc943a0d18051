//! Run records.
//!
//! A [`Run`] is one execution attempt belonging to exactly one flow. Runs
//! form an append-only history: once a run reaches a terminal state it is
//! never mutated again, though history may be purged in bulk.

use crate::time::UnixMillis;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The lifecycle state of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// Created by the scheduler, waiting to become due.
    Pending,
    /// Claimed by the executor.
    Running,
    /// Completed; cursor advanced and bounds recorded (terminal).
    Success,
    /// Aborted with an error; cursor untouched (terminal).
    Failed,
}

impl RunStatus {
    /// Returns true for [`RunStatus::Success`] and [`RunStatus::Failed`].
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunStatus::Success | RunStatus::Failed)
    }

    /// Returns the status as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Pending => "pending",
            RunStatus::Running => "running",
            RunStatus::Success => "success",
            RunStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One execution attempt of a flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Run {
    /// Ledger-assigned id, monotonically increasing.
    pub id: u64,
    /// Name of the owning flow.
    pub flow_name: String,
    /// Lifecycle state.
    pub status: RunStatus,
    /// Earliest timestamp at which the run is eligible to execute.
    pub run_after: UnixMillis,
    /// Set on the transition into `Running`.
    pub started_at: Option<UnixMillis>,
    /// Set on the transition into a terminal state.
    pub ended_at: Option<UnixMillis>,
    /// Lowest source id actually processed in this run.
    pub first_id: Option<u64>,
    /// Highest source id actually processed in this run.
    pub last_id: Option<u64>,
    /// Short error summary, populated only on `Failed`.
    pub error_message: Option<String>,
    /// Full error detail, populated only on `Failed`.
    pub error_detail: Option<String>,
    /// When the run row was created.
    pub created_at: UnixMillis,
}

impl Run {
    /// Creates a pending run eligible at `run_after`.
    pub fn pending(
        id: u64,
        flow_name: impl Into<String>,
        run_after: UnixMillis,
        created_at: UnixMillis,
    ) -> Self {
        Self {
            id,
            flow_name: flow_name.into(),
            status: RunStatus::Pending,
            run_after,
            started_at: None,
            ended_at: None,
            first_id: None,
            last_id: None,
            error_message: None,
            error_detail: None,
            created_at,
        }
    }

    /// A run is due when it is still pending and its `run_after` has passed.
    pub fn is_due(&self, now: UnixMillis) -> bool {
        self.status == RunStatus::Pending && self.run_after <= now
    }

    /// Returns true once the run has reached `Success` or `Failed`.
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Wall-clock duration of the execution, if it both started and ended.
    pub fn duration_millis(&self) -> Option<u64> {
        match (self.started_at, self.ended_at) {
            (Some(start), Some(end)) => Some(end.saturating_sub(start)),
            _ => None,
        }
    }
}
