//! Flow definitions.
//!
//! A [`Flow`] is a named, user-configurable pipeline: where to read
//! ([`SourceSpec`]), where to write ([`SinkSpec`]), how much work to do per
//! run ([`RuntimeSpec`]), and how far it has already read (the cursor).

use crate::error::{CoreError, CoreResult};
use crate::time::UnixMillis;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether a flow participates in scheduling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowStatus {
    /// The flow is scheduled on every heartbeat.
    Active,
    /// The flow is registered but not scheduled.
    Inactive,
}

impl FlowStatus {
    /// Returns true for [`FlowStatus::Active`].
    pub fn is_active(&self) -> bool {
        matches!(self, FlowStatus::Active)
    }

    /// Returns the opposite status (administrative toggle).
    pub fn toggled(&self) -> FlowStatus {
        match self {
            FlowStatus::Active => FlowStatus::Inactive,
            FlowStatus::Inactive => FlowStatus::Active,
        }
    }

    /// Returns the status as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            FlowStatus::Active => "active",
            FlowStatus::Inactive => "inactive",
        }
    }
}

impl fmt::Display for FlowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which slice of the source table a flow reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceScope {
    /// Every source record.
    All,
    /// Only records flagged active.
    ActiveOnly,
}

/// Source configuration persisted with the flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSpec {
    /// Scope applied when fetching batches.
    pub scope: SourceScope,
}

impl SourceSpec {
    /// Spec reading every source record.
    pub fn all() -> Self {
        Self {
            scope: SourceScope::All,
        }
    }

    /// Spec reading only active records.
    pub fn active_only() -> Self {
        Self {
            scope: SourceScope::ActiveOnly,
        }
    }
}

impl Default for SourceSpec {
    fn default() -> Self {
        Self::active_only()
    }
}

/// Sink configuration persisted with the flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SinkSpec {
    /// Logical name of the destination table.
    pub target: String,
}

impl SinkSpec {
    /// Creates a sink spec for the given destination.
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
        }
    }

    /// Validates the spec.
    pub fn validate(&self) -> CoreResult<()> {
        if self.target.trim().is_empty() {
            return Err(CoreError::InvalidSinkSpec {
                reason: "target must not be empty".into(),
            });
        }
        Ok(())
    }
}

impl Default for SinkSpec {
    fn default() -> Self {
        Self::new("exports")
    }
}

/// Runtime configuration persisted with the flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeSpec {
    /// Maximum number of source records processed per run.
    pub batch_size: u32,
    /// Intended heartbeat cadence, in seconds.
    pub interval_secs: u64,
}

impl RuntimeSpec {
    /// Creates a runtime spec with the given batch size.
    pub fn new(batch_size: u32) -> Self {
        Self {
            batch_size,
            interval_secs: 10,
        }
    }

    /// Sets the batch size.
    pub fn with_batch_size(mut self, batch_size: u32) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Sets the heartbeat cadence.
    pub fn with_interval_secs(mut self, interval_secs: u64) -> Self {
        self.interval_secs = interval_secs;
        self
    }

    /// Validates the spec.
    pub fn validate(&self) -> CoreResult<()> {
        if self.batch_size == 0 {
            return Err(CoreError::InvalidRuntimeSpec {
                reason: "batch_size must be at least 1".into(),
            });
        }
        Ok(())
    }
}

impl Default for RuntimeSpec {
    fn default() -> Self {
        Self::new(100)
    }
}

/// A named, user-configurable sync pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flow {
    /// Unique identifier, immutable after creation.
    pub name: String,
    /// Whether the flow is scheduled.
    pub status: FlowStatus,
    /// Source configuration.
    pub source: SourceSpec,
    /// Sink configuration.
    pub sink: SinkSpec,
    /// Runtime configuration.
    pub runtime: RuntimeSpec,
    /// Highest source id already processed; `None` means start from the
    /// beginning. Advances monotonically except by explicit reset.
    pub cursor: Option<u64>,
    /// When the most recent run for this flow finished.
    pub last_run_at: Option<UnixMillis>,
    /// Error summary of the most recent run, if it failed.
    pub last_error: Option<String>,
    /// When the flow was registered.
    pub created_at: UnixMillis,
}

impl Flow {
    /// Creates a new flow in the `Inactive` state with no cursor.
    ///
    /// Validates the name and both specs.
    pub fn new(
        name: impl Into<String>,
        source: SourceSpec,
        sink: SinkSpec,
        runtime: RuntimeSpec,
        created_at: UnixMillis,
    ) -> CoreResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(CoreError::InvalidFlowName {
                reason: "must not be empty".into(),
            });
        }
        sink.validate()?;
        runtime.validate()?;

        Ok(Self {
            name,
            status: FlowStatus::Inactive,
            source,
            sink,
            runtime,
            cursor: None,
            last_run_at: None,
            last_error: None,
            created_at,
        })
    }

    /// Returns true if the flow is scheduled.
    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }
}
