//! Error types for the sync engine.

use flowsync_core::CoreError;
use thiserror::Error;

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors that can occur during scheduling and execution.
#[derive(Error, Debug)]
pub enum EngineError {
    /// No flow registered under the given name.
    #[error("flow not found: {0}")]
    FlowNotFound(String),

    /// No run exists with the given id.
    #[error("run not found: {0}")]
    RunNotFound(u64),

    /// A run lifecycle transition was attempted out of order, e.g. claiming
    /// an already-running run or closing a terminal one.
    #[error("invalid run transition for run {run_id}: {from} -> {to}")]
    InvalidRunTransition {
        /// The run being transitioned.
        run_id: u64,
        /// Current status.
        from: String,
        /// Attempted target status.
        to: String,
    },

    /// A second due pending run was about to be created for one flow. The
    /// scheduler guard prevents this structurally; seeing this error means a
    /// caller bypassed [`crate::RunLedger::schedule_pending`].
    #[error("duplicate pending run for flow {0}")]
    DuplicatePendingRun(String),

    /// Cursor advancement would move backwards.
    #[error("cursor regression for flow {flow}: {from} -> {to}")]
    CursorRegression {
        /// The flow whose cursor was touched.
        flow: String,
        /// Current cursor value.
        from: u64,
        /// Rejected new value.
        to: u64,
    },

    /// Reading a batch from the source failed.
    #[error("source read failed: {message}")]
    SourceRead {
        /// Error message.
        message: String,
        /// Whether the read can be retried.
        retryable: bool,
    },

    /// A source record could not be transformed. This fails the whole run;
    /// skipping the record would desynchronize the cursor from the source.
    #[error("transform failed for record {record_id}: {message}")]
    Transform {
        /// Id of the malformed source record.
        record_id: u64,
        /// What was wrong with it.
        message: String,
    },

    /// Writing to the destination failed.
    #[error("sink write failed: {0}")]
    SinkWrite(String),

    /// State file I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// State file serialization error.
    #[error("state serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Domain validation error.
    #[error(transparent)]
    Core(#[from] CoreError),
}

impl EngineError {
    /// Creates a retryable source-read error.
    pub fn source_unavailable(message: impl Into<String>) -> Self {
        Self::SourceRead {
            message: message.into(),
            retryable: true,
        }
    }

    /// Creates a non-retryable source-read error.
    pub fn source_fatal(message: impl Into<String>) -> Self {
        Self::SourceRead {
            message: message.into(),
            retryable: false,
        }
    }

    /// Returns true if retrying the same window can succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            EngineError::SourceRead { retryable, .. } => *retryable,
            EngineError::SinkWrite(_) => true,
            _ => false,
        }
    }
}
