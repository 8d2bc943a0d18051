//! Engine configuration.

use std::time::Duration;

/// Configuration for the scheduler and executor.
///
/// Per-flow knobs (batch size, cadence) live on the flow's
/// [`flowsync_core::RuntimeSpec`]; this struct carries engine-wide policy.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// How long a run may sit in `Running` before the staleness sweep closes
    /// it as failed and requeues the flow. `None` disables the sweep.
    pub stale_after: Option<Duration>,
}

impl EngineConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self {
            stale_after: Some(Duration::from_secs(30 * 60)),
        }
    }

    /// Sets the staleness threshold.
    pub fn with_stale_after(mut self, stale_after: Duration) -> Self {
        self.stale_after = Some(stale_after);
        self
    }

    /// Disables the staleness sweep.
    pub fn without_stale_check(mut self) -> Self {
        self.stale_after = None;
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}
