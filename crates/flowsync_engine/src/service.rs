//! Service facade: the entry points surrounding code calls.
//!
//! Everything out of scope for the engine (UI, cron, CLI) talks to this
//! facade and renders its state; the facade delegates to the scheduler,
//! registry and ledger.

use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::ledger::{MemoryRunLedger, RunLedger};
use crate::registry::{FlowRegistry, MemoryFlowRegistry};
use crate::scheduler::{HeartbeatReport, Scheduler};
use crate::sink::{ExportSink, MemoryExportSink};
use crate::source::{MemorySource, SourceReader};
use crate::store::PersistedState;
use flowsync_core::{
    Flow, FlowStatus, Run, RuntimeSpec, SinkSpec, SourceSpec, TransformedRecord, UnixMillis,
};
use std::sync::Arc;
use tracing::info;

/// Facade over the sync engine.
pub struct SyncService<R: FlowRegistry, L: RunLedger, S: SourceReader, K: ExportSink> {
    registry: Arc<R>,
    ledger: Arc<L>,
    source: Arc<S>,
    sink: Arc<K>,
    scheduler: Scheduler<R, L, S, K>,
}

impl<R: FlowRegistry, L: RunLedger, S: SourceReader, K: ExportSink> SyncService<R, L, S, K> {
    /// Creates a service over the given stores and connectors.
    pub fn with_stores(registry: R, ledger: L, source: S, sink: K, config: EngineConfig) -> Self {
        let registry = Arc::new(registry);
        let ledger = Arc::new(ledger);
        let source = Arc::new(source);
        let sink = Arc::new(sink);
        let scheduler = Scheduler::new(
            Arc::clone(&registry),
            Arc::clone(&ledger),
            Arc::clone(&source),
            Arc::clone(&sink),
            config,
        );
        Self {
            registry,
            ledger,
            source,
            sink,
            scheduler,
        }
    }

    /// The flow registry.
    pub fn registry(&self) -> &Arc<R> {
        &self.registry
    }

    /// The run ledger.
    pub fn ledger(&self) -> &Arc<L> {
        &self.ledger
    }

    /// The source connector.
    pub fn source(&self) -> &Arc<S> {
        &self.source
    }

    /// The sink connector.
    pub fn sink(&self) -> &Arc<K> {
        &self.sink
    }

    /// Registers a flow if absent; a second registration under the same
    /// name is a no-op returning the stored flow.
    pub fn register_flow(
        &self,
        name: &str,
        source: SourceSpec,
        sink: SinkSpec,
        runtime: RuntimeSpec,
        now: UnixMillis,
    ) -> EngineResult<Flow> {
        let flow = Flow::new(name, source, sink, runtime, now)?;
        if self.registry.insert_if_absent(flow)? {
            info!(flow = name, "registered flow");
        }
        self.registry
            .find_by_name(name)?
            .ok_or_else(|| EngineError::FlowNotFound(name.to_string()))
    }

    /// Administrative status toggle target.
    pub fn set_flow_status(&self, name: &str, status: FlowStatus) -> EngineResult<()> {
        self.registry.update_status(name, status)
    }

    /// Flips a flow between active and inactive; returns the new status.
    pub fn toggle_flow(&self, name: &str) -> EngineResult<FlowStatus> {
        let flow = self
            .registry
            .find_by_name(name)?
            .ok_or_else(|| EngineError::FlowNotFound(name.to_string()))?;
        let status = flow.status.toggled();
        self.registry.update_status(name, status)?;
        Ok(status)
    }

    /// Idempotently ensures due runs exist for all active flows, then
    /// executes them. Used by both the manual trigger and the automated
    /// caller, with identical semantics.
    pub fn trigger_heartbeat(&self, now: UnixMillis) -> EngineResult<HeartbeatReport> {
        self.scheduler.heartbeat(now)
    }

    /// Clears one flow's cursor; the next run reprocesses from the
    /// beginning, which is safe because destination writes are idempotent
    /// per business key.
    pub fn reset_cursor(&self, name: &str) -> EngineResult<()> {
        self.registry.reset_cursor(name)
    }

    /// Clears every flow's cursor. Returns the number of flows touched.
    pub fn reset_all_cursors(&self) -> EngineResult<usize> {
        self.registry.reset_all_cursors()
    }

    /// Deletes one flow's run history. The cursor is not affected.
    pub fn purge_flow_runs(&self, name: &str) -> EngineResult<usize> {
        self.ledger.purge_flow(name)
    }

    /// Deletes all run history. Cursors are not affected.
    pub fn purge_run_history(&self) -> EngineResult<usize> {
        self.ledger.purge_all()
    }

    /// Every registered flow.
    pub fn flows(&self) -> EngineResult<Vec<Flow>> {
        self.registry.list_all()
    }

    /// One flow by name.
    pub fn flow(&self, name: &str) -> EngineResult<Option<Flow>> {
        self.registry.find_by_name(name)
    }

    /// Run history for one flow, newest first.
    pub fn runs_for_flow(&self, name: &str) -> EngineResult<Vec<Run>> {
        self.ledger.runs_for_flow(name)
    }

    /// Every destination row.
    pub fn export_rows(&self) -> EngineResult<Vec<TransformedRecord>> {
        self.sink.rows()
    }

    /// Number of destination rows.
    pub fn export_count(&self) -> EngineResult<usize> {
        Ok(self.sink.rows()?.len())
    }

    /// Smallest configured cadence across active flows, for callers that
    /// poll `trigger_heartbeat` in a loop.
    pub fn min_active_interval_secs(&self) -> EngineResult<Option<u64>> {
        Ok(self
            .registry
            .list_active()?
            .iter()
            .map(|f| f.runtime.interval_secs)
            .min())
    }
}

/// A service backed entirely by in-memory stores.
pub type MemorySyncService =
    SyncService<MemoryFlowRegistry, MemoryRunLedger, MemorySource, MemoryExportSink>;

impl MemorySyncService {
    /// Creates an empty in-memory service with default configuration.
    pub fn in_memory() -> Self {
        Self::with_stores(
            MemoryFlowRegistry::new(),
            MemoryRunLedger::new(),
            MemorySource::new(),
            MemoryExportSink::new(),
            EngineConfig::default(),
        )
    }

    /// Restores a service from a persisted state snapshot.
    pub fn from_state(state: PersistedState, config: EngineConfig) -> Self {
        Self::with_stores(
            MemoryFlowRegistry::from_flows(state.flows),
            MemoryRunLedger::from_runs(state.runs, state.next_run_id),
            MemorySource::from_records(state.source_records),
            MemoryExportSink::from_rows(state.exports),
            config,
        )
    }

    /// Snapshots the full engine state for persistence.
    pub fn snapshot(&self) -> EngineResult<PersistedState> {
        let (runs, next_run_id) = self.ledger.snapshot();
        Ok(PersistedState {
            flows: self.registry.snapshot(),
            runs,
            next_run_id,
            source_records: self.source.snapshot(),
            exports: self.sink.rows()?,
        })
    }
}
