//! Scheduler: heartbeat tick, pending-run guard, stale-run requeue.

use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::executor::{Executor, RunReport};
use crate::ledger::RunLedger;
use crate::registry::FlowRegistry;
use crate::sink::ExportSink;
use crate::source::SourceReader;
use flowsync_core::UnixMillis;
use std::sync::Arc;
use tracing::{info, warn};

/// What a scheduling pass accomplished.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Pending runs created this tick.
    pub runs_scheduled: u64,
    /// Stuck running runs closed as failed by the staleness sweep.
    pub stale_requeued: u64,
}

/// A per-flow failure captured during a heartbeat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowFailure {
    /// The flow whose run failed.
    pub flow: String,
    /// The recorded error message.
    pub message: String,
}

/// What one full heartbeat accomplished.
#[derive(Debug, Clone, Default)]
pub struct HeartbeatReport {
    /// Pending runs created.
    pub runs_scheduled: u64,
    /// Stuck running runs requeued.
    pub stale_requeued: u64,
    /// Runs executed to success.
    pub runs_executed: u64,
    /// Runs that failed; details in `failures`.
    pub runs_failed: u64,
    /// Due runs skipped because another executor already claimed them.
    pub runs_skipped: u64,
    /// Source records processed across all runs.
    pub records_processed: u64,
    /// Destination rows written as new.
    pub new_rows: u64,
    /// Destination rows overwritten after a detected change.
    pub updated_rows: u64,
    /// Records classified redundant; no write.
    pub redundant_rows: u64,
    /// One entry per failed run.
    pub failures: Vec<FlowFailure>,
}

impl HeartbeatReport {
    fn absorb(&mut self, report: &RunReport) {
        self.runs_executed += 1;
        self.records_processed += report.processed;
        self.new_rows += report.new_rows;
        self.updated_rows += report.updated_rows;
        self.redundant_rows += report.redundant_rows;
    }
}

/// Decides, per heartbeat, which flows need a run and executes due runs.
pub struct Scheduler<R: FlowRegistry, L: RunLedger, S: SourceReader, K: ExportSink> {
    registry: Arc<R>,
    ledger: Arc<L>,
    executor: Executor<R, L, S, K>,
    config: EngineConfig,
}

impl<R: FlowRegistry, L: RunLedger, S: SourceReader, K: ExportSink> Scheduler<R, L, S, K> {
    /// Creates a scheduler over the given stores and connectors.
    pub fn new(
        registry: Arc<R>,
        ledger: Arc<L>,
        source: Arc<S>,
        sink: Arc<K>,
        config: EngineConfig,
    ) -> Self {
        let executor = Executor::new(
            Arc::clone(&registry),
            Arc::clone(&ledger),
            source,
            sink,
        );
        Self {
            registry,
            ledger,
            executor,
            config,
        }
    }

    /// Ensures every active flow has a due pending run.
    ///
    /// Idempotent: calling twice within the same due window creates exactly
    /// one pending run per active flow. Also sweeps runs stuck in `Running`
    /// past the staleness threshold so their flows become schedulable again.
    pub fn tick(&self, now: UnixMillis) -> EngineResult<TickReport> {
        let mut report = TickReport {
            stale_requeued: self.requeue_stale(now)?,
            ..TickReport::default()
        };

        for flow in self.registry.list_active()? {
            if self.ledger.schedule_pending(&flow.name, now)?.is_some() {
                report.runs_scheduled += 1;
                info!(flow = %flow.name, "scheduled run");
            }
        }
        Ok(report)
    }

    /// Executes every due run across all flows.
    ///
    /// Flows are processed independently: one flow's failure is recorded
    /// and the loop moves on, it never blocks another flow's run.
    pub fn execute_due_runs(&self, now: UnixMillis) -> EngineResult<HeartbeatReport> {
        let mut report = HeartbeatReport::default();

        for run in self.ledger.due_runs(now)? {
            match self.executor.run_one(&run, now) {
                Ok(run_report) => report.absorb(&run_report),
                Err(EngineError::InvalidRunTransition { .. }) => {
                    // Another executor claimed it between listing and now.
                    report.runs_skipped += 1;
                }
                Err(err) => {
                    report.runs_failed += 1;
                    warn!(flow = %run.flow_name, run_id = run.id, error = %err, "run failed");
                    report.failures.push(FlowFailure {
                        flow: run.flow_name.clone(),
                        message: err.to_string(),
                    });
                }
            }
        }
        Ok(report)
    }

    /// One full heartbeat: tick, then execute everything due.
    ///
    /// The manual trigger and the cron trigger both call this; the
    /// semantics are identical.
    pub fn heartbeat(&self, now: UnixMillis) -> EngineResult<HeartbeatReport> {
        let tick = self.tick(now)?;
        let mut report = self.execute_due_runs(now)?;
        report.runs_scheduled = tick.runs_scheduled;
        report.stale_requeued = tick.stale_requeued;

        info!(
            scheduled = report.runs_scheduled,
            executed = report.runs_executed,
            failed = report.runs_failed,
            processed = report.records_processed,
            "heartbeat complete"
        );
        Ok(report)
    }

    fn requeue_stale(&self, now: UnixMillis) -> EngineResult<u64> {
        let Some(stale_after) = self.config.stale_after else {
            return Ok(0);
        };
        let cutoff = now.saturating_sub(stale_after.as_millis() as u64);

        let mut requeued = 0;
        for run in self.ledger.stale_running(cutoff)? {
            warn!(flow = %run.flow_name, run_id = run.id, "requeueing stale run");
            self.ledger.close_failed(
                run.id,
                now,
                "stale run requeued",
                &format!("run {} stuck in running since {:?}", run.id, run.started_at),
            )?;
            self.registry.record_run_summary(
                &run.flow_name,
                now,
                Some("stale run requeued".into()),
            )?;
            requeued += 1;
        }
        Ok(requeued)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::MemoryRunLedger;
    use crate::registry::MemoryFlowRegistry;
    use crate::sink::MemoryExportSink;
    use crate::source::MemorySource;
    use flowsync_core::{Flow, FlowStatus, RunStatus, RuntimeSpec, SinkSpec, SourceRecord, SourceSpec};
    use std::time::Duration;

    struct Harness {
        registry: Arc<MemoryFlowRegistry>,
        ledger: Arc<MemoryRunLedger>,
        source: Arc<MemorySource>,
        scheduler: Scheduler<MemoryFlowRegistry, MemoryRunLedger, MemorySource, MemoryExportSink>,
    }

    fn harness(config: EngineConfig) -> Harness {
        let registry = Arc::new(MemoryFlowRegistry::new());
        let ledger = Arc::new(MemoryRunLedger::new());
        let source = Arc::new(MemorySource::new());
        let sink = Arc::new(MemoryExportSink::new());
        let scheduler = Scheduler::new(
            Arc::clone(&registry),
            Arc::clone(&ledger),
            Arc::clone(&source),
            Arc::clone(&sink),
            config,
        );
        Harness {
            registry,
            ledger,
            source,
            scheduler,
        }
    }

    fn add_active_flow(h: &Harness, name: &str, batch_size: u32) {
        let flow = Flow::new(
            name,
            SourceSpec::active_only(),
            SinkSpec::default(),
            RuntimeSpec::new(batch_size),
            0,
        )
        .unwrap();
        h.registry.insert_if_absent(flow).unwrap();
        h.registry.update_status(name, FlowStatus::Active).unwrap();
    }

    #[test]
    fn tick_schedules_only_active_flows() {
        let h = harness(EngineConfig::default());
        add_active_flow(&h, "a", 3);
        let inactive = Flow::new(
            "b",
            SourceSpec::default(),
            SinkSpec::default(),
            RuntimeSpec::default(),
            0,
        )
        .unwrap();
        h.registry.insert_if_absent(inactive).unwrap();

        let report = h.scheduler.tick(100).unwrap();
        assert_eq!(report.runs_scheduled, 1);
        assert_eq!(h.ledger.due_runs(100).unwrap().len(), 1);
        assert!(h.ledger.runs_for_flow("b").unwrap().is_empty());
    }

    #[test]
    fn double_tick_schedules_once() {
        let h = harness(EngineConfig::default());
        add_active_flow(&h, "a", 3);

        assert_eq!(h.scheduler.tick(100).unwrap().runs_scheduled, 1);
        assert_eq!(h.scheduler.tick(100).unwrap().runs_scheduled, 0);
        assert_eq!(h.scheduler.tick(150).unwrap().runs_scheduled, 0);
        assert_eq!(h.ledger.due_runs(150).unwrap().len(), 1);
    }

    #[test]
    fn heartbeat_processes_due_runs() {
        let h = harness(EngineConfig::default());
        add_active_flow(&h, "a", 10);
        h.source.insert_all(vec![
            SourceRecord::new(1, "Wireless Mouse", "TECH-001", 29.99),
            SourceRecord::new(2, "USB-C Cable", "TECH-002", 12.50),
        ]);

        let report = h.scheduler.heartbeat(100).unwrap();
        assert_eq!(report.runs_scheduled, 1);
        assert_eq!(report.runs_executed, 1);
        assert_eq!(report.records_processed, 2);
        assert_eq!(report.new_rows, 2);
        assert!(report.failures.is_empty());
    }

    #[test]
    fn one_flow_failure_does_not_block_others() {
        let h = harness(EngineConfig::default());
        add_active_flow(&h, "bad", 10);
        add_active_flow(&h, "good", 10);
        // "bad" trips on a malformed record; "good" reads past it because
        // each flow sees the full source but we scope "good" to start
        // beyond the malformed row.
        h.source.insert_all(vec![
            SourceRecord::new(1, "Broken", "BAD-001", -5.0),
            SourceRecord::new(2, "Fine", "OK-001", 1.0),
        ]);
        h.registry.advance_cursor("good", 1).unwrap();

        let report = h.scheduler.heartbeat(100).unwrap();
        assert_eq!(report.runs_executed, 1);
        assert_eq!(report.runs_failed, 1);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].flow, "bad");

        // The failed flow retries on the next heartbeat; the healthy one
        // sees an empty batch.
        let report = h.scheduler.heartbeat(200).unwrap();
        assert_eq!(report.runs_scheduled, 2);
        assert_eq!(report.runs_failed, 1);
    }

    #[test]
    fn stale_running_run_is_requeued() {
        let h = harness(EngineConfig::new().with_stale_after(Duration::from_secs(60)));
        add_active_flow(&h, "a", 3);

        // Claim a run and never finish it.
        let run = h.ledger.schedule_pending("a", 1_000).unwrap().unwrap();
        h.ledger.claim(run.id, 1_000).unwrap();

        // Within the threshold the sweep leaves it alone.
        let report = h.scheduler.tick(30_000).unwrap();
        assert_eq!(report.stale_requeued, 0);
        // Only *pending* runs gate scheduling, so this tick already queued
        // a fresh run next to the stuck one.
        assert_eq!(report.runs_scheduled, 1);

        // Past the threshold the stuck run is closed failed; the pending
        // run from the previous tick still covers the flow.
        let report = h.scheduler.tick(61_001).unwrap();
        assert_eq!(report.stale_requeued, 1);
        assert_eq!(report.runs_scheduled, 0);

        let stuck = h.ledger.get(run.id).unwrap().unwrap();
        assert_eq!(stuck.status, RunStatus::Failed);
        assert_eq!(stuck.error_message.as_deref(), Some("stale run requeued"));
    }

    #[test]
    fn stale_sweep_disabled() {
        let h = harness(EngineConfig::new().without_stale_check());
        add_active_flow(&h, "a", 3);
        let run = h.ledger.schedule_pending("a", 0).unwrap().unwrap();
        h.ledger.claim(run.id, 0).unwrap();

        let report = h.scheduler.tick(u64::MAX / 2).unwrap();
        assert_eq!(report.stale_requeued, 0);
        assert_eq!(
            h.ledger.get(run.id).unwrap().unwrap().status,
            RunStatus::Running
        );
    }

    #[test]
    fn future_run_not_executed_yet() {
        let h = harness(EngineConfig::default());
        add_active_flow(&h, "a", 3);
        h.scheduler.tick(1_000).unwrap();

        // Before run_after, nothing is due.
        let report = h.scheduler.execute_due_runs(999).unwrap();
        assert_eq!(report.runs_executed, 0);

        let report = h.scheduler.execute_due_runs(1_000).unwrap();
        assert_eq!(report.runs_executed, 1);
    }
}
