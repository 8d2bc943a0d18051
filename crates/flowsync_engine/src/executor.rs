//! Executor: claims due runs and processes cursor-bounded batches.

use crate::collision::{resolve, WriteOutcome};
use crate::error::{EngineError, EngineResult};
use crate::ledger::RunLedger;
use crate::registry::FlowRegistry;
use crate::sink::ExportSink;
use crate::source::SourceReader;
use crate::transform::transform;
use flowsync_core::{Flow, Run, UnixMillis};
use std::sync::Arc;
use tracing::{debug, info};

/// What one run accomplished.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    /// Id of the executed run.
    pub run_id: u64,
    /// Name of the flow the run belongs to.
    pub flow_name: String,
    /// Source records processed.
    pub processed: u64,
    /// Rows written as new.
    pub new_rows: u64,
    /// Rows overwritten after a detected change.
    pub updated_rows: u64,
    /// Records identical to their destination row; not written.
    pub redundant_rows: u64,
    /// Lowest source id processed, if any.
    pub first_id: Option<u64>,
    /// Highest source id processed, if any.
    pub last_id: Option<u64>,
}

/// Executes individual runs.
///
/// Per-flow serialization comes from the ledger: the pending-run
/// uniqueness guard plus the claim transition mean at most one executor
/// processes a given flow at a time, without any flow-level lock.
pub struct Executor<R: FlowRegistry, L: RunLedger, S: SourceReader, K: ExportSink> {
    registry: Arc<R>,
    ledger: Arc<L>,
    source: Arc<S>,
    sink: Arc<K>,
}

impl<R: FlowRegistry, L: RunLedger, S: SourceReader, K: ExportSink> Executor<R, L, S, K> {
    /// Creates an executor over the given stores and connectors.
    pub fn new(registry: Arc<R>, ledger: Arc<L>, source: Arc<S>, sink: Arc<K>) -> Self {
        Self {
            registry,
            ledger,
            source,
            sink,
        }
    }

    /// Executes one due run to completion.
    ///
    /// Claims the run (aborting if another executor got there first),
    /// processes the batch, advances the cursor and closes the run. On any
    /// processing error the run is closed `Failed`, the cursor stays
    /// untouched and the error is also recorded on the flow summary; the
    /// next heartbeat retries the same window.
    pub fn run_one(&self, run: &Run, now: UnixMillis) -> EngineResult<RunReport> {
        let flow = self
            .registry
            .find_by_name(&run.flow_name)?
            .ok_or_else(|| EngineError::FlowNotFound(run.flow_name.clone()))?;

        self.ledger.claim(run.id, now)?;
        debug!(flow = %flow.name, run_id = run.id, cursor = ?flow.cursor, "run claimed");

        match self.process_batch(&flow, run.id, now) {
            Ok(report) => {
                self.registry.record_run_summary(&flow.name, now, None)?;
                info!(
                    flow = %flow.name,
                    run_id = run.id,
                    processed = report.processed,
                    new = report.new_rows,
                    updated = report.updated_rows,
                    redundant = report.redundant_rows,
                    "run succeeded"
                );
                Ok(report)
            }
            Err(err) => {
                let message = err.to_string();
                let detail = format!("{err:?}");
                self.ledger.close_failed(run.id, now, &message, &detail)?;
                self.registry
                    .record_run_summary(&flow.name, now, Some(message))?;
                Err(err)
            }
        }
    }

    fn process_batch(&self, flow: &Flow, run_id: u64, now: UnixMillis) -> EngineResult<RunReport> {
        let batch =
            self.source
                .fetch_batch(&flow.source, flow.cursor, flow.runtime.batch_size)?;

        let mut report = RunReport {
            run_id,
            flow_name: flow.name.clone(),
            ..RunReport::default()
        };

        if batch.is_empty() {
            // Nothing new at the cursor: close out without moving it.
            self.ledger.close_success(run_id, now, None)?;
            debug!(flow = %flow.name, run_id, "empty batch, cursor unchanged");
            return Ok(report);
        }

        // The source contract guarantees ascending id order, so the batch
        // bounds are simply its first and last entries.
        let first_id = batch[0].id;
        let last_id = batch[batch.len() - 1].id;

        for record in &batch {
            let transformed = transform(record, now)?;
            let existing = self.sink.find(record.id)?;
            let resolution = resolve(existing.as_ref(), &transformed);

            match resolution.outcome {
                WriteOutcome::New => {
                    self.sink.upsert(&transformed)?;
                    report.new_rows += 1;
                    debug!(flow = %flow.name, source_id = record.id, "stored new record");
                }
                WriteOutcome::Updated => {
                    self.sink.upsert(&transformed)?;
                    report.updated_rows += 1;
                    info!(
                        flow = %flow.name,
                        source_id = record.id,
                        changes = %resolution.describe_changes(),
                        "detected changes"
                    );
                }
                WriteOutcome::Redundant => {
                    report.redundant_rows += 1;
                    debug!(flow = %flow.name, source_id = record.id, "no changes detected");
                }
            }
            report.processed += 1;
        }

        self.registry.advance_cursor(&flow.name, last_id)?;
        self.ledger
            .close_success(run_id, now, Some((first_id, last_id)))?;

        report.first_id = Some(first_id);
        report.last_id = Some(last_id);
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::MemoryRunLedger;
    use crate::registry::MemoryFlowRegistry;
    use crate::sink::MemoryExportSink;
    use crate::source::MemorySource;
    use flowsync_core::{RunStatus, RuntimeSpec, SinkSpec, SourceRecord, SourceSpec};

    struct Harness {
        registry: Arc<MemoryFlowRegistry>,
        ledger: Arc<MemoryRunLedger>,
        source: Arc<MemorySource>,
        sink: Arc<MemoryExportSink>,
        executor: Executor<MemoryFlowRegistry, MemoryRunLedger, MemorySource, MemoryExportSink>,
    }

    fn harness(batch_size: u32) -> Harness {
        let registry = Arc::new(MemoryFlowRegistry::new());
        let ledger = Arc::new(MemoryRunLedger::new());
        let source = Arc::new(MemorySource::new());
        let sink = Arc::new(MemoryExportSink::new());

        let flow = Flow::new(
            "product_sync_flow",
            SourceSpec::active_only(),
            SinkSpec::default(),
            RuntimeSpec::new(batch_size),
            0,
        )
        .unwrap();
        registry.insert_if_absent(flow).unwrap();

        let executor = Executor::new(
            Arc::clone(&registry),
            Arc::clone(&ledger),
            Arc::clone(&source),
            Arc::clone(&sink),
        );

        Harness {
            registry,
            ledger,
            source,
            sink,
            executor,
        }
    }

    fn schedule(h: &Harness, now: UnixMillis) -> Run {
        h.ledger
            .schedule_pending("product_sync_flow", now)
            .unwrap()
            .unwrap()
    }

    #[test]
    fn processes_batch_and_advances_cursor() {
        let h = harness(3);
        h.source.insert_all(vec![
            SourceRecord::new(1, "Wireless Mouse", "TECH-001", 29.99).with_category("Electronics"),
            SourceRecord::new(2, "USB-C Cable", "TECH-002", 12.50).with_category("Electronics"),
            SourceRecord::new(3, "Laptop Stand", "TECH-003", 45.00).with_category("Electronics"),
        ]);

        let run = schedule(&h, 100);
        let report = h.executor.run_one(&run, 100).unwrap();

        assert_eq!(report.processed, 3);
        assert_eq!(report.new_rows, 3);
        assert_eq!(report.first_id, Some(1));
        assert_eq!(report.last_id, Some(3));

        let flow = h.registry.find_by_name("product_sync_flow").unwrap().unwrap();
        assert_eq!(flow.cursor, Some(3));
        assert_eq!(flow.last_error, None);

        let closed = h.ledger.get(run.id).unwrap().unwrap();
        assert_eq!(closed.status, RunStatus::Success);
        assert_eq!(closed.first_id, Some(1));
        assert_eq!(closed.last_id, Some(3));
        assert_eq!(h.sink.len(), 3);
    }

    #[test]
    fn empty_batch_closes_success_without_moving_cursor() {
        let h = harness(3);
        h.registry.advance_cursor("product_sync_flow", 9).unwrap();

        let run = schedule(&h, 100);
        let report = h.executor.run_one(&run, 100).unwrap();

        assert_eq!(report.processed, 0);
        assert_eq!(report.first_id, None);

        let flow = h.registry.find_by_name("product_sync_flow").unwrap().unwrap();
        assert_eq!(flow.cursor, Some(9));

        let closed = h.ledger.get(run.id).unwrap().unwrap();
        assert_eq!(closed.status, RunStatus::Success);
        assert_eq!(closed.first_id, None);
        assert_eq!(closed.last_id, None);
    }

    #[test]
    fn source_failure_closes_failed_and_keeps_cursor() {
        let h = harness(3);
        h.source
            .insert(SourceRecord::new(1, "Wireless Mouse", "TECH-001", 29.99));
        h.registry.advance_cursor("product_sync_flow", 0).unwrap();
        h.source.set_available(false);

        let run = schedule(&h, 100);
        let err = h.executor.run_one(&run, 100).unwrap_err();
        assert!(err.is_retryable());

        let flow = h.registry.find_by_name("product_sync_flow").unwrap().unwrap();
        assert_eq!(flow.cursor, Some(0));
        assert_eq!(flow.last_error.as_deref(), Some("source read failed: source unavailable"));

        let closed = h.ledger.get(run.id).unwrap().unwrap();
        assert_eq!(closed.status, RunStatus::Failed);
        assert!(closed.error_detail.is_some());
        assert!(h.sink.is_empty());
    }

    #[test]
    fn transform_failure_fails_the_whole_run() {
        let h = harness(3);
        h.source.insert_all(vec![
            SourceRecord::new(1, "Fine", "OK-001", 1.0),
            SourceRecord::new(2, "Broken", "BAD-001", -5.0),
        ]);

        let run = schedule(&h, 100);
        let err = h.executor.run_one(&run, 100).unwrap_err();
        assert!(matches!(err, EngineError::Transform { record_id: 2, .. }));

        // Cursor untouched; the run retries the same window later.
        let flow = h.registry.find_by_name("product_sync_flow").unwrap().unwrap();
        assert_eq!(flow.cursor, None);
        assert_eq!(
            h.ledger.get(run.id).unwrap().unwrap().status,
            RunStatus::Failed
        );
    }

    #[test]
    fn claim_race_aborts_without_touching_state() {
        let h = harness(3);
        h.source
            .insert(SourceRecord::new(1, "Wireless Mouse", "TECH-001", 29.99));

        let run = schedule(&h, 100);
        h.ledger.claim(run.id, 100).unwrap();

        let err = h.executor.run_one(&run, 101).unwrap_err();
        assert!(matches!(err, EngineError::InvalidRunTransition { .. }));
        assert!(h.sink.is_empty());
        let flow = h.registry.find_by_name("product_sync_flow").unwrap().unwrap();
        assert_eq!(flow.cursor, None);
    }

    #[test]
    fn rerun_after_failure_reprocesses_same_window_idempotently() {
        let h = harness(3);
        h.source.insert_all(vec![
            SourceRecord::new(1, "Wireless Mouse", "TECH-001", 29.99),
            SourceRecord::new(2, "USB-C Cable", "TECH-002", 12.50),
        ]);

        // First attempt dies on the sink after writing one row.
        let run = schedule(&h, 100);
        h.ledger.claim(run.id, 100).unwrap();
        let transformed = transform(&SourceRecord::new(1, "Wireless Mouse", "TECH-001", 29.99), 100).unwrap();
        h.sink.upsert(&transformed).unwrap();
        h.ledger
            .close_failed(run.id, 100, "sink write failed", "detail")
            .unwrap();

        // Retry from the old cursor: same window, same final state.
        let retry = schedule(&h, 200);
        let report = h.executor.run_one(&retry, 200).unwrap();
        assert_eq!(report.processed, 2);
        assert_eq!(report.new_rows, 1);
        assert_eq!(report.redundant_rows, 1);
        assert_eq!(h.sink.len(), 2);

        let flow = h.registry.find_by_name("product_sync_flow").unwrap().unwrap();
        assert_eq!(flow.cursor, Some(2));
    }
}
