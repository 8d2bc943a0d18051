//! Heartbeat command implementation.
//!
//! The manual trigger and the cron caller share this path; a single
//! invocation is one heartbeat, `--watch` keeps the process alive and
//! heartbeats on the flows' configured cadence.

use super::{load_service, save_service};
use flowsync_core::now_millis;
use flowsync_engine::HeartbeatReport;
use std::path::Path;
use std::time::Duration;

/// Runs the heartbeat command.
pub fn run(path: &Path, watch: bool) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        let (service, store) = load_service(path)?;
        let report = service.trigger_heartbeat(now_millis())?;
        save_service(&service, &store)?;
        print_report(&report);

        if !watch {
            return Ok(());
        }
        let interval = service.min_active_interval_secs()?.unwrap_or(10);
        std::thread::sleep(Duration::from_secs(interval));
    }
}

fn print_report(report: &HeartbeatReport) {
    println!(
        "Heartbeat: {} scheduled, {} executed, {} failed, {} skipped",
        report.runs_scheduled, report.runs_executed, report.runs_failed, report.runs_skipped
    );
    println!(
        "Records:   {} processed ({} new, {} updated, {} redundant)",
        report.records_processed, report.new_rows, report.updated_rows, report.redundant_rows
    );
    if report.stale_requeued > 0 {
        println!("Requeued {} stale run(s)", report.stale_requeued);
    }
    for failure in &report.failures {
        println!("  failed: {}: {}", failure.flow, failure.message);
    }
}
