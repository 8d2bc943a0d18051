//! Heartbeat cycle scenarios against the demo catalog.

use flowsync_core::RunStatus;
use flowsync_testkit::{
    demo_active_count, scenarios, with_demo_service, DEMO_BATCH_SIZE, DEMO_FLOW,
};

#[test]
fn first_heartbeat_exports_one_batch() {
    with_demo_service(|service| {
        let report = service.trigger_heartbeat(1_000).unwrap();

        assert_eq!(report.runs_scheduled, 1);
        assert_eq!(report.runs_executed, 1);
        assert_eq!(report.new_rows, u64::from(DEMO_BATCH_SIZE));
        assert_eq!(service.export_count().unwrap(), DEMO_BATCH_SIZE as usize);
    });
}

#[test]
fn repeated_heartbeats_drain_the_catalog_without_duplicates() {
    with_demo_service(|service| {
        let mut now = 1_000;
        let mut total_new = 0;
        for _ in 0..16 {
            let report = service.trigger_heartbeat(now).unwrap();
            assert_eq!(report.updated_rows, 0);
            total_new += report.new_rows;
            if report.records_processed == 0 {
                break;
            }
            now += 1_000;
        }

        assert_eq!(total_new, demo_active_count());
        assert_eq!(service.export_count().unwrap() as u64, demo_active_count());
    });
}

#[test]
fn cursor_steps_through_active_batches() {
    with_demo_service(|service| {
        // Inactive records sit at ids 4, 8 and 12; the cursor lands on the
        // last *processed* id of each batch, skipping over them.
        let expected_cursors = [3, 7, 11, 15];
        let mut now = 1_000;
        for expected in expected_cursors {
            service.trigger_heartbeat(now).unwrap();
            let flow = service.flow(DEMO_FLOW).unwrap().unwrap();
            assert_eq!(flow.cursor, Some(expected));
            now += 1_000;
        }

        // A further heartbeat finds nothing and leaves the cursor alone.
        let report = service.trigger_heartbeat(now).unwrap();
        assert_eq!(report.records_processed, 0);
        assert_eq!(
            service.flow(DEMO_FLOW).unwrap().unwrap().cursor,
            Some(15)
        );
    });
}

#[test]
fn second_pass_over_unchanged_catalog_is_all_redundant() {
    let service = scenarios::synced_service();
    let exported_before = service.export_count().unwrap();

    service.reset_all_cursors().unwrap();
    let mut redundant = 0;
    let mut now = 100_000;
    for _ in 0..16 {
        let report = service.trigger_heartbeat(now).unwrap();
        assert_eq!(report.new_rows, 0);
        assert_eq!(report.updated_rows, 0);
        redundant += report.redundant_rows;
        if report.records_processed == 0 {
            break;
        }
        now += 1_000;
    }

    assert_eq!(redundant, demo_active_count());
    assert_eq!(service.export_count().unwrap(), exported_before);
}

#[test]
fn run_history_reflects_every_heartbeat() {
    let service = scenarios::synced_service();
    let runs = service.runs_for_flow(DEMO_FLOW).unwrap();

    // Four processing runs plus the final empty one.
    assert_eq!(runs.len(), 5);
    assert!(runs.iter().all(|r| r.status == RunStatus::Success));
    assert!(runs.iter().all(|r| r.ended_at.is_some()));

    // Purging history keeps the cursor so the sync stays incremental.
    assert_eq!(service.purge_flow_runs(DEMO_FLOW).unwrap(), 5);
    assert_eq!(service.flow(DEMO_FLOW).unwrap().unwrap().cursor, Some(15));
}
