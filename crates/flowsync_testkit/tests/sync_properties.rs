//! Property-based tests for the engine's observable guarantees.

use flowsync_core::{FlowStatus, RuntimeSpec, SinkSpec, SourceRecord, SourceSpec};
use flowsync_engine::{transform, MemorySyncService};
use flowsync_testkit::{catalog_strategy, DEMO_FLOW};
use proptest::prelude::*;
use std::collections::BTreeSet;

fn service_for(catalog: &[SourceRecord], batch_size: u32) -> MemorySyncService {
    let service = MemorySyncService::in_memory();
    service
        .register_flow(
            DEMO_FLOW,
            SourceSpec::active_only(),
            SinkSpec::default(),
            RuntimeSpec::new(batch_size),
            0,
        )
        .unwrap();
    service
        .set_flow_status(DEMO_FLOW, FlowStatus::Active)
        .unwrap();
    service.source().insert_all(catalog.to_vec());
    service
}

/// Heartbeats until a run processes nothing, returning the number of
/// heartbeats it took. Bounded so a regression cannot hang the suite.
fn sync_to_fixpoint(service: &MemorySyncService, start: u64) -> u64 {
    let mut now = start;
    for _ in 0..64 {
        let report = service.trigger_heartbeat(now).unwrap();
        assert!(report.failures.is_empty());
        if report.records_processed == 0 {
            return now;
        }
        now += 1_000;
    }
    panic!("sync did not reach a fixpoint");
}

/// The content of a destination row, with bookkeeping stripped.
fn content(service: &MemorySyncService) -> Vec<(u64, String, String, i64, String)> {
    service
        .export_rows()
        .unwrap()
        .into_iter()
        .map(|r| (r.source_id, r.name, r.sku, r.price_cents, r.category_slug))
        .collect()
}

proptest! {
    #[test]
    fn full_sync_exports_exactly_the_active_records(catalog in catalog_strategy(20)) {
        let service = service_for(&catalog, 3);
        sync_to_fixpoint(&service, 1_000);

        let expected: BTreeSet<u64> =
            catalog.iter().filter(|r| r.active).map(|r| r.id).collect();
        let exported: Vec<u64> = service
            .export_rows()
            .unwrap()
            .iter()
            .map(|r| r.source_id)
            .collect();

        // One row per business key, nothing missing, nothing extra.
        let exported_set: BTreeSet<u64> = exported.iter().copied().collect();
        prop_assert_eq!(exported.len(), exported_set.len());
        prop_assert_eq!(exported_set, expected);

        // Row content matches the transform stage exactly.
        for row in service.export_rows().unwrap() {
            let source = catalog.iter().find(|r| r.id == row.source_id).unwrap();
            let fresh = transform(source, row.exported_at).unwrap();
            prop_assert_eq!(row, fresh);
        }
    }

    #[test]
    fn cursor_never_regresses(catalog in catalog_strategy(20)) {
        let service = service_for(&catalog, 2);

        let mut previous = None;
        let mut now = 1_000;
        for _ in 0..16 {
            service.trigger_heartbeat(now).unwrap();
            let cursor = service.flow(DEMO_FLOW).unwrap().unwrap().cursor;
            if let (Some(prev), Some(curr)) = (previous, cursor) {
                prop_assert!(curr >= prev);
            }
            if cursor.is_some() {
                previous = cursor;
            }
            now += 1_000;
        }
    }

    #[test]
    fn replay_after_reset_writes_nothing(catalog in catalog_strategy(20)) {
        let service = service_for(&catalog, 3);
        sync_to_fixpoint(&service, 1_000);
        let before = content(&service);

        service.reset_all_cursors().unwrap();
        let mut now = 100_000;
        for _ in 0..16 {
            let report = service.trigger_heartbeat(now).unwrap();
            prop_assert_eq!(report.new_rows, 0);
            prop_assert_eq!(report.updated_rows, 0);
            if report.records_processed == 0 {
                break;
            }
            now += 1_000;
        }

        prop_assert_eq!(content(&service), before);
    }

    #[test]
    fn source_outage_does_not_change_the_final_state(
        catalog in catalog_strategy(20),
        outage_after in 0u64..4,
    ) {
        // Reference: an uninterrupted sync.
        let reference = service_for(&catalog, 3);
        sync_to_fixpoint(&reference, 1_000);

        // Interrupted: the source drops after a few heartbeats, the run
        // fails, and once the source returns the sync resumes.
        let service = service_for(&catalog, 3);
        let mut now = 1_000;
        for _ in 0..outage_after {
            service.trigger_heartbeat(now).unwrap();
            now += 1_000;
        }
        service.source().set_available(false);
        let report = service.trigger_heartbeat(now).unwrap();
        prop_assert_eq!(report.records_processed, 0);
        service.source().set_available(true);
        sync_to_fixpoint(&service, now + 1_000);

        prop_assert_eq!(content(&service), content(&reference));
        prop_assert_eq!(
            service.flow(DEMO_FLOW).unwrap().unwrap().cursor,
            reference.flow(DEMO_FLOW).unwrap().unwrap().cursor
        );
    }
}
