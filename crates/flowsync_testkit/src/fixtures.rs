//! Service fixtures and the demo product catalog.
//!
//! Provides convenience functions for setting up test services and the
//! sample catalog used across the workspace's tests.

use flowsync_core::{FlowStatus, RuntimeSpec, SinkSpec, SourceRecord, SourceSpec};
use flowsync_engine::{EngineResult, MemorySyncService};

/// Name of the demo flow.
pub const DEMO_FLOW: &str = "product_sync_flow";

/// Batch size the demo flow registers with.
pub const DEMO_BATCH_SIZE: u32 = 3;

/// The sample product catalog: 15 records, 12 of them active.
pub fn demo_catalog() -> Vec<SourceRecord> {
    vec![
        SourceRecord::new(1, "Wireless Mouse", "TECH-001", 29.99).with_category("Electronics"),
        SourceRecord::new(2, "USB-C Cable", "TECH-002", 12.50).with_category("Electronics"),
        SourceRecord::new(3, "Laptop Stand", "TECH-003", 45.00).with_category("Electronics"),
        SourceRecord::new(4, "Mechanical Keyboard", "TECH-004", 89.99)
            .with_category("Electronics")
            .with_active(false),
        SourceRecord::new(5, "Coffee Mug", "HOME-001", 15.99).with_category("Home & Kitchen"),
        SourceRecord::new(6, "Desk Lamp", "HOME-002", 34.50).with_category("Home & Kitchen"),
        SourceRecord::new(7, "Notebook Set", "OFFICE-001", 18.75).with_category("Office Supplies"),
        SourceRecord::new(8, "Pen Pack", "OFFICE-002", 8.99)
            .with_category("Office Supplies")
            .with_active(false),
        SourceRecord::new(9, "Monitor Stand", "TECH-005", 55.00).with_category("Electronics"),
        SourceRecord::new(10, "Webcam HD", "TECH-006", 79.99).with_category("Electronics"),
        SourceRecord::new(11, "Desk Organizer", "OFFICE-003", 22.50).with_category("Office Supplies"),
        SourceRecord::new(12, "Water Bottle", "HOME-003", 19.99)
            .with_category("Home & Kitchen")
            .with_active(false),
        SourceRecord::new(13, "Phone Holder", "TECH-007", 14.99).with_category("Electronics"),
        SourceRecord::new(14, "Headphone Stand", "TECH-008", 25.00).with_category("Electronics"),
        SourceRecord::new(15, "Cable Management", "OFFICE-004", 16.50)
            .with_category("Office Supplies"),
    ]
}

/// Number of active records in [`demo_catalog`].
pub fn demo_active_count() -> u64 {
    demo_catalog().iter().filter(|r| r.active).count() as u64
}

/// Registers the demo flow (active, batch 3) on a service.
pub fn register_demo_flow(service: &MemorySyncService) -> EngineResult<()> {
    service.register_flow(
        DEMO_FLOW,
        SourceSpec::active_only(),
        SinkSpec::default(),
        RuntimeSpec::new(DEMO_BATCH_SIZE),
        0,
    )?;
    service.set_flow_status(DEMO_FLOW, FlowStatus::Active)
}

/// An in-memory service with the demo flow registered and the demo catalog
/// loaded.
pub fn demo_service() -> MemorySyncService {
    let service = MemorySyncService::in_memory();
    register_demo_flow(&service).expect("demo flow registration");
    service.source().insert_all(demo_catalog());
    service
}

/// Runs a test against a freshly seeded demo service.
pub fn with_demo_service<F, R>(f: F) -> R
where
    F: FnOnce(&MemorySyncService) -> R,
{
    let service = demo_service();
    f(&service)
}

/// Common sync scenarios.
pub mod scenarios {
    use super::*;

    /// A service whose source holds `record_count` sequential active
    /// records and whose demo flow uses the given batch size.
    pub fn populated_service(record_count: u64, batch_size: u32) -> MemorySyncService {
        let service = MemorySyncService::in_memory();
        service
            .register_flow(
                DEMO_FLOW,
                SourceSpec::active_only(),
                SinkSpec::default(),
                RuntimeSpec::new(batch_size),
                0,
            )
            .expect("flow registration");
        service
            .set_flow_status(DEMO_FLOW, FlowStatus::Active)
            .expect("status update");

        let records = (1..=record_count)
            .map(|id| {
                SourceRecord::new(id, format!("Item {id}"), format!("SKU-{id:04}"), id as f64)
                    .with_category("General")
            })
            .collect();
        service.source().insert_all(records);
        service
    }

    /// A demo service that has already completed a full sync of the
    /// catalog: every active record exported, cursor at the last id.
    pub fn synced_service() -> MemorySyncService {
        let service = demo_service();
        let mut now = 1_000;
        loop {
            let report = service
                .trigger_heartbeat(now)
                .expect("heartbeat during setup");
            if report.records_processed == 0 {
                break;
            }
            now += 1_000;
        }
        service
    }
}
