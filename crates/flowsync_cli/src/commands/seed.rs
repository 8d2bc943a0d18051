//! Seed command implementation.
//!
//! Creates a state file holding the sample catalog and registers the demo
//! flow, mirroring what a fresh install of the surrounding application
//! would set up.

use flowsync_core::{now_millis, FlowStatus, RuntimeSpec, SinkSpec, SourceRecord, SourceSpec};
use flowsync_engine::{MemorySyncService, StateFile};
use std::path::Path;
use tracing::info;

/// Name of the demo flow.
const DEMO_FLOW: &str = "product_sync_flow";

fn sample_catalog() -> Vec<SourceRecord> {
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

/// Runs the seed command.
pub fn run(path: &Path, force: bool) -> Result<(), Box<dyn std::error::Error>> {
    let store = StateFile::new(path);
    if store.load()?.is_some() && !force {
        return Err(format!(
            "state file {} already exists; use --force to overwrite",
            path.display()
        )
        .into());
    }

    let service = MemorySyncService::in_memory();
    let catalog = sample_catalog();
    let active = catalog.iter().filter(|r| r.active).count();
    let total = catalog.len();
    service.source().insert_all(catalog);

    service.register_flow(
        DEMO_FLOW,
        SourceSpec::active_only(),
        SinkSpec::default(),
        RuntimeSpec::new(3).with_interval_secs(10),
        now_millis(),
    )?;
    service.set_flow_status(DEMO_FLOW, FlowStatus::Active)?;
    info!(flow = DEMO_FLOW, "seeded demo flow");

    store.save(&service.snapshot()?)?;

    println!("Seeded {} ({} products, {} active)", path.display(), total, active);
    println!("Registered flow '{DEMO_FLOW}' (active, batch size 3)");
    println!("Next: flowsync heartbeat --state {}", path.display());
    Ok(())
}
