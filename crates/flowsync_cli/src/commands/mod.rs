//! CLI command implementations.

pub mod exports;
pub mod flows;
pub mod heartbeat;
pub mod purge;
pub mod reset;
pub mod runs;
pub mod seed;
pub mod toggle;

use flowsync_engine::{EngineConfig, MemorySyncService, StateFile};
use std::path::Path;

/// Loads the engine from the state file; fails when none exists yet.
pub(crate) fn load_service(
    path: &Path,
) -> Result<(MemorySyncService, StateFile), Box<dyn std::error::Error>> {
    let store = StateFile::new(path);
    let state = store.load()?.ok_or_else(|| {
        format!(
            "no state file at {}; run `flowsync seed` first",
            path.display()
        )
    })?;
    let service = MemorySyncService::from_state(state, EngineConfig::default());
    Ok((service, store))
}

/// Saves the engine state back to the state file.
pub(crate) fn save_service(
    service: &MemorySyncService,
    store: &StateFile,
) -> Result<(), Box<dyn std::error::Error>> {
    store.save(&service.snapshot()?)?;
    Ok(())
}

/// Renders an optional timestamp for text output.
pub(crate) fn show_millis(value: Option<u64>) -> String {
    match value {
        Some(ms) => ms.to_string(),
        None => "-".to_string(),
    }
}
