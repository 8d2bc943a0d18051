//! Reset command implementation.
//!
//! Clearing a cursor makes the next run reprocess from the beginning.
//! Safe to do at any time: destination writes are idempotent per business
//! key, so a replay rewrites nothing that has not changed.

use super::{load_service, save_service};
use std::path::Path;

/// Runs the reset command.
pub fn run(path: &Path, flow: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let (service, store) = load_service(path)?;

    match flow {
        Some(name) => {
            service.reset_cursor(name)?;
            println!("Reset cursor for '{name}'");
        }
        None => {
            let count = service.reset_all_cursors()?;
            println!("Reset cursors for {count} flow(s)");
        }
    }

    save_service(&service, &store)?;
    Ok(())
}
