//! Toggle command implementation.

use super::{load_service, save_service};
use std::path::Path;

/// Runs the toggle command.
pub fn run(path: &Path, flow: &str) -> Result<(), Box<dyn std::error::Error>> {
    let (service, store) = load_service(path)?;
    let status = service.toggle_flow(flow)?;
    save_service(&service, &store)?;

    println!("Flow '{flow}' is now {status}");
    Ok(())
}
