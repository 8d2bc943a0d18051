//! Flows command implementation.

use super::{load_service, show_millis};
use std::path::Path;

/// Runs the flows command.
pub fn run(path: &Path, format: &str) -> Result<(), Box<dyn std::error::Error>> {
    let (service, _store) = load_service(path)?;
    let flows = service.flows()?;

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&flows)?);
        }
        _ => {
            if flows.is_empty() {
                println!("No flows registered");
                return Ok(());
            }
            for flow in &flows {
                println!("{} [{}]", flow.name, flow.status);
                println!("  scope:       {:?}", flow.source.scope);
                println!("  sink:        {}", flow.sink.target);
                println!(
                    "  runtime:     batch {} every {}s",
                    flow.runtime.batch_size, flow.runtime.interval_secs
                );
                match flow.cursor {
                    Some(cursor) => println!("  cursor:      {cursor}"),
                    None => println!("  cursor:      - (from the beginning)"),
                }
                println!("  last run at: {}", show_millis(flow.last_run_at));
                if let Some(error) = &flow.last_error {
                    println!("  last error:  {error}");
                }
            }
        }
    }
    Ok(())
}
