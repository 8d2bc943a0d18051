//! Runs command implementation.

use super::{load_service, show_millis};
use flowsync_engine::EngineError;
use std::path::Path;

/// Runs the runs command.
pub fn run(path: &Path, flow: &str, format: &str) -> Result<(), Box<dyn std::error::Error>> {
    let (service, _store) = load_service(path)?;
    if service.flow(flow)?.is_none() {
        return Err(Box::new(EngineError::FlowNotFound(flow.to_string())));
    }
    let runs = service.runs_for_flow(flow)?;

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&runs)?);
        }
        _ => {
            if runs.is_empty() {
                println!("No runs recorded for {flow}");
                return Ok(());
            }
            println!("Runs for {flow} (newest first):");
            for run in &runs {
                let bounds = match (run.first_id, run.last_id) {
                    (Some(first), Some(last)) => format!("ids {first}..={last}"),
                    _ => "no records".to_string(),
                };
                println!(
                    "  #{} {} due {} started {} ended {} ({})",
                    run.id,
                    run.status,
                    run.run_after,
                    show_millis(run.started_at),
                    show_millis(run.ended_at),
                    bounds
                );
                if let Some(message) = &run.error_message {
                    println!("     error: {message}");
                }
            }
        }
    }
    Ok(())
}
