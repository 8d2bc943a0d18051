//! Exports command implementation.

use super::load_service;
use std::collections::BTreeMap;
use std::path::Path;

/// Runs the exports command.
pub fn run(path: &Path, format: &str) -> Result<(), Box<dyn std::error::Error>> {
    let (service, _store) = load_service(path)?;
    let rows = service.export_rows()?;

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }
        _ => {
            if rows.is_empty() {
                println!("No exports yet");
                return Ok(());
            }
            for row in &rows {
                println!(
                    "#{} {} ({}) {} cents [{}] exported at {}",
                    row.source_id,
                    row.name,
                    row.sku,
                    row.price_cents,
                    row.category_slug,
                    row.exported_at
                );
            }

            let total: i64 = rows.iter().map(|r| r.price_cents).sum();
            let mut by_category: BTreeMap<&str, usize> = BTreeMap::new();
            for row in &rows {
                *by_category.entry(row.category_slug.as_str()).or_default() += 1;
            }

            println!();
            println!("{} rows, total value {} cents", rows.len(), total);
            for (slug, count) in by_category {
                let label = if slug.is_empty() { "(blank)" } else { slug };
                println!("  {label}: {count}");
            }
        }
    }
    Ok(())
}
