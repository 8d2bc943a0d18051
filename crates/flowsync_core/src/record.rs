//! Source and transformed record types.

use crate::time::UnixMillis;
use serde::{Deserialize, Serialize};

/// A raw record read from the source table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceRecord {
    /// Source primary key; doubles as the destination business key.
    pub id: u64,
    /// Display name.
    pub name: String,
    /// Stock keeping unit, unique in the source table.
    pub sku: String,
    /// Unit price in decimal currency units.
    pub price: f64,
    /// Optional category label.
    pub category: Option<String>,
    /// Whether the record is in the active scope.
    pub active: bool,
}

impl SourceRecord {
    /// Creates an active, uncategorized record.
    pub fn new(id: u64, name: impl Into<String>, sku: impl Into<String>, price: f64) -> Self {
        Self {
            id,
            name: name.into(),
            sku: sku.into(),
            price,
            category: None,
            active: true,
        }
    }

    /// Sets the category label.
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Sets the active flag.
    pub fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }
}

/// The output of the transform stage.
///
/// Ephemeral on its own: it is either discarded as redundant or written as
/// the destination row for its `source_id`. A stored destination row is the
/// "last known exported state" used for collision comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformedRecord {
    /// Business key: the source record's primary key.
    pub source_id: u64,
    /// Display name, copied from the source.
    pub name: String,
    /// SKU, copied from the source.
    pub sku: String,
    /// Price in integer minor units (cents).
    pub price_cents: i64,
    /// URL-safe category slug.
    pub category_slug: String,
    /// When this row was exported.
    pub exported_at: UnixMillis,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_defaults() {
        let record = SourceRecord::new(7, "Desk Lamp", "HOME-002", 34.5);
        assert!(record.active);
        assert_eq!(record.category, None);

        let record = record.with_category("Home & Kitchen").with_active(false);
        assert_eq!(record.category.as_deref(), Some("Home & Kitchen"));
        assert!(!record.active);
    }
}
