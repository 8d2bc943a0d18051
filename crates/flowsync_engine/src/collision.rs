//! Collision resolution: decide whether a transformed record needs a write.
//!
//! The lookup key is the stable business key, not an auto-generated id,
//! which is what keeps the sink idempotent under re-delivery.

use flowsync_core::TransformedRecord;
use std::fmt;

/// Classification of a transformed record against the destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// No destination row exists for the business key; write it.
    New,
    /// A row exists and at least one mapped field differs; overwrite it.
    Updated,
    /// A row exists and every mapped field matches; no write.
    Redundant,
}

impl WriteOutcome {
    /// Returns true when the destination must be written.
    pub fn needs_write(&self) -> bool {
        matches!(self, WriteOutcome::New | WriteOutcome::Updated)
    }

    /// Returns the outcome as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            WriteOutcome::New => "new",
            WriteOutcome::Updated => "updated",
            WriteOutcome::Redundant => "redundant",
        }
    }
}

impl fmt::Display for WriteOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One changed field, with its old and new values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldChange {
    /// Name of the mapped field.
    pub field: &'static str,
    /// Previously exported value.
    pub old: String,
    /// Incoming value.
    pub new: String,
}

impl fmt::Display for FieldChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {:?} -> {:?}", self.field, self.old, self.new)
    }
}

/// The resolver's verdict for one transformed record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Classification of the record.
    pub outcome: WriteOutcome,
    /// Changed fields; non-empty only for [`WriteOutcome::Updated`].
    pub changes: Vec<FieldChange>,
}

impl Resolution {
    /// Returns true when the destination must be written.
    pub fn needs_write(&self) -> bool {
        self.outcome.needs_write()
    }

    /// Renders the changes as a single diff description.
    pub fn describe_changes(&self) -> String {
        self.changes
            .iter()
            .map(|c| c.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Compares a transformed record against the last written destination row.
///
/// The compared fields are the mapped ones: name, sku, price in cents and
/// category slug. The export timestamp is bookkeeping, not content, and is
/// deliberately not compared — otherwise every re-delivery would look like
/// a change.
pub fn resolve(existing: Option<&TransformedRecord>, incoming: &TransformedRecord) -> Resolution {
    let Some(existing) = existing else {
        return Resolution {
            outcome: WriteOutcome::New,
            changes: Vec::new(),
        };
    };

    let mut changes = Vec::new();
    if existing.name != incoming.name {
        changes.push(FieldChange {
            field: "name",
            old: existing.name.clone(),
            new: incoming.name.clone(),
        });
    }
    if existing.sku != incoming.sku {
        changes.push(FieldChange {
            field: "sku",
            old: existing.sku.clone(),
            new: incoming.sku.clone(),
        });
    }
    if existing.price_cents != incoming.price_cents {
        changes.push(FieldChange {
            field: "price_cents",
            old: existing.price_cents.to_string(),
            new: incoming.price_cents.to_string(),
        });
    }
    if existing.category_slug != incoming.category_slug {
        changes.push(FieldChange {
            field: "category_slug",
            old: existing.category_slug.clone(),
            new: incoming.category_slug.clone(),
        });
    }

    if changes.is_empty() {
        Resolution {
            outcome: WriteOutcome::Redundant,
            changes,
        }
    } else {
        Resolution {
            outcome: WriteOutcome::Updated,
            changes,
        }
    }
}
