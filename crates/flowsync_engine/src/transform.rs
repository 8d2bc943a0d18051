//! Transform stage: source record to destination representation.
//!
//! Pure apart from the caller-supplied "exported at" timestamp. A record
//! the stage cannot normalize fails the whole run; silently skipping it
//! would desynchronize the cursor from the source.

use crate::error::{EngineError, EngineResult};
use flowsync_core::{SourceRecord, TransformedRecord, UnixMillis};

/// Slug substituted when a record carries no category label.
pub const FALLBACK_CATEGORY: &str = "uncategorized";

/// Maps a raw source record to its destination representation.
///
/// Fails on a malformed price (non-finite or negative); every other field
/// is normalized or copied losslessly.
pub fn transform(record: &SourceRecord, exported_at: UnixMillis) -> EngineResult<TransformedRecord> {
    if !record.price.is_finite() {
        return Err(EngineError::Transform {
            record_id: record.id,
            message: format!("price is not a finite number: {}", record.price),
        });
    }
    if record.price < 0.0 {
        return Err(EngineError::Transform {
            record_id: record.id,
            message: format!("price is negative: {}", record.price),
        });
    }

    let category_slug = match &record.category {
        Some(label) => slugify(label),
        None => FALLBACK_CATEGORY.to_string(),
    };

    Ok(TransformedRecord {
        source_id: record.id,
        name: record.name.clone(),
        sku: record.sku.clone(),
        price_cents: price_to_cents(record.price),
        category_slug,
        exported_at,
    })
}

/// Converts a decimal unit price to integer minor units.
///
/// Truncates toward zero rather than rounding; a zero price yields 0.
/// Callers validate the price first; see [`transform`].
pub fn price_to_cents(price: f64) -> i64 {
    (price * 100.0).trunc() as i64
}

/// Converts a label to a URL-safe slug.
///
/// Lowercases, keeps alphanumeric runs, collapses everything else into a
/// single `-`, and trims leading/trailing separators. A label with no
/// alphanumeric characters slugs to the empty string.
pub fn slugify(label: &str) -> String {
    let mut slug = String::with_capacity(label.len());
    let mut pending_separator = false;

    for ch in label.chars() {
        if ch.is_alphanumeric() {
            if pending_separator && !slug.is_empty() {
                slug.push('-');
            }
            pending_separator = false;
            for lower in ch.to_lowercase() {
                slug.push(lower);
            }
        } else {
            pending_separator = true;
        }
    }

    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn copies_fields_and_stamps_export_time() {
        let record = SourceRecord::new(7, "Desk Lamp", "HOME-002", 34.5)
            .with_category("Home & Kitchen");
        let transformed = transform(&record, 1_234).unwrap();

        assert_eq!(transformed.source_id, 7);
        assert_eq!(transformed.name, "Desk Lamp");
        assert_eq!(transformed.sku, "HOME-002");
        assert_eq!(transformed.price_cents, 3450);
        assert_eq!(transformed.category_slug, "home-kitchen");
        assert_eq!(transformed.exported_at, 1_234);
    }

    #[test]
    fn price_truncates_toward_zero() {
        assert_eq!(price_to_cents(12.5), 1250);
        assert_eq!(price_to_cents(45.0), 4500);
        // 29.99 * 100 lands just below 2999 in binary floating point; the
        // conversion truncates, it never rounds.
        assert_eq!(price_to_cents(29.99), 2998);
    }

    #[test]
    fn zero_price_yields_zero_not_an_error() {
        let record = SourceRecord::new(1, "Freebie", "FREE-001", 0.0);
        assert_eq!(transform(&record, 0).unwrap().price_cents, 0);
    }

    #[test]
    fn missing_category_takes_fallback() {
        let record = SourceRecord::new(1, "Pen Pack", "OFFICE-002", 8.99);
        assert_eq!(transform(&record, 0).unwrap().category_slug, "uncategorized");
    }

    #[test]
    fn junk_category_slugs_to_empty_not_fallback() {
        // A present-but-junk label is slugged, not substituted.
        let record = SourceRecord::new(1, "Mystery", "MYS-001", 1.0).with_category("???");
        assert_eq!(transform(&record, 0).unwrap().category_slug, "");
    }

    #[test]
    fn slugify_normalizes_labels() {
        assert_eq!(slugify("Home & Kitchen"), "home-kitchen");
        assert_eq!(slugify("Office Supplies"), "office-supplies");
        assert_eq!(slugify("Electronics"), "electronics");
        assert_eq!(slugify("  padded  "), "padded");
        assert_eq!(slugify("A/B-Test 2"), "a-b-test-2");
        assert_eq!(slugify(""), "");
    }

    #[test]
    fn negative_price_is_malformed() {
        let record = SourceRecord::new(9, "Refund", "REF-001", -1.0);
        let err = transform(&record, 0).unwrap_err();
        assert!(matches!(err, EngineError::Transform { record_id: 9, .. }));
    }

    #[test]
    fn non_finite_price_is_malformed() {
        let record = SourceRecord::new(9, "Glitch", "GLI-001", f64::NAN);
        assert!(transform(&record, 0).is_err());
        let record = SourceRecord::new(9, "Glitch", "GLI-001", f64::INFINITY);
        assert!(transform(&record, 0).is_err());
    }
}
