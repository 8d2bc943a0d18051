//! Property-based test generators using proptest.
//!
//! Provides strategies for generating random source data that maintains
//! the invariants the engine expects from a real source table (unique
//! ascending ids, finite non-negative prices).

use flowsync_core::SourceRecord;
use proptest::prelude::*;

/// Strategy for category labels, including junk and absent ones.
pub fn category_strategy() -> impl Strategy<Value = Option<String>> {
    prop_oneof![
        Just(None),
        Just(Some("Electronics".to_string())),
        Just(Some("Home & Kitchen".to_string())),
        Just(Some("Office Supplies".to_string())),
        // Labels that slug to the empty string.
        Just(Some("???".to_string())),
        prop::string::string_regex("[A-Za-z][A-Za-z &-]{0,20}")
            .expect("valid regex")
            .prop_map(Some),
    ]
}

/// Strategy for a finite, non-negative price with two decimal places.
pub fn price_strategy() -> impl Strategy<Value = f64> {
    (0u32..1_000_000).prop_map(|cents| f64::from(cents) / 100.0)
}

/// Strategy for a single source record with the given id.
pub fn source_record_strategy(id: u64) -> impl Strategy<Value = SourceRecord> {
    (
        prop::string::string_regex("[A-Za-z][A-Za-z0-9 ]{0,30}").expect("valid regex"),
        price_strategy(),
        category_strategy(),
        any::<bool>(),
    )
        .prop_map(move |(name, price, category, active)| {
            let mut record =
                SourceRecord::new(id, name, format!("SKU-{id:04}"), price).with_active(active);
            if let Some(category) = category {
                record = record.with_category(category);
            }
            record
        })
}

/// Strategy for a source table: up to `max_len` records with unique,
/// ascending ids starting at 1.
pub fn catalog_strategy(max_len: usize) -> impl Strategy<Value = Vec<SourceRecord>> {
    prop::collection::vec(
        (
            prop::string::string_regex("[A-Za-z][A-Za-z0-9 ]{0,30}").expect("valid regex"),
            price_strategy(),
            category_strategy(),
            any::<bool>(),
        ),
        0..=max_len,
    )
    .prop_map(|rows| {
        rows.into_iter()
            .enumerate()
            .map(|(i, (name, price, category, active))| {
                let id = i as u64 + 1;
                let mut record =
                    SourceRecord::new(id, name, format!("SKU-{id:04}"), price).with_active(active);
                if let Some(category) = category {
                    record = record.with_category(category);
                }
                record
            })
            .collect()
    })
}
