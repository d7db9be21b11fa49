//! Defensive coercion at the store boundary.
//!
//! Stored hash values arrive as untyped strings and may have been written
//! by older code or corrupted by hand. All numeric parsing is concentrated
//! here so the recorder and reporter never default-parse inline.

use std::collections::BTreeMap;

/// Parse a counter value, defaulting to 0 when absent or non-numeric.
pub fn coerce_count(raw: Option<String>) -> i64 {
    raw.and_then(|s| s.trim().parse::<i64>().ok()).unwrap_or(0)
}

/// Convert a counter hash into `(name, count)` pairs, preserving the map's
/// iteration order. Entries with an empty field name or a non-numeric value
/// are dropped rather than counted as 0 — a malformed entry should not
/// surface as a zero-view row in a ranked list.
pub fn coerce_counts(raw: BTreeMap<String, String>) -> Vec<(String, i64)> {
    raw.into_iter()
        .filter(|(name, _)| !name.is_empty())
        .filter_map(|(name, value)| value.trim().parse::<i64>().ok().map(|n| (name, n)))
        .collect()
}
