//! Rollup key schema.
//!
//! Key names match the store layout the dashboard has always read from, so
//! an existing dataset keeps working. Rollup keys are created implicitly on
//! first increment and are never deleted or decremented by this crate.

use chrono::NaiveDate;

/// Index set of all raw event ids (audit trail only).
pub const RAW_INDEX: &str = "pageviews";

/// Field holding the day counter inside `daily_total:{date}`.
pub const TOTAL_FIELD: &str = "views";

/// Raw event record hash.
pub fn raw_event(id: &str) -> String {
    format!("pageview:{id}")
}

/// Hash: path → views for the day.
pub fn daily_views(date: NaiveDate) -> String {
    format!("daily_views:{date}")
}

/// Hash with the single [`TOTAL_FIELD`] counter for the day.
pub fn daily_total(date: NaiveDate) -> String {
    format!("daily_total:{date}")
}

/// Set of distinct session ids seen on the day.
pub fn unique_visitors(date: NaiveDate) -> String {
    format!("unique_visitors:{date}")
}

/// Hash: referrer → views for the day (empty referrers are never written).
pub fn referrers(date: NaiveDate) -> String {
    format!("referrers:{date}")
}

/// Hash: country name → views for the day.
pub fn countries(date: NaiveDate) -> String {
    format!("countries:{date}")
}
