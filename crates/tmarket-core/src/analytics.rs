//! Summary DTOs returned by the analytics reporter.
//!
//! Field names serialise in camelCase — this shape is the contract the
//! admin dashboard consumes and predates this implementation.

use serde::{Deserialize, Serialize};

/// Number of entries kept in each ranked list (pages, referrers, countries).
pub const TOP_LIMIT: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageCount {
    pub path: String,
    pub views: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyCount {
    /// `YYYY-MM-DD`, UTC.
    pub date: String,
    pub views: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferrerCount {
    pub source: String,
    pub views: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountryCount {
    pub country: String,
    pub views: i64,
    /// Share of *all* country views in the window (not just the top 10),
    /// rounded half-up to a whole percent.
    pub percentage: i64,
}

/// Recomputed per request; never persisted. `Default` is the all-zero
/// degraded shape returned when the store is entirely unreachable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSummary {
    pub total_page_views: i64,
    /// Sum of per-day distinct-session counts. A visitor active on two days
    /// in the window counts twice — an inherited, observable property of the
    /// rollup design, not deduplicated across days.
    pub unique_visitors: i64,
    pub top_pages: Vec<PageCount>,
    /// One entry per calendar day in the window, ascending, zero-filled.
    pub daily_views: Vec<DailyCount>,
    pub referrers: Vec<ReferrerCount>,
    pub countries: Vec<CountryCount>,
}
