//! Analytics Reporter: the read side of the analytics engine.
//!
//! Stateless and idempotent — every call re-scans the rollup keys for the
//! requested window; there is no caching layer.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Duration, NaiveDate, Utc};
use tracing::warn;

use tmarket_core::{
    analytics::{
        AnalyticsSummary, CountryCount, DailyCount, PageCount, ReferrerCount, TOP_LIMIT,
    },
    store::KvStore,
};

use crate::{keys, value};

/// Counter accumulator that remembers first-encounter order, so the stable
/// descending sort in [`top`](Self::top) breaks ties by insertion order.
#[derive(Default)]
struct OrderedTally {
    entries: Vec<(String, i64)>,
    index: HashMap<String, usize>,
}

impl OrderedTally {
    fn add(&mut self, name: &str, count: i64) {
        match self.index.get(name) {
            Some(&i) => self.entries[i].1 += count,
            None => {
                self.index.insert(name.to_string(), self.entries.len());
                self.entries.push((name.to_string(), count));
            }
        }
    }

    fn total(&self) -> i64 {
        self.entries.iter().map(|(_, n)| n).sum()
    }

    /// Descending by count, ties in first-encounter order, truncated.
    fn top(mut self, limit: usize) -> Vec<(String, i64)> {
        // sort_by is stable, which is what preserves insertion order on ties.
        self.entries.sort_by(|a, b| b.1.cmp(&a.1));
        self.entries.truncate(limit);
        self.entries
    }
}

/// Reads the per-day rollups for a trailing window and merges them into an
/// [`AnalyticsSummary`].
pub struct AnalyticsReporter {
    store: Arc<dyn KvStore>,
}

impl AnalyticsReporter {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self { store }
    }

    /// Summary over the trailing `days` calendar days ending today (UTC).
    /// Never fails: a completely unreachable store degrades to the all-zero
    /// default summary rather than surfacing an error to the dashboard.
    pub async fn summary(&self, days: u32) -> AnalyticsSummary {
        self.summary_ending(days, Utc::now().date_naive()).await
    }

    /// Same as [`summary`](Self::summary) with an explicit window end,
    /// so tests and backfills are not tied to the wall clock.
    pub async fn summary_ending(&self, days: u32, end_date: NaiveDate) -> AnalyticsSummary {
        let days = days.max(1);
        let start_date = end_date - Duration::days(i64::from(days) - 1);

        let mut total_page_views = 0i64;
        let mut unique_visitors = 0i64;
        let mut daily_views = Vec::with_capacity(days as usize);
        let mut pages = OrderedTally::default();
        let mut referrers = OrderedTally::default();
        let mut countries = OrderedTally::default();

        let mut date = start_date;
        while date <= end_date {
            // Each fetch fails independently and degrades to "no data for
            // that key" — a partial report beats no report.
            let total_key = keys::daily_total(date);
            let views = value::coerce_count(
                self.fetch(date, "daily total", || {
                    self.store.hash_get(&total_key, keys::TOTAL_FIELD)
                })
                .await
                .flatten(),
            );
            total_page_views += views;
            // Zero-fill: every day in the window appears, with or without data.
            daily_views.push(DailyCount {
                date: date.to_string(),
                views,
            });

            let visitors_key = keys::unique_visitors(date);
            if let Some(sessions) = self
                .fetch(date, "unique visitors", || {
                    self.store.set_members(&visitors_key)
                })
                .await
            {
                // Per-day cardinality, summed — deliberately not a global
                // distinct count across the window.
                unique_visitors += sessions.len() as i64;
            }

            for (tally, label, key) in [
                (&mut pages, "daily views", keys::daily_views(date)),
                (&mut referrers, "referrers", keys::referrers(date)),
                (&mut countries, "countries", keys::countries(date)),
            ] {
                if let Some(raw) = self
                    .fetch(date, label, || self.store.hash_get_all(&key))
                    .await
                {
                    for (name, count) in value::coerce_counts(raw) {
                        tally.add(&name, count);
                    }
                }
            }

            date += Duration::days(1);
        }

        // Percentage base is the sum over all countries, not just the top 10.
        let total_country_views = countries.total();

        AnalyticsSummary {
            total_page_views,
            unique_visitors,
            top_pages: pages
                .top(TOP_LIMIT)
                .into_iter()
                .map(|(path, views)| PageCount { path, views })
                .collect(),
            daily_views,
            referrers: referrers
                .top(TOP_LIMIT)
                .into_iter()
                .map(|(source, views)| ReferrerCount { source, views })
                .collect(),
            countries: countries
                .top(TOP_LIMIT)
                .into_iter()
                .map(|(country, views)| CountryCount {
                    country,
                    views,
                    percentage: percentage(views, total_country_views),
                })
                .collect(),
        }
    }

    /// Run one store fetch, logging and discarding any failure.
    async fn fetch<T, F, Fut>(&self, date: NaiveDate, what: &str, op: F) -> Option<T>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = anyhow::Result<T>>,
    {
        match op().await {
            Ok(v) => Some(v),
            Err(e) => {
                warn!(date = %date, error = %e, "skipping {what} fetch");
                None
            }
        }
    }
}

/// `round(views * 100 / total)`, half-up; 0 when there is no data at all.
fn percentage(views: i64, total: i64) -> i64 {
    if total <= 0 {
        return 0;
    }
    ((views as f64) * 100.0 / (total as f64)).round() as i64
}
