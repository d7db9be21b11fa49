//! Event Recorder: the write side of the analytics engine.

use std::sync::Arc;

use chrono::Utc;
use rand::{distributions::Alphanumeric, Rng};
use tracing::{debug, warn};

use tmarket_core::{
    event::{PageView, PageViewInput},
    geo::{CountryResolver, UNKNOWN_COUNTRY},
    ip::is_private_or_local,
    store::KvStore,
};

use crate::keys;

/// Records one page view per call: enriches it with a country, persists the
/// raw record, and applies the five per-day rollup updates.
pub struct EventRecorder {
    store: Arc<dyn KvStore>,
    resolver: Arc<dyn CountryResolver>,
}

impl EventRecorder {
    pub fn new(store: Arc<dyn KvStore>, resolver: Arc<dyn CountryResolver>) -> Self {
        Self { store, resolver }
    }

    /// Record a page view. Never fails: analytics must not break the
    /// request that triggered it, so every internal error is logged and
    /// swallowed. A store failure mid-sequence leaves the event partially
    /// recorded — accepted best-effort behaviour, the rollup counters that
    /// did land are still individually correct.
    pub async fn record(&self, input: PageViewInput) {
        match self.try_record(input).await {
            Ok(id) => debug!(event_id = %id, "page view recorded"),
            Err(e) => warn!(error = %e, "page view dropped"),
        }
    }

    async fn try_record(&self, input: PageViewInput) -> anyhow::Result<String> {
        let id = new_event_id();
        let now = Utc::now();

        // Resolve country before normalisation so the raw (possibly absent)
        // IP decides the short-circuit, not the "unknown" default.
        let ip = input.ip.clone().unwrap_or_default();
        let country = if is_private_or_local(&ip) {
            UNKNOWN_COUNTRY.to_string()
        } else {
            self.resolver.resolve_country(&ip).await
        };

        let view = PageView::from_input(input, id, country, now);

        // Raw record + audit index. Not read by the reporter.
        self.store
            .hash_set(&keys::raw_event(&view.id), &view.to_fields())
            .await?;
        self.store.set_add(keys::RAW_INDEX, &view.id).await?;

        let date = view.day();

        self.store
            .hash_incr(&keys::daily_views(date), &view.path, 1)
            .await?;
        self.store
            .hash_incr(&keys::daily_total(date), keys::TOTAL_FIELD, 1)
            .await?;
        // Set semantics: a session seen twice the same day stays one visitor.
        self.store
            .set_add(&keys::unique_visitors(date), &view.session_id)
            .await?;
        if !view.referrer.trim().is_empty() {
            self.store
                .hash_incr(&keys::referrers(date), &view.referrer, 1)
                .await?;
        }
        self.store
            .hash_incr(&keys::countries(date), &view.country, 1)
            .await?;

        Ok(view.id)
    }
}

/// Millisecond timestamp plus a 9-character random suffix. Collisions are
/// practically impossible at storefront traffic volumes.
fn new_event_id() -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(9)
        .map(char::from)
        .collect();
    format!("{}_{}", Utc::now().timestamp_millis(), suffix)
}
