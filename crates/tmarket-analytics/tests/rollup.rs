//! End-to-end tests of the recorder → rollup keys → reporter pipeline
//! against the in-memory store.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::anyhow;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

use tmarket_analytics::{keys, AnalyticsReporter, EventRecorder, MemoryStore};
use tmarket_core::{
    event::PageViewInput,
    geo::{CountryResolver, UNKNOWN_COUNTRY},
    store::KvStore,
};

/// Resolver stub that returns a fixed country and counts invocations.
struct StaticResolver {
    country: String,
    calls: AtomicUsize,
}

impl StaticResolver {
    fn new(country: &str) -> Self {
        Self {
            country: country.to_string(),
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl CountryResolver for StaticResolver {
    async fn resolve_country(&self, _ip: &str) -> String {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.country.clone()
    }
}

/// Resolver stub mapping specific IPs to countries.
struct MapResolver(HashMap<String, String>);

#[async_trait]
impl CountryResolver for MapResolver {
    async fn resolve_country(&self, ip: &str) -> String {
        self.0
            .get(ip)
            .cloned()
            .unwrap_or_else(|| UNKNOWN_COUNTRY.to_string())
    }
}

/// Store stub where every operation fails.
struct FailingStore;

#[async_trait]
impl KvStore for FailingStore {
    async fn hash_set(&self, _: &str, _: &[(String, String)]) -> anyhow::Result<()> {
        Err(anyhow!("store unreachable"))
    }
    async fn hash_get(&self, _: &str, _: &str) -> anyhow::Result<Option<String>> {
        Err(anyhow!("store unreachable"))
    }
    async fn hash_get_all(
        &self,
        _: &str,
    ) -> anyhow::Result<std::collections::BTreeMap<String, String>> {
        Err(anyhow!("store unreachable"))
    }
    async fn hash_incr(&self, _: &str, _: &str, _: i64) -> anyhow::Result<i64> {
        Err(anyhow!("store unreachable"))
    }
    async fn set_add(&self, _: &str, _: &str) -> anyhow::Result<bool> {
        Err(anyhow!("store unreachable"))
    }
    async fn set_members(&self, _: &str) -> anyhow::Result<Vec<String>> {
        Err(anyhow!("store unreachable"))
    }
    async fn set_with_ttl(
        &self,
        _: &str,
        _: &str,
        _: std::time::Duration,
    ) -> anyhow::Result<()> {
        Err(anyhow!("store unreachable"))
    }
    async fn get(&self, _: &str) -> anyhow::Result<Option<String>> {
        Err(anyhow!("store unreachable"))
    }
    async fn delete(&self, _: &str) -> anyhow::Result<()> {
        Err(anyhow!("store unreachable"))
    }
}

fn day(s: &str) -> NaiveDate {
    s.parse().expect("valid date")
}

fn at_noon(date: NaiveDate) -> DateTime<Utc> {
    date.and_hms_opt(12, 0, 0).expect("valid time").and_utc()
}

fn view(path: &str, session: &str, date: NaiveDate) -> PageViewInput {
    PageViewInput {
        path: Some(path.to_string()),
        session_id: Some(session.to_string()),
        timestamp: Some(at_noon(date)),
        ..Default::default()
    }
}

fn setup() -> (Arc<MemoryStore>, EventRecorder, AnalyticsReporter) {
    setup_with_resolver(Arc::new(StaticResolver::new("Mongolia")))
}

fn setup_with_resolver(
    resolver: Arc<dyn CountryResolver>,
) -> (Arc<MemoryStore>, EventRecorder, AnalyticsReporter) {
    let store = Arc::new(MemoryStore::new());
    let kv: Arc<dyn KvStore> = store.clone();
    let recorder = EventRecorder::new(kv.clone(), resolver);
    let reporter = AnalyticsReporter::new(kv);
    (store, recorder, reporter)
}

#[tokio::test]
async fn additivity_per_day() {
    let (store, recorder, _) = setup();
    let d = day("2024-03-10");
    for i in 0..5 {
        recorder
            .record(view(&format!("/p{}", i % 2), &format!("s{i}"), d))
            .await;
    }

    let total = store
        .hash_get(&keys::daily_total(d), keys::TOTAL_FIELD)
        .await
        .expect("read total");
    assert_eq!(total.as_deref(), Some("5"));

    let per_path = store
        .hash_get_all(&keys::daily_views(d))
        .await
        .expect("read daily views");
    let sum: i64 = per_path.values().map(|v| v.parse::<i64>().expect("count")).sum();
    assert_eq!(sum, 5, "sum of per-path counts must equal the day total");
}

#[tokio::test]
async fn reporting_is_idempotent() {
    let (_, recorder, reporter) = setup();
    let d = day("2024-03-10");
    recorder.record(view("/home", "s1", d)).await;
    recorder.record(view("/about", "s2", d)).await;

    let first = reporter.summary_ending(7, d).await;
    let second = reporter.summary_ending(7, d).await;
    assert_eq!(first, second);
}

#[tokio::test]
async fn window_has_exactly_n_contiguous_days() {
    let (_, _, reporter) = setup();
    let end = day("2024-03-10");
    let summary = reporter.summary_ending(7, end).await;

    assert_eq!(summary.daily_views.len(), 7);
    assert_eq!(summary.daily_views[0].date, "2024-03-04");
    assert_eq!(summary.daily_views[6].date, "2024-03-10");
    for pair in summary.daily_views.windows(2) {
        let a = day(&pair[0].date);
        let b = day(&pair[1].date);
        assert_eq!(b - a, chrono::Duration::days(1));
    }
}

#[tokio::test]
async fn empty_days_are_zero_filled() {
    let (_, recorder, reporter) = setup();
    let end = day("2024-03-10");
    // Events on the first and last day only; the middle days stay empty.
    recorder.record(view("/home", "s1", day("2024-03-08"))).await;
    recorder.record(view("/home", "s2", end)).await;

    let summary = reporter.summary_ending(3, end).await;
    assert_eq!(summary.daily_views.len(), 3);
    assert_eq!(summary.daily_views[0].views, 1);
    assert_eq!(summary.daily_views[1].views, 0, "gap day must appear with 0");
    assert_eq!(summary.daily_views[2].views, 1);
    assert_eq!(summary.total_page_views, 2);
}

#[tokio::test]
async fn top_pages_ranked_and_truncated() {
    let (_, recorder, reporter) = setup();
    let d = day("2024-03-10");
    // 15 paths with distinct view counts: /p1 gets 1 view ... /p15 gets 15.
    for i in 1..=15 {
        for j in 0..i {
            recorder
                .record(view(&format!("/p{i}"), &format!("s{i}-{j}"), d))
                .await;
        }
    }

    let summary = reporter.summary_ending(1, d).await;
    assert_eq!(summary.top_pages.len(), 10);
    let expected: Vec<(String, i64)> = (6..=15)
        .rev()
        .map(|i| (format!("/p{i}"), i as i64))
        .collect();
    let got: Vec<(String, i64)> = summary
        .top_pages
        .into_iter()
        .map(|p| (p.path, p.views))
        .collect();
    assert_eq!(got, expected);
}

#[tokio::test]
async fn country_percentages_over_full_total() {
    let mut map = HashMap::new();
    map.insert("1.1.1.1".to_string(), "A".to_string());
    map.insert("2.2.2.2".to_string(), "B".to_string());
    let (_, recorder, reporter) = setup_with_resolver(Arc::new(MapResolver(map)));
    let d = day("2024-03-10");
    for i in 0..30 {
        let mut input = view("/x", &format!("a{i}"), d);
        input.ip = Some("1.1.1.1".to_string());
        recorder.record(input).await;
    }
    for i in 0..70 {
        let mut input = view("/x", &format!("b{i}"), d);
        input.ip = Some("2.2.2.2".to_string());
        recorder.record(input).await;
    }

    let summary = reporter.summary_ending(1, d).await;
    let by_country: HashMap<String, (i64, i64)> = summary
        .countries
        .into_iter()
        .map(|c| (c.country, (c.views, c.percentage)))
        .collect();
    assert_eq!(by_country["A"], (30, 30));
    assert_eq!(by_country["B"], (70, 70));
}

#[tokio::test]
async fn empty_referrers_are_excluded() {
    let (store, recorder, reporter) = setup();
    let d = day("2024-03-10");

    let mut with_referrer = view("/home", "s1", d);
    with_referrer.referrer = Some("google.com".to_string());
    recorder.record(with_referrer).await;

    let mut empty = view("/home", "s2", d);
    empty.referrer = Some(String::new());
    recorder.record(empty).await;

    let mut whitespace = view("/home", "s3", d);
    whitespace.referrer = Some("   ".to_string());
    recorder.record(whitespace).await;

    let raw = store
        .hash_get_all(&keys::referrers(d))
        .await
        .expect("read referrers");
    assert_eq!(raw.len(), 1);

    let summary = reporter.summary_ending(1, d).await;
    assert_eq!(summary.referrers.len(), 1);
    assert_eq!(summary.referrers[0].source, "google.com");
    assert_eq!(summary.referrers[0].views, 1);
}

#[tokio::test]
async fn private_ip_never_hits_the_resolver() {
    let resolver = Arc::new(StaticResolver::new("Mongolia"));
    let (store, recorder, _) = setup_with_resolver(resolver.clone());
    let d = day("2024-03-10");

    let mut input = view("/home", "s1", d);
    input.ip = Some("192.168.1.1".to_string());
    recorder.record(input).await;

    assert_eq!(resolver.calls.load(Ordering::SeqCst), 0);
    let countries = store
        .hash_get_all(&keys::countries(d))
        .await
        .expect("read countries");
    assert_eq!(countries.get(UNKNOWN_COUNTRY).map(String::as_str), Some("1"));
}

#[tokio::test]
async fn recording_against_dead_store_does_not_panic() {
    let recorder = EventRecorder::new(
        Arc::new(FailingStore),
        Arc::new(StaticResolver::new("Mongolia")),
    );
    // Must swallow the store failure and return normally.
    recorder.record(view("/home", "s1", day("2024-03-10"))).await;
}

#[tokio::test]
async fn dead_store_degrades_to_zeroed_summary() {
    let reporter = AnalyticsReporter::new(Arc::new(FailingStore));
    let summary = reporter.summary_ending(3, day("2024-03-10")).await;
    assert_eq!(summary.total_page_views, 0);
    assert_eq!(summary.unique_visitors, 0);
    assert!(summary.top_pages.is_empty());
    assert!(summary.referrers.is_empty());
    assert!(summary.countries.is_empty());
    // Window shape survives even when every fetch fails.
    assert_eq!(summary.daily_views.len(), 3);
    assert!(summary.daily_views.iter().all(|d| d.views == 0));
}

#[tokio::test]
async fn same_session_counts_once_per_day_but_twice_across_days() {
    let (_, recorder, reporter) = setup();
    let end = day("2024-03-10");
    let prev = day("2024-03-09");

    // Twice on the same day: one visitor.
    recorder.record(view("/a", "returning", prev)).await;
    recorder.record(view("/b", "returning", prev)).await;
    // Again the next day: counted again.
    recorder.record(view("/c", "returning", end)).await;

    let summary = reporter.summary_ending(2, end).await;
    assert_eq!(summary.unique_visitors, 2);
    assert_eq!(summary.total_page_views, 3);
}

#[tokio::test]
async fn end_to_end_single_day_scenario() {
    let (_, recorder, reporter) = setup();
    let d = day("2024-03-10");

    let mut first = view("/home", "s1", d);
    first.ip = Some("202.170.64.1".to_string());
    first.referrer = Some("google.com".to_string());
    recorder.record(first).await;

    let mut second = view("/home", "s2", d);
    second.ip = Some("202.170.64.1".to_string());
    recorder.record(second).await;

    let mut third = view("/about", "s3", d);
    third.ip = Some("202.170.64.1".to_string());
    recorder.record(third).await;

    let summary = reporter.summary_ending(1, d).await;
    assert_eq!(summary.total_page_views, 3);
    assert_eq!(summary.unique_visitors, 3);

    let pages: Vec<(String, i64)> = summary
        .top_pages
        .iter()
        .map(|p| (p.path.clone(), p.views))
        .collect();
    assert_eq!(
        pages,
        vec![("/home".to_string(), 2), ("/about".to_string(), 1)]
    );

    assert_eq!(summary.referrers.len(), 1);
    assert_eq!(summary.referrers[0].source, "google.com");
    assert_eq!(summary.referrers[0].views, 1);

    assert_eq!(summary.countries.len(), 1);
    assert_eq!(summary.countries[0].country, "Mongolia");
    assert_eq!(summary.countries[0].views, 3);
    assert_eq!(summary.countries[0].percentage, 100);
}
