//! HTTP IP-to-country resolution.
//!
//! Two free geolocation services: `ipapi.co` (plain-text country name) with
//! `ip-api.com` (JSON) as fallback. One bounded client timeout covers both
//! calls; any failure degrades to [`UNKNOWN_COUNTRY`]. Private and local
//! addresses never reach this module — the recorder short-circuits them
//! first.

use std::time::Duration;

use tracing::warn;

use tmarket_core::geo::{CountryResolver, UNKNOWN_COUNTRY};

const PRIMARY_BASE: &str = "https://ipapi.co";
const FALLBACK_BASE: &str = "http://ip-api.com";

pub struct HttpCountryResolver {
    client: reqwest::Client,
    primary_base: String,
    fallback_base: String,
}

impl HttpCountryResolver {
    pub fn new(timeout: Duration) -> anyhow::Result<Self> {
        Self::with_endpoints(PRIMARY_BASE, FALLBACK_BASE, timeout)
    }

    /// Constructor with overridable service base URLs, for tests.
    pub fn with_endpoints(
        primary_base: &str,
        fallback_base: &str,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("tmarket/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            primary_base: primary_base.trim_end_matches('/').to_string(),
            fallback_base: fallback_base.trim_end_matches('/').to_string(),
        })
    }

    /// `GET {base}/{ip}/country_name/` → plain-text country name.
    async fn primary(&self, ip: &str) -> Option<String> {
        let url = format!("{}/{}/country_name/", self.primary_base, ip);
        let resp = self.client.get(&url).send().await.ok()?;
        if !resp.status().is_success() {
            return None;
        }
        let body = resp.text().await.ok()?;
        let country = body.trim();
        (!country.is_empty()).then(|| country.to_string())
    }

    /// `GET {base}/json/{ip}?fields=country` → `{"country": "..."}`.
    async fn fallback(&self, ip: &str) -> Option<String> {
        let url = format!("{}/json/{}?fields=country", self.fallback_base, ip);
        let resp = self.client.get(&url).send().await.ok()?;
        if !resp.status().is_success() {
            return None;
        }
        let body: serde_json::Value = resp.json().await.ok()?;
        let country = body.get("country")?.as_str()?.trim();
        (!country.is_empty()).then(|| country.to_string())
    }
}

#[async_trait::async_trait]
impl CountryResolver for HttpCountryResolver {
    async fn resolve_country(&self, ip: &str) -> String {
        if let Some(country) = self.primary(ip).await {
            return country;
        }
        if let Some(country) = self.fallback(ip).await {
            return country;
        }
        warn!(ip, "geolocation lookup failed on both services");
        UNKNOWN_COUNTRY.to_string()
    }
}
