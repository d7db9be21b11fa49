/// Fallback country whenever IP resolution is skipped or fails.
pub const UNKNOWN_COUNTRY: &str = "Unknown";

/// External IP-to-country lookup.
///
/// Infallible by construction: implementations map every failure mode
/// (timeout, non-2xx, malformed body) to [`UNKNOWN_COUNTRY`] internally, so
/// a misbehaving geolocation service can never break event recording.
#[async_trait::async_trait]
pub trait CountryResolver: Send + Sync + 'static {
    async fn resolve_country(&self, ip: &str) -> String;
}
