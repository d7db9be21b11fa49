use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The payload the client tracker sends to POST /api/analytics/track.
///
/// Every field is optional on the wire; the recorder normalises absent
/// fields to safe defaults before anything is persisted. `ip` is never
/// trusted from the body — the HTTP layer overwrites it from connection
/// headers before handing the payload to the recorder.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PageViewInput {
    pub path: Option<String>,
    pub user_agent: Option<String>,
    pub referrer: Option<String>,
    pub ip: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
    pub session_id: Option<String>,
    pub user_id: Option<String>,
}

/// The enriched, stored version of a page view — written once under
/// `pageview:{id}` and never updated. The reporter does not read these;
/// they exist for audit and debugging only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageView {
    pub id: String,
    pub path: String,
    pub user_agent: String,
    /// Raw client IP as extracted by the HTTP layer, or `"unknown"`.
    pub ip: String,
    /// Resolved at write time from `ip`; never re-resolved.
    pub country: String,
    pub referrer: String,
    pub timestamp: DateTime<Utc>,
    /// Caller-supplied pseudo-identifier used for uniqueness counting.
    pub session_id: String,
    /// Empty unless the visitor was authenticated.
    pub user_id: String,
}

impl PageView {
    /// Build the stored record from a raw input, applying the normalisation
    /// defaults: `path` → `"/"` (also when sent as an empty string), string
    /// fields → `""`, `ip` → `"unknown"`, `timestamp` → `now`.
    pub fn from_input(
        input: PageViewInput,
        id: String,
        country: String,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            path: input
                .path
                .filter(|p| !p.is_empty())
                .unwrap_or_else(|| "/".to_string()),
            user_agent: input.user_agent.unwrap_or_default(),
            ip: input
                .ip
                .filter(|ip| !ip.is_empty())
                .unwrap_or_else(|| "unknown".to_string()),
            country,
            referrer: input.referrer.unwrap_or_default(),
            timestamp: input.timestamp.unwrap_or(now),
            session_id: input.session_id.unwrap_or_default(),
            user_id: input.user_id.unwrap_or_default(),
        }
    }

    /// The UTC calendar day this view belongs to. Drives every rollup key.
    pub fn day(&self) -> chrono::NaiveDate {
        self.timestamp.date_naive()
    }

    /// Flatten into string pairs for hash-field storage.
    pub fn to_fields(&self) -> Vec<(String, String)> {
        vec![
            ("id".to_string(), self.id.clone()),
            ("path".to_string(), self.path.clone()),
            ("userAgent".to_string(), self.user_agent.clone()),
            ("ip".to_string(), self.ip.clone()),
            ("country".to_string(), self.country.clone()),
            ("referrer".to_string(), self.referrer.clone()),
            ("timestamp".to_string(), self.timestamp.to_rfc3339()),
            ("sessionId".to_string(), self.session_id.clone()),
            ("userId".to_string(), self.user_id.clone()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        "2024-03-10T12:00:00Z".parse().unwrap()
    }

    #[test]
    fn defaults_applied_for_empty_input() {
        let view = PageView::from_input(
            PageViewInput::default(),
            "1_abc".to_string(),
            "Unknown".to_string(),
            now(),
        );
        assert_eq!(view.path, "/");
        assert_eq!(view.user_agent, "");
        assert_eq!(view.ip, "unknown");
        assert_eq!(view.referrer, "");
        assert_eq!(view.session_id, "");
        assert_eq!(view.user_id, "");
        assert_eq!(view.timestamp, now());
    }

    #[test]
    fn empty_path_normalised_to_root() {
        let input = PageViewInput {
            path: Some(String::new()),
            ..Default::default()
        };
        let view = PageView::from_input(input, "1_abc".into(), "Unknown".into(), now());
        assert_eq!(view.path, "/");
    }

    #[test]
    fn caller_timestamp_wins_over_wall_clock() {
        let supplied: DateTime<Utc> = "2024-01-01T23:59:59Z".parse().unwrap();
        let input = PageViewInput {
            timestamp: Some(supplied),
            ..Default::default()
        };
        let view = PageView::from_input(input, "1_abc".into(), "Unknown".into(), now());
        assert_eq!(view.timestamp, supplied);
        assert_eq!(view.day().to_string(), "2024-01-01");
    }
}
