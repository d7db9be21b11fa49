use std::sync::Arc;

use axum::{extract::State, http::HeaderMap, response::IntoResponse, Json};
use serde_json::json;

use tmarket_core::{event::PageViewInput, ip::is_private_or_local};

use crate::state::AppState;

/// `POST /api/analytics/track` — record one page view.
///
/// Fire-and-forget from the client's perspective: the recorder swallows
/// every internal failure, so this endpoint cannot return an error for a
/// well-formed request. The client IP is always taken from connection
/// headers; anything in the body is overwritten.
///
/// Responds `202 Accepted` with `{ "ok": true }`.
#[tracing::instrument(skip(state, headers, input))]
pub async fn track(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(mut input): Json<PageViewInput>,
) -> impl IntoResponse {
    input.ip = Some(extract_client_ip(&headers));
    state.recorder.record(input).await;
    (axum::http::StatusCode::ACCEPTED, Json(json!({ "ok": true })))
}

/// Extract the real client IP from proxy headers.
///
/// `x-forwarded-for` can carry a chain; prefer its first public entry, fall
/// back to its first entry, then try the single-value headers various CDNs
/// set. `"unknown"` when nothing is present — the recorder treats that as
/// local and skips geolocation.
fn extract_client_ip(headers: &HeaderMap) -> String {
    if let Some(forwarded) = headers.get("x-forwarded-for").and_then(|v| v.to_str().ok()) {
        let entries: Vec<&str> = forwarded.split(',').map(str::trim).collect();
        if let Some(public) = entries.iter().find(|ip| !is_private_or_local(ip)) {
            return public.to_string();
        }
        if let Some(first) = entries.first().filter(|ip| !ip.is_empty()) {
            return first.to_string();
        }
    }

    for name in ["cf-connecting-ip", "x-real-ip", "x-client-ip"] {
        if let Some(ip) = headers.get(name).and_then(|v| v.to_str().ok()) {
            if !ip.trim().is_empty() {
                return ip.trim().to_string();
            }
        }
    }

    "unknown".to_string()
}
