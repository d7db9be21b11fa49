use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::HeaderMap,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;

use crate::{auth::require_admin, error::AppError, state::AppState};

#[derive(Debug, Deserialize)]
pub struct AnalyticsQuery {
    pub days: Option<i64>,
}

/// `GET /api/analytics?days=N` — summary over the trailing `N` calendar
/// days ending today (UTC). Admin only. `days` defaults to 7 and must be
/// within 1–365; the reporter itself accepts any positive window, the range
/// cap is this layer's policy.
#[tracing::instrument(skip(state, headers))]
pub async fn get_analytics(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<AnalyticsQuery>,
) -> Result<impl IntoResponse, AppError> {
    require_admin(&state.config.auth_mode, &headers)?;

    let days = query.days.unwrap_or(7);
    if !(1..=365).contains(&days) {
        return Err(AppError::BadRequest(
            "days must be between 1 and 365".to_string(),
        ));
    }

    let summary = state.reporter.summary(days as u32).await;
    Ok(Json(summary))
}
