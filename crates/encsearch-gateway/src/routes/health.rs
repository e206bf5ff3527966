//! Health check endpoint.

use axum::{extract::State, routing::get, Json, Router};
use chrono::{SecondsFormat, Utc};

use crate::json::HealthResponse;
use crate::AppState;

/// Health check routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}

/// Probe both stores and report connectivity plus record count.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let status = state.service.health().await;

    Json(HealthResponse {
        status: if status.is_healthy() { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        primary_connected: status.primary_connected,
        secondary_connected: status.secondary_connected,
        primary_records: status.primary_records,
        throttle: state.limiter.as_ref().map(|l| l.stats()),
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    })
}
