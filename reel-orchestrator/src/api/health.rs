//! Health Check API Handler
//!
//! Simple health check endpoint for monitoring.

use axum::{Json, http::StatusCode, response::IntoResponse};
use std::sync::OnceLock;
use std::time::Instant;

static STARTED_AT: OnceLock<Instant> = OnceLock::new();

/// Marks the start of the uptime reported by [`health_check`]
pub(crate) fn mark_started() {
    STARTED_AT.get_or_init(Instant::now);
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    let uptime = STARTED_AT.get_or_init(Instant::now).elapsed();

    (
        StatusCode::OK,
        Json(serde_json::json!({
            "status": "OK",
            "timestamp": chrono::Utc::now().to_rfc3339(),
            "uptime": uptime.as_secs_f64(),
        })),
    )
}
