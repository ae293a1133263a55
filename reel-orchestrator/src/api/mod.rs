//! API Module
//!
//! HTTP API layer for the orchestrator.
//! Each submodule handles endpoints for a specific domain.

pub mod error;
pub mod health;
pub mod job;

use axum::{
    Router,
    routing::{get, post},
};
use std::path::Path;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::service::JobOrchestrator;

/// Create the main API router with all endpoints
///
/// Produced artifacts are served from `downloads_dir` under `/downloads`.
pub fn create_router(orchestrator: JobOrchestrator, downloads_dir: impl AsRef<Path>) -> Router {
    health::mark_started();

    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Job endpoints
        .route("/api/jobs", post(job::submit_job).get(job::list_jobs))
        .route("/api/jobs/{id}", get(job::get_job).delete(job::delete_job))
        .route("/api/extract-music", post(job::extract_music))
        .route("/api/synthesize-video", post(job::synthesize_video))
        // Artifact downloads
        .nest_service("/downloads", ServeDir::new(downloads_dir.as_ref()))
        // Add state and middleware
        .with_state(orchestrator)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
