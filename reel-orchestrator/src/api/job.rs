//! Job API Handlers
//!
//! HTTP endpoints for submitting and inspecting media jobs.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use reel_core::domain::job::Job;
use reel_core::dto::job::{
    ExtractMusicRequest, SubmitJob, SubmitJobResponse, SynthesizeVideoRequest,
};
use uuid::Uuid;

use crate::api::error::{ApiError, ApiResult};
use crate::service::JobOrchestrator;

// =============================================================================
// Submission Endpoints
// =============================================================================

/// POST /api/jobs
/// Submit a job of any kind
pub async fn submit_job(
    State(orchestrator): State<JobOrchestrator>,
    Json(req): Json<SubmitJob>,
) -> ApiResult<(StatusCode, Json<SubmitJobResponse>)> {
    tracing::info!("Submitting {} job", req.kind);
    accept(&orchestrator, req).await
}

/// POST /api/extract-music
/// Extract the background music of a video
pub async fn extract_music(
    State(orchestrator): State<JobOrchestrator>,
    Json(req): Json<ExtractMusicRequest>,
) -> ApiResult<(StatusCode, Json<SubmitJobResponse>)> {
    tracing::info!("Music extraction requested for {}", req.video_url);
    accept(&orchestrator, req.into()).await
}

/// POST /api/synthesize-video
/// Produce a video from a source video and an uploaded file
pub async fn synthesize_video(
    State(orchestrator): State<JobOrchestrator>,
    Json(req): Json<SynthesizeVideoRequest>,
) -> ApiResult<(StatusCode, Json<SubmitJobResponse>)> {
    tracing::info!(
        "Video synthesis requested for {} with {}",
        req.video_url,
        req.uploaded_file_url
    );
    accept(&orchestrator, req.into()).await
}

async fn accept(
    orchestrator: &JobOrchestrator,
    req: SubmitJob,
) -> ApiResult<(StatusCode, Json<SubmitJobResponse>)> {
    let job = orchestrator.submit(req).await?;

    Ok((
        StatusCode::ACCEPTED,
        Json(SubmitJobResponse {
            job_id: job.id,
            status: job.status,
        }),
    ))
}

// =============================================================================
// Query Endpoints
// =============================================================================

/// GET /api/jobs
/// List all jobs, most recent first
pub async fn list_jobs(State(orchestrator): State<JobOrchestrator>) -> ApiResult<Json<Vec<Job>>> {
    tracing::debug!("Listing all jobs");

    let jobs = orchestrator.list_jobs().await?;
    Ok(Json(jobs))
}

/// GET /api/jobs/{id}
/// Get job details by ID
pub async fn get_job(
    State(orchestrator): State<JobOrchestrator>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Job>> {
    tracing::debug!("Getting job: {}", id);

    orchestrator
        .get_job(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Job {} not found", id)))
}

/// DELETE /api/jobs/{id}
/// Delete a job record
pub async fn delete_job(
    State(orchestrator): State<JobOrchestrator>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    tracing::info!("Deleting job: {}", id);

    if orchestrator.delete_job(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(format!("Job {} not found", id)))
    }
}
