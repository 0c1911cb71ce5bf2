//! Job management handlers.

use super::{CancelJobResponse, CreateJobRequest, CreateJobResponse};
use crate::api::AppState;
use crate::error::{ApiError, Error};
use crate::extractor::Platform;
use crate::types::JobId;
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};

/// GET /jobs - List all jobs
#[utoipa::path(
    get,
    path = "/jobs",
    tag = "jobs",
    responses(
        (status = 200, description = "Snapshots of all jobs, oldest first", body = Vec<crate::types::JobSnapshot>)
    )
)]
pub async fn list_jobs(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.manager.list())
}

/// GET /jobs/:id - Get a single job
#[utoipa::path(
    get,
    path = "/jobs/{id}",
    tag = "jobs",
    params(
        ("id" = String, Path, description = "Job ID")
    ),
    responses(
        (status = 200, description = "Job snapshot", body = crate::types::JobSnapshot),
        (status = 404, description = "Job not found", body = crate::error::ApiError)
    )
)]
pub async fn get_job(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let id = match parse_job_id(&id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match state.manager.snapshot(id) {
        Ok(snapshot) => (StatusCode::OK, Json(snapshot)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// POST /jobs - Create a job and start it
#[utoipa::path(
    post,
    path = "/jobs",
    tag = "jobs",
    request_body = CreateJobRequest,
    responses(
        (status = 201, description = "Job created and scheduled", body = CreateJobResponse),
        (status = 400, description = "Invalid request or platform mismatch", body = crate::error::ApiError),
        (status = 500, description = "Output directory could not be created", body = crate::error::ApiError)
    )
)]
pub async fn create_job(
    State(state): State<AppState>,
    Json(request): Json<CreateJobRequest>,
) -> Response {
    if let Some(name) = request.platform.as_deref().filter(|p| !p.trim().is_empty()) {
        let detected = Platform::classify(&request.profile_url);
        match Platform::from_name(name) {
            Some(expected) if expected == detected => {}
            Some(expected) => {
                return Error::Validation(format!(
                    "profile_url is not a {} URL (detected {})",
                    expected, detected
                ))
                .into_response();
            }
            None => {
                return Error::Validation(format!("unknown platform '{}'", name.trim()))
                    .into_response();
            }
        }
    }

    match state.manager.create(request.into_new_job()).await {
        Ok(job) => {
            state.manager.spawn(job.id());
            (
                StatusCode::CREATED,
                Json(CreateJobResponse { job_id: job.id() }),
            )
                .into_response()
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to create job");
            e.into_response()
        }
    }
}

/// POST /jobs/:id/cancel - Cancel a job
#[utoipa::path(
    post,
    path = "/jobs/{id}/cancel",
    tag = "jobs",
    params(
        ("id" = String, Path, description = "Job ID")
    ),
    responses(
        (status = 200, description = "Cancel signal sent (also for jobs that already finished)", body = CancelJobResponse),
        (status = 404, description = "Job not found", body = crate::error::ApiError)
    )
)]
pub async fn cancel_job(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let id = match parse_job_id(&id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match state.manager.cancel(id) {
        Ok(()) => (
            StatusCode::OK,
            Json(CancelJobResponse {
                status: "cancelled".to_string(),
            }),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

/// A malformed id can never name a job, so it is reported as not found
#[allow(clippy::result_large_err)]
fn parse_job_id(raw: &str) -> Result<JobId, Response> {
    raw.parse::<JobId>()
        .map_err(|_| ApiError::not_found(format!("job {}", raw)).into_response())
}
