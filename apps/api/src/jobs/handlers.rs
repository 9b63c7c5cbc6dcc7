use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::Value;
use tracing::info;

use crate::errors::AppError;
use crate::extract::AppJson;
use crate::jobs::{with_config, JobListResponse};
use crate::models::record::{new_record, patch_record, record_id, Record};
use crate::state::AppState;

fn job_not_found() -> AppError {
    AppError::NotFound("Job not found".to_string())
}

/// GET /jobs
pub async fn handle_list_jobs(
    State(state): State<AppState>,
) -> Result<Json<JobListResponse>, AppError> {
    let jobs = state.jobs.load().await?;
    let config = state.job_config.load().await?;
    Ok(Json(JobListResponse::new(jobs, &config)))
}

/// GET /jobs/:id
pub async fn handle_get_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Record>, AppError> {
    let jobs = state.jobs.load().await?;
    let config = state.job_config.load().await?;
    let job = jobs.find(&id).cloned().ok_or_else(job_not_found)?;
    Ok(Json(with_config(job, &config)))
}

/// POST /jobs
///
/// Appends the body verbatim; the caller owns the id and duplicates are not checked.
pub async fn handle_create_job(
    State(state): State<AppState>,
    AppJson(body): AppJson<Value>,
) -> Result<(StatusCode, Json<Record>), AppError> {
    let job = new_record(body)?;
    let mut jobs = state.jobs.load().await?;
    let config = state.job_config.load().await?;

    jobs.push(job.clone());
    state.jobs.replace(&jobs).await?;
    info!("Created job {}", record_id(&job).unwrap_or_default());

    Ok((StatusCode::CREATED, Json(with_config(job, &config))))
}

/// PUT /jobs/:id
pub async fn handle_update_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(body): AppJson<Value>,
) -> Result<Json<Record>, AppError> {
    let patch = patch_record(body)?;
    let mut jobs = state.jobs.load().await?;
    let config = state.job_config.load().await?;

    let job = jobs.merge(&id, patch).cloned().ok_or_else(job_not_found)?;
    state.jobs.replace(&jobs).await?;
    info!("Updated job {id}");

    Ok(Json(with_config(job, &config)))
}

/// DELETE /jobs/:id
pub async fn handle_delete_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Record>, AppError> {
    let mut jobs = state.jobs.load().await?;
    let config = state.job_config.load().await?;

    let job = jobs.remove(&id).ok_or_else(job_not_found)?;
    state.jobs.replace(&jobs).await?;
    info!("Deleted job {id}");

    Ok(Json(with_config(job, &config)))
}
