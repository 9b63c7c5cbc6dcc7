use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::Value;
use tracing::info;

use crate::errors::AppError;
use crate::extract::AppJson;
use crate::models::record::{new_record, patch_record, record_id, Record, RecordCollection};
use crate::state::AppState;

fn candidate_not_found() -> AppError {
    AppError::NotFound("Candidate not found".to_string())
}

/// GET /candidates
pub async fn handle_list_candidates(
    State(state): State<AppState>,
) -> Result<Json<RecordCollection>, AppError> {
    Ok(Json(state.candidates.load().await?))
}

/// GET /candidates/:id
pub async fn handle_get_candidate(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Record>, AppError> {
    let candidates = state.candidates.load().await?;
    let candidate = candidates.find(&id).cloned().ok_or_else(candidate_not_found)?;
    Ok(Json(candidate))
}

/// POST /candidates
pub async fn handle_create_candidate(
    State(state): State<AppState>,
    AppJson(body): AppJson<Value>,
) -> Result<(StatusCode, Json<Record>), AppError> {
    let candidate = new_record(body)?;
    let mut candidates = state.candidates.load().await?;

    candidates.push(candidate.clone());
    state.candidates.replace(&candidates).await?;
    info!("Created candidate {}", record_id(&candidate).unwrap_or_default());

    Ok((StatusCode::CREATED, Json(candidate)))
}

/// PUT /candidates/:id
pub async fn handle_update_candidate(
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(body): AppJson<Value>,
) -> Result<Json<Record>, AppError> {
    let patch = patch_record(body)?;
    let mut candidates = state.candidates.load().await?;

    let candidate = candidates
        .merge(&id, patch)
        .cloned()
        .ok_or_else(candidate_not_found)?;
    state.candidates.replace(&candidates).await?;
    info!("Updated candidate {id}");

    Ok(Json(candidate))
}

/// DELETE /candidates/:id
pub async fn handle_delete_candidate(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Record>, AppError> {
    let mut candidates = state.candidates.load().await?;

    let candidate = candidates.remove(&id).ok_or_else(candidate_not_found)?;
    state.candidates.replace(&candidates).await?;
    info!("Deleted candidate {id}");

    Ok(Json(candidate))
}
