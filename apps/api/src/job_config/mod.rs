//! Application-form configuration: a single document, read whole and replaced whole.

use axum::{extract::State, Json};
use serde_json::Value;
use tracing::info;

use crate::errors::AppError;
use crate::extract::AppJson;
use crate::models::job_config::JobConfig;
use crate::state::AppState;

/// GET /job-config
pub async fn handle_get_config(State(state): State<AppState>) -> Result<Json<JobConfig>, AppError> {
    Ok(Json(state.job_config.load().await?))
}

/// PUT /job-config
///
/// No merge: the body becomes the entire document and is echoed back.
pub async fn handle_replace_config(
    State(state): State<AppState>,
    AppJson(body): AppJson<Value>,
) -> Result<Json<JobConfig>, AppError> {
    let Value::Object(doc) = body else {
        return Err(AppError::Validation(
            "Job config must be a JSON object".to_string(),
        ));
    };
    let config = JobConfig(doc);
    state.job_config.replace(&config).await?;
    info!("Replaced job config ({} top-level keys)", config.0.len());
    Ok(Json(config))
}
