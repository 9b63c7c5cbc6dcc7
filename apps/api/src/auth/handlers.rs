use axum::{extract::State, Json};
use serde::Serialize;
use tracing::{info, warn};

use crate::auth::{authenticate, LoginRequest};
use crate::errors::AppError;
use crate::extract::AppJson;
use crate::models::user::UserSummary;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: String,
    pub user: UserSummary,
}

/// POST /login
pub async fn handle_login(
    State(state): State<AppState>,
    AppJson(request): AppJson<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let users = state.users.load().await?.users;
    match authenticate(&users, &request) {
        Ok(user) => {
            info!("Login succeeded for {} as {}", user.email, user.role);
            Ok(Json(LoginResponse {
                message: "Login successful".to_string(),
                user,
            }))
        }
        Err(e) => {
            warn!("Login rejected: {e}");
            Err(e)
        }
    }
}
