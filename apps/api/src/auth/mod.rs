//! Credential check against the static user list. No sessions or tokens are issued;
//! the caller keeps the returned identity.

pub mod handlers;

use serde::Deserialize;

use crate::errors::AppError;
use crate::models::user::{User, UserSummary};

#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
}

/// Returns the first user whose email, password and role all match exactly.
pub fn authenticate(users: &[User], request: &LoginRequest) -> Result<UserSummary, AppError> {
    let (Some(email), Some(password), Some(role)) = (
        non_empty(&request.email),
        non_empty(&request.password),
        non_empty(&request.role),
    ) else {
        return Err(AppError::Validation(
            "Email, password, and role required".to_string(),
        ));
    };

    users
        .iter()
        .find(|u| u.email == email && u.password == password && u.role == role)
        .map(UserSummary::from)
        .ok_or_else(|| AppError::Unauthorized("Invalid credentials or role".to_string()))
}

fn non_empty(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.is_empty())
}
