use axum::extract::FromRequest;

use crate::errors::AppError;

/// `axum::Json` with rejections reported as `AppError::Validation`, so malformed
/// bodies get the same `{ "error": ... }` shape as every other failure.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);
