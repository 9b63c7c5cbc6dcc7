use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// A validated photo waiting to be handed to an upload backend.
#[derive(Debug, Clone)]
pub struct NewUpload {
    pub original_name: String,
    pub mimetype: String,
    pub bytes: Bytes,
}

/// A stored photo as returned by an upload backend.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub bytes: Bytes,
    pub mimetype: String,
    pub original_name: String,
    pub uploaded_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub success: bool,
    pub url: String,
    pub filename: String,
    pub message: String,
}
