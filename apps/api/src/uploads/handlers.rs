use axum::{
    extract::{
        multipart::{Field, MultipartError, MultipartRejection},
        Multipart, Path, State,
    },
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use bytes::BytesMut;
use tracing::{debug, info};

use crate::errors::AppError;
use crate::models::upload::{NewUpload, UploadResponse};
use crate::state::AppState;
use crate::uploads::storage::profile_filename;
use crate::uploads::validation::validate_image;

/// Multipart field that carries the photo.
pub const PHOTO_FIELD: &str = "photo";

const NO_FILE_MESSAGE: &str = "No file uploaded";

/// POST /upload
///
/// Accepts one `photo` file part, validates it and hands it to the configured backend.
pub async fn handle_upload(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, AppError> {
    // A body that is not multipart at all carries no file.
    let mut multipart = multipart.map_err(|_| AppError::Validation(NO_FILE_MESSAGE.to_string()))?;

    let limit = state.config.max_upload_bytes;
    let mut photo: Option<NewUpload> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, limit))?
    {
        let Some(original_name) = field.file_name().map(str::to_owned) else {
            continue; // plain text parts are ignored
        };
        let field_name = field.name().unwrap_or_default().to_owned();
        if field_name != PHOTO_FIELD || photo.is_some() {
            return Err(AppError::Validation(format!(
                "Unexpected field: {field_name}"
            )));
        }

        let mimetype = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_owned();
        validate_image(&original_name, &mimetype)?;

        let bytes = read_limited(field, limit).await?;
        photo = Some(NewUpload {
            original_name,
            mimetype,
            bytes: bytes.freeze(),
        });
    }

    let upload = photo.ok_or_else(|| AppError::Validation(NO_FILE_MESSAGE.to_string()))?;
    let filename = profile_filename(&upload.original_name);
    let size = upload.bytes.len();
    state.uploads.save(&filename, upload).await?;

    let backend = state.uploads.backend();
    info!("Stored upload {filename} ({size} bytes, {backend} storage)");

    Ok(Json(UploadResponse {
        success: true,
        url: format!("/uploads/{filename}"),
        filename,
        message: format!("File uploaded successfully ({backend} storage)"),
    }))
}

/// GET /uploads/:filename
pub async fn handle_get_upload(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Response, AppError> {
    let file = state
        .uploads
        .open(&filename)
        .await?
        .ok_or_else(|| AppError::NotFound("File not found".to_string()))?;
    debug!(
        "Serving {filename} (uploaded as {} at {})",
        file.original_name, file.uploaded_at
    );

    Ok(([(header::CONTENT_TYPE, file.mimetype)], file.bytes).into_response())
}

/// Buffers a file part, failing as soon as it grows past `limit` bytes.
async fn read_limited(mut field: Field<'_>, limit: usize) -> Result<BytesMut, AppError> {
    let mut buf = BytesMut::new();
    while let Some(chunk) = field.chunk().await.map_err(|e| multipart_error(e, limit))? {
        if buf.len() + chunk.len() > limit {
            return Err(too_large(limit));
        }
        buf.extend_from_slice(&chunk);
    }
    Ok(buf)
}

fn too_large(limit: usize) -> AppError {
    AppError::Validation(format!("File too large. Maximum size is {limit} bytes"))
}

/// The route body limit surfaces as a 413 stream error; report it like an
/// oversized photo.
fn multipart_error(err: MultipartError, limit: usize) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return too_large(limit);
    }
    AppError::Validation(err.body_text())
}
