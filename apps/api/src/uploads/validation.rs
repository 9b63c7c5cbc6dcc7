//! Photo admission rules: both the file extension and the declared content type
//! must name an allowed image format, checked independently.

use std::path::Path;

use crate::errors::AppError;

pub const ALLOWED_IMAGE_TYPES: [&str; 4] = ["jpeg", "jpg", "png", "gif"];

pub const REJECTED_TYPE_MESSAGE: &str = "Only image files are allowed!";

/// Extension including the leading dot, original case (`"photo.JPG"` → `".JPG"`).
/// Dotfiles and names without a dot have no extension.
pub fn extension_of(file_name: &str) -> &str {
    match Path::new(file_name).extension().and_then(|ext| ext.to_str()) {
        Some(ext) if file_name.ends_with(ext) => &file_name[file_name.len() - ext.len() - 1..],
        _ => "",
    }
}

pub fn extension_allowed(file_name: &str) -> bool {
    let ext = extension_of(file_name).trim_start_matches('.').to_ascii_lowercase();
    ALLOWED_IMAGE_TYPES.contains(&ext.as_str())
}

/// `image/<subtype>` with an allowed subtype; parameters after `;` are ignored.
pub fn content_type_allowed(content_type: &str) -> bool {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    match essence.split_once('/') {
        Some(("image", subtype)) => ALLOWED_IMAGE_TYPES.contains(&subtype),
        _ => false,
    }
}

pub fn validate_image(file_name: &str, content_type: &str) -> Result<(), AppError> {
    if extension_allowed(file_name) && content_type_allowed(content_type) {
        Ok(())
    } else {
        Err(AppError::Validation(REJECTED_TYPE_MESSAGE.to_string()))
    }
}

/// Content type served for a file known only by name (disk backend).
pub fn content_type_for(file_name: &str) -> &'static str {
    let ext = extension_of(file_name).trim_start_matches('.').to_ascii_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        _ => "application/octet-stream",
    }
}
