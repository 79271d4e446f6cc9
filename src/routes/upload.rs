use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::BlogError;
use crate::AppState;

/// Multipart field carrying the image.
const IMAGE_FIELD: &str = "image";
pub const MAX_IMAGE_SIZE: usize = 10 * 1024 * 1024; // 10MB
/// Request body cap for the upload route: the image plus multipart framing.
pub const UPLOAD_BODY_LIMIT: usize = MAX_IMAGE_SIZE + 1024 * 1024;
const ALLOWED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "gif"];

#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    pub url: String,
    pub filename: String,
}

fn validate_image_magic_bytes(bytes: &[u8]) -> Option<&'static str> {
    if bytes.len() < 4 {
        return None;
    }
    match bytes {
        // JPEG: FF D8 FF
        [0xFF, 0xD8, 0xFF, ..] => Some("image/jpeg"),
        // PNG: 89 50 4E 47
        [0x89, 0x50, 0x4E, 0x47, ..] => Some("image/png"),
        // GIF: 47 49 46 38
        [0x47, 0x49, 0x46, 0x38, ..] => Some("image/gif"),
        // WebP: 52 49 46 46 ... 57 45 42 50
        [0x52, 0x49, 0x46, 0x46, _, _, _, _, 0x57, 0x45, 0x42, 0x50, ..] => Some("image/webp"),
        _ => None,
    }
}

fn get_extension_from_mime(mime: &str) -> &'static str {
    match mime {
        "image/jpeg" => "jpg",
        "image/png" => "png",
        "image/gif" => "gif",
        "image/webp" => "webp",
        _ => "bin",
    }
}

fn file_extension(filename: &str) -> Option<String> {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
}

/// POST /api/blog/admin/upload - Store a cover or inline image
///
/// The declared extension and the file's magic bytes must both name an
/// allowed image type; the stored extension comes from the magic bytes.
pub async fn upload_image(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, BlogError> {
    let field = loop {
        match multipart.next_field().await {
            Ok(Some(field)) if field.name() == Some(IMAGE_FIELD) => break field,
            Ok(Some(_)) => continue,
            Ok(None) => return Err(BlogError::validation("No image uploaded")),
            Err(e) => {
                tracing::warn!(error = %e, "invalid multipart upload");
                return Err(BlogError::validation("Invalid multipart data"));
            }
        }
    };

    let original_name = field.file_name().unwrap_or("unknown").to_string();
    let declared_ext = file_extension(&original_name).unwrap_or_default();
    if !ALLOWED_EXTENSIONS.contains(&declared_ext.as_str()) {
        return Err(BlogError::validation(
            "Unsupported file type. Allowed: JPEG, PNG, WebP, GIF.",
        ));
    }

    let bytes = field.bytes().await.map_err(|e| {
        tracing::warn!(error = %e, "failed to read upload bytes");
        BlogError::validation("Failed to read file data")
    })?;

    if bytes.is_empty() {
        return Err(BlogError::validation("Empty file"));
    }
    if bytes.len() > MAX_IMAGE_SIZE {
        return Err(BlogError::validation("File too large. Maximum size is 10MB."));
    }

    let mime_type = validate_image_magic_bytes(&bytes).ok_or_else(|| {
        BlogError::validation("File content does not match an allowed image type.")
    })?;

    let filename = format!("blog-{}.{}", Uuid::new_v4(), get_extension_from_mime(mime_type));
    let key = format!("blog/{}", filename);
    let url = state.media.put(&key, &bytes, mime_type).await?;

    tracing::info!(filename = %filename, size = bytes.len(), mime_type, "image uploaded");

    Ok(Json(UploadResponse { url, filename }))
}
