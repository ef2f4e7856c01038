use axum::extract::Multipart;
use axum::Json;
use axum_extra::extract::CookieJar;
use serde::Serialize;

use crate::auth::session::require_identity;
use crate::db::models::FileEntry;
use crate::error::AppError;
use crate::state::AppState;

/// Response from a successful upload: one entry per file, ready to embed
/// in a `files` page.
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub files: Vec<FileEntry>,
}

/// Axum handler for `POST /api/v1/upload`.
///
/// Accepts a multipart form with one or more `file` fields and forwards
/// each to the CDN with the configured upload preset.
pub async fn upload_handler(
    axum::extract::State(state): axum::extract::State<AppState>,
    jar: CookieJar,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    require_identity(&jar)?;

    let mut files = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Multipart error: {e}")))?
    {
        let name = field.name().unwrap_or("").to_string();
        if name != "file" {
            continue;
        }

        let file_name = field.file_name().unwrap_or("upload.bin").to_string();
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();

        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Failed to read file: {e}")))?;

        let entry = state
            .uploader
            .upload(&file_name, &content_type, data.to_vec())
            .await?;

        files.push(entry);
    }

    if files.is_empty() {
        return Err(AppError::Validation(
            "No file field found in request".to_string(),
        ));
    }

    Ok(Json(UploadResponse { files }))
}
