//! File upload endpoint: multipart `file` + `folder`, answered with the public URL.

use axum::{
    extract::{Multipart, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::auth::is_authenticated;
use crate::errors::AppError;
use crate::public::ADMISSION_UPLOAD_FOLDER;
use crate::AppState;

const DEFAULT_FOLDER: &str = "general";

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub success: bool,
    pub url: String,
}

impl IntoResponse for UploadResponse {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// POST /api/upload - Store one file under the requested folder.
///
/// Anyone may upload into the admission folder; every other folder needs the
/// admin key.
pub async fn upload_file(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<UploadResponse, AppError> {
    let mut folder = DEFAULT_FOLDER.to_string();
    let mut file: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Failed to read multipart data: {}", e)))?
    {
        let field_name = field.name().map(str::to_string);
        match field_name.as_deref() {
            Some("folder") => {
                let raw = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("Failed to read folder: {}", e)))?;
                folder = sanitize_folder(&raw);
            }
            Some("file") => {
                let name = field.file_name().unwrap_or("upload").to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("Failed to read file bytes: {}", e)))?;
                file = Some((name, bytes.to_vec()));
            }
            _ => {}
        }
    }

    if folder != ADMISSION_UPLOAD_FOLDER
        && !is_authenticated(state.config.api_psk.as_deref(), &headers)
    {
        return Err(AppError::Unauthorized("Missing or invalid API key".to_string()));
    }

    let (original_name, bytes) =
        file.ok_or_else(|| AppError::BadRequest("Multipart form must include a file".to_string()))?;

    if bytes.is_empty() {
        return Err(AppError::BadRequest("Uploaded file is empty".to_string()));
    }
    if bytes.len() > state.config.max_upload_bytes {
        return Err(AppError::BadRequest(format!(
            "File exceeds the {} byte limit",
            state.config.max_upload_bytes
        )));
    }

    let stored_name = match extension(&original_name) {
        Some(ext) => format!("{}.{}", uuid::Uuid::new_v4(), ext),
        None => uuid::Uuid::new_v4().to_string(),
    };

    let dir = state.config.upload_dir.join(&folder);
    tokio::fs::create_dir_all(&dir).await?;
    tokio::fs::write(dir.join(&stored_name), &bytes).await?;

    let url = format!("{}/{}/{}", state.config.public_url, folder, stored_name);
    tracing::info!(folder = %folder, size = bytes.len(), "file uploaded");

    Ok(UploadResponse { success: true, url })
}

/// Keep only `[A-Za-z0-9_-]`; the folder must stay inside the upload root.
fn sanitize_folder(raw: &str) -> String {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .collect();
    if cleaned.is_empty() {
        DEFAULT_FOLDER.to_string()
    } else {
        cleaned
    }
}

/// Lower-cased alphanumeric extension of at most 8 characters.
fn extension(name: &str) -> Option<String> {
    let (_, ext) = name.rsplit_once('.')?;
    let valid = !ext.is_empty() && ext.len() <= 8 && ext.chars().all(|c| c.is_ascii_alphanumeric());
    valid.then(|| ext.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_folder() {
        assert_eq!(sanitize_folder("faculty"), "faculty");
        assert_eq!(sanitize_folder("../../etc"), "etc");
        assert_eq!(sanitize_folder("hero slides"), "heroslides");
        assert_eq!(sanitize_folder("///"), DEFAULT_FOLDER);
    }

    #[test]
    fn test_extension() {
        assert_eq!(extension("Photo.JPG").as_deref(), Some("jpg"));
        assert_eq!(extension("archive.tar.gz").as_deref(), Some("gz"));
        assert_eq!(extension("noext"), None);
        assert_eq!(extension("evil.php%00"), None);
    }
}
