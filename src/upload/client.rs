use async_trait::async_trait;
use serde::Deserialize;
use url::Url;

use crate::db::models::FileEntry;
use crate::error::AppError;

/// Trait for the file-upload CDN.
///
/// Abstracted so tests can record uploads without a real endpoint.
#[async_trait]
pub trait UploadClient: Send + Sync {
    /// Push one file to the CDN and return its hosted entry.
    async fn upload(
        &self,
        file_name: &str,
        content_type: &str,
        content: Vec<u8>,
    ) -> Result<FileEntry, AppError>;
}

/// Successful CDN response shape.
#[derive(Debug, Deserialize)]
struct CdnUploadResponse {
    original_filename: String,
    secure_url: String,
    bytes: u64,
    format: String,
}

/// CDN error response shape.
#[derive(Debug, Deserialize)]
struct CdnErrorResponse {
    error: CdnErrorBody,
}

#[derive(Debug, Deserialize)]
struct CdnErrorBody {
    message: String,
}

/// HTTP implementation of [`UploadClient`].
///
/// Sends a multipart form with the file plus the configured upload
/// preset, the way unsigned CDN uploads work.
pub struct HttpUploadClient {
    http: reqwest::Client,
    endpoint: Url,
    preset: String,
}

impl HttpUploadClient {
    pub fn new(http: reqwest::Client, endpoint: &str, preset: String) -> Result<Self, AppError> {
        let endpoint = Url::parse(endpoint)
            .map_err(|e| AppError::Internal(format!("Invalid upload endpoint: {e}")))?;
        Ok(Self {
            http,
            endpoint,
            preset,
        })
    }
}

#[async_trait]
impl UploadClient for HttpUploadClient {
    async fn upload(
        &self,
        file_name: &str,
        content_type: &str,
        content: Vec<u8>,
    ) -> Result<FileEntry, AppError> {
        let part = reqwest::multipart::Part::bytes(content)
            .file_name(file_name.to_string())
            .mime_str(content_type)
            .map_err(|e| AppError::Upload(format!("Invalid content type: {e}")))?;

        let form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("upload_preset", self.preset.clone());

        let response = self
            .http
            .post(self.endpoint.clone())
            .multipart(form)
            .send()
            .await
            .map_err(|e| AppError::Upload(format!("Upload endpoint unreachable: {e}")))?;

        if !response.status().is_success() {
            let message = response
                .json::<CdnErrorResponse>()
                .await
                .map(|e| e.error.message)
                .unwrap_or_else(|_| "Upload failed".to_string());
            return Err(AppError::Upload(message));
        }

        let uploaded: CdnUploadResponse = response
            .json()
            .await
            .map_err(|e| AppError::Upload(format!("Malformed upload response: {e}")))?;

        Ok(FileEntry {
            name: uploaded.original_filename,
            url: uploaded.secure_url,
            bytes: uploaded.bytes,
            format: uploaded.format,
        })
    }
}
