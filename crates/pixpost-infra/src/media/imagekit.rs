//! ImageKit media uploader.
//!
//! Incoming bytes are staged in a named temporary file, then streamed to the
//! ImageKit upload API as multipart form data. The staging file is a
//! [`NamedTempFile`] guard, so it is deleted on every exit path.

use std::io::Write;
use std::path::PathBuf;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use tempfile::NamedTempFile;

use pixpost_core::domain::{MediaFile, UploadedMedia};
use pixpost_core::ports::{MediaUploader, UploadError};

use super::guess_mime;

/// ImageKit credentials and upload settings.
#[derive(Debug, Clone)]
pub struct ImageKitConfig {
    /// Server-side key, sent as the Basic auth username.
    pub private_key: String,
    pub public_key: Option<String>,
    /// Public URL endpoint of the media library, e.g. `https://ik.imagekit.io/<id>`.
    pub url_endpoint: Option<String>,
    pub upload_url: String,
    pub tags: Vec<String>,
    /// Where staged files go. Defaults to the OS temp directory.
    pub staging_dir: Option<PathBuf>,
}

impl ImageKitConfig {
    pub const DEFAULT_UPLOAD_URL: &'static str = "https://upload.imagekit.io/api/v1/files/upload";

    pub fn new(private_key: impl Into<String>) -> Self {
        Self {
            private_key: private_key.into(),
            public_key: None,
            url_endpoint: None,
            upload_url: Self::DEFAULT_UPLOAD_URL.to_string(),
            tags: vec!["product".to_string(), "featured".to_string()],
            staging_dir: None,
        }
    }
}

/// Subset of the ImageKit upload response we rely on.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UploadResponse {
    file_id: Option<String>,
    url: String,
    file_type: String,
}

/// Uploads media to ImageKit.
pub struct ImageKitUploader {
    config: ImageKitConfig,
    http_client: reqwest::Client,
}

impl ImageKitUploader {
    pub fn new(config: ImageKitConfig) -> Self {
        tracing::debug!(
            upload_url = %config.upload_url,
            public_key = config.public_key.as_deref().unwrap_or("-"),
            "ImageKit uploader configured"
        );
        Self {
            config,
            http_client: reqwest::Client::new(),
        }
    }

    /// Copy the file into a fresh staging file that keeps its extension.
    async fn stage(&self, file: &MediaFile) -> Result<NamedTempFile, UploadError> {
        let bytes = file.bytes.clone();
        let suffix = file.extension().map(|ext| format!(".{ext}")).unwrap_or_default();
        let staging_dir = self.config.staging_dir.clone();

        tokio::task::spawn_blocking(move || {
            let mut builder = tempfile::Builder::new();
            builder.prefix("pixpost-").suffix(&suffix);
            let mut staged = match staging_dir {
                Some(dir) => builder.tempfile_in(dir),
                None => builder.tempfile(),
            }?;
            staged.write_all(&bytes)?;
            staged.flush()?;
            Ok::<_, std::io::Error>(staged)
        })
        .await
        .map_err(|e| UploadError::Staging(e.to_string()))?
        .map_err(|e| UploadError::Staging(e.to_string()))
    }

    async fn send(
        &self,
        staged: &NamedTempFile,
        file: &MediaFile,
    ) -> Result<UploadResponse, UploadError> {
        let handle = tokio::fs::File::open(staged.path())
            .await
            .map_err(|e| UploadError::Staging(e.to_string()))?;

        let mime = match &file.content_type {
            Some(declared) => declared.clone(),
            None => guess_mime(file.extension().as_deref()).to_string(),
        };
        let part = Part::stream_with_length(handle, file.len() as u64)
            .file_name(file.file_name.clone())
            .mime_str(&mime)
            .map_err(|e| UploadError::Staging(e.to_string()))?;

        let mut form = Form::new()
            .part("file", part)
            .text("fileName", file.file_name.clone())
            .text("useUniqueFileName", "true");
        if !self.config.tags.is_empty() {
            form = form.text("tags", self.config.tags.join(","));
        }

        let response = self
            .http_client
            .post(&self.config.upload_url)
            .basic_auth(&self.config.private_key, Some(""))
            .multipart(form)
            .send()
            .await
            .map_err(|e| UploadError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(UploadError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<UploadResponse>()
            .await
            .map_err(|e| UploadError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl MediaUploader for ImageKitUploader {
    async fn upload(&self, file: MediaFile) -> Result<UploadedMedia, UploadError> {
        let staged = self.stage(&file).await?;
        tracing::debug!(
            file_name = %file.file_name,
            staged = %staged.path().display(),
            size = file.len(),
            "Staged upload"
        );

        // `staged` drops at the end of this scope whatever `send` returned.
        let uploaded = self.send(&staged, &file).await?;

        if let Err(e) = staged.close() {
            tracing::warn!(error = %e, "Failed to remove staged upload");
        }

        tracing::info!(
            file_id = uploaded.file_id.as_deref().unwrap_or("-"),
            url = %uploaded.url,
            "Uploaded media to ImageKit"
        );

        Ok(UploadedMedia {
            url: uploaded.url,
            file_type: uploaded.file_type,
            name: file.file_name,
        })
    }
}
