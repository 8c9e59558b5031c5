//! Media host port.

use async_trait::async_trait;

use crate::domain::{MediaFile, UploadedMedia};

/// Stores a binary somewhere public and reports where it ended up.
#[async_trait]
pub trait MediaUploader: Send + Sync {
    /// Upload `file`. Any staging resources are released before returning,
    /// whatever the outcome.
    async fn upload(&self, file: MediaFile) -> Result<UploadedMedia, UploadError>;
}

/// Media upload errors.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("Failed to stage file: {0}")]
    Staging(String),

    #[error("Media host unreachable: {0}")]
    Transport(String),

    #[error("Media host rejected upload ({status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("Unexpected media host response: {0}")]
    InvalidResponse(String),
}
