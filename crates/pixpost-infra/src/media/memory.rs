//! In-memory media uploader - the fallback when no media host is configured.
//!
//! Nothing is actually stored; the returned URL only has the right shape.

use async_trait::async_trait;
use uuid::Uuid;

use pixpost_core::domain::{MediaFile, UploadedMedia};
use pixpost_core::ports::{MediaUploader, UploadError};

use super::guess_mime;

pub struct InMemoryMediaUploader {
    base_url: String,
}

impl InMemoryMediaUploader {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

impl Default for InMemoryMediaUploader {
    fn default() -> Self {
        Self::new("http://localhost/media")
    }
}

#[async_trait]
impl MediaUploader for InMemoryMediaUploader {
    async fn upload(&self, file: MediaFile) -> Result<UploadedMedia, UploadError> {
        let file_type = match &file.content_type {
            Some(declared) => declared.clone(),
            None => guess_mime(file.extension().as_deref()).to_string(),
        };
        let url = format!("{}/{}/{}", self.base_url, Uuid::new_v4(), file.file_name);
        tracing::debug!(url = %url, size = file.len(), "Stored media in memory");

        Ok(UploadedMedia {
            url,
            file_type,
            name: file.file_name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    #[tokio::test]
    async fn test_upload_shapes_url_and_type() {
        let uploader = InMemoryMediaUploader::new("https://cdn.test/");
        let media = uploader
            .upload(MediaFile::new("cat.JPG", None, Bytes::from_static(b"jpeg")))
            .await
            .unwrap();

        assert!(media.url.starts_with("https://cdn.test/"));
        assert!(media.url.ends_with("/cat.JPG"));
        assert_eq!(media.file_type, "image/jpeg");
        assert_eq!(media.name, "cat.JPG");
    }

    #[tokio::test]
    async fn test_declared_content_type_wins() {
        let uploader = InMemoryMediaUploader::default();
        let media = uploader
            .upload(MediaFile::new(
                "clip.bin",
                Some("video/mp4".to_string()),
                Bytes::from_static(b"mp4"),
            ))
            .await
            .unwrap();

        assert_eq!(media.file_type, "video/mp4");
    }
}
