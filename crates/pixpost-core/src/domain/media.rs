use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// An inbound file waiting to be handed to the media host.
#[derive(Debug, Clone)]
pub struct MediaFile {
    /// Client-supplied filename, including extension.
    pub file_name: String,
    /// MIME type declared by the client, if any.
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

impl MediaFile {
    pub fn new(file_name: impl Into<String>, content_type: Option<String>, bytes: Bytes) -> Self {
        Self {
            file_name: file_name.into(),
            content_type,
            bytes,
        }
    }

    /// Lowercased extension of the filename, without the dot.
    pub fn extension(&self) -> Option<String> {
        let (stem, ext) = self.file_name.rsplit_once('.')?;
        if stem.is_empty() || ext.is_empty() {
            return None;
        }
        Some(ext.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// What the media host reports back after a successful upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedMedia {
    /// Public retrieval URL.
    pub url: String,
    #[serde(rename = "fileType")]
    pub file_type: String,
    pub name: String,
}
