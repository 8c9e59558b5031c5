//! Media host adapters - ImageKit and an in-memory stand-in.

mod memory;

#[cfg(feature = "imagekit")]
mod imagekit;

pub use memory::InMemoryMediaUploader;

#[cfg(feature = "imagekit")]
pub use imagekit::{ImageKitConfig, ImageKitUploader};

/// Best-effort MIME type from a lowercase file extension.
pub(crate) fn guess_mime(extension: Option<&str>) -> &'static str {
    match extension {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("svg") => "image/svg+xml",
        Some("heic") => "image/heic",
        Some("mp4") => "video/mp4",
        Some("mov") => "video/quicktime",
        Some("webm") => "video/webm",
        _ => "application/octet-stream",
    }
}
