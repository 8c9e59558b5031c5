use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::UploadedMedia;

/// Post entity - one uploaded media item with its caption and owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub user_id: Uuid,
    pub caption: String,
    pub url: String,
    pub file_type: String,
    pub file_name: String,
    pub created_at: DateTime<Utc>,
}

impl Post {
    /// Create a new post from a completed upload.
    ///
    /// The media fields are taken verbatim from the uploader's result, so a
    /// post cannot exist without one.
    pub fn new(user_id: Uuid, caption: String, media: UploadedMedia) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            caption,
            url: media.url,
            file_type: media.file_type,
            file_name: media.name,
            created_at: Utc::now(),
        }
    }

    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.user_id == user_id
    }
}
