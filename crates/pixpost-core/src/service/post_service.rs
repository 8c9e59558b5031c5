//! Post lifecycle: upload, list, delete.

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::{MediaFile, Post};
use crate::error::DomainError;
use crate::ports::{MediaUploader, PostRepository};

/// The authenticated party on whose behalf an operation runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    pub user_id: Uuid,
    pub is_superuser: bool,
}

impl Caller {
    pub fn user(user_id: Uuid) -> Self {
        Self {
            user_id,
            is_superuser: false,
        }
    }

    pub fn superuser(user_id: Uuid) -> Self {
        Self {
            user_id,
            is_superuser: true,
        }
    }

    fn can_manage(&self, post: &Post) -> bool {
        self.is_superuser || post.is_owned_by(self.user_id)
    }
}

/// Result of a delete request. A miss is an expected outcome, not a fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    NotFound,
}

/// Orchestrates media upload and post persistence.
pub struct PostService {
    posts: Arc<dyn PostRepository>,
    uploader: Arc<dyn MediaUploader>,
}

impl PostService {
    pub fn new(posts: Arc<dyn PostRepository>, uploader: Arc<dyn MediaUploader>) -> Self {
        Self { posts, uploader }
    }

    /// Upload `file`, then persist a post owned by `caller`.
    ///
    /// Upload and insert are two independent steps. If the insert fails the
    /// uploaded media stays on the remote host with no row pointing at it.
    pub async fn create_post(
        &self,
        file: MediaFile,
        caption: Option<String>,
        caller: &Caller,
    ) -> Result<Post, DomainError> {
        if file.file_name.trim().is_empty() {
            return Err(DomainError::Validation("file name is required".to_string()));
        }
        if file.is_empty() {
            return Err(DomainError::Validation("file is empty".to_string()));
        }

        let file_name = file.file_name.clone();
        let size = file.len();

        let media = self.uploader.upload(file).await.map_err(|e| {
            tracing::error!(file_name = %file_name, error = %e, "Media upload failed");
            DomainError::from(e)
        })?;
        tracing::debug!(file_name = %file_name, size, url = %media.url, "Media uploaded");

        let post = Post::new(caller.user_id, caption.unwrap_or_default(), media);
        let orphan_url = post.url.clone();

        match self.posts.insert(post).await {
            Ok(saved) => {
                tracing::info!(post_id = %saved.id, user_id = %saved.user_id, "Post created");
                Ok(saved)
            }
            Err(e) => {
                tracing::warn!(
                    url = %orphan_url,
                    error = %e,
                    "Post insert failed after upload; remote media is orphaned"
                );
                Err(e.into())
            }
        }
    }

    /// All posts, in the store's scan order.
    pub async fn list_posts(&self) -> Result<Vec<Post>, DomainError> {
        Ok(self.posts.find_all().await?)
    }

    pub async fn list_posts_by_user(&self, user_id: Uuid) -> Result<Vec<Post>, DomainError> {
        Ok(self.posts.find_by_user_id(user_id).await?)
    }

    pub async fn get_post(&self, post_id: Uuid) -> Result<Post, DomainError> {
        self.posts
            .find_by_id(post_id)
            .await?
            .ok_or(DomainError::NotFound {
                entity_type: "Post",
                id: post_id,
            })
    }

    /// Hard-delete a post. Only its owner or a superuser may do so.
    ///
    /// The remote media object is left in place.
    pub async fn delete_post(
        &self,
        post_id: Uuid,
        caller: &Caller,
    ) -> Result<DeleteOutcome, DomainError> {
        let Some(post) = self.posts.find_by_id(post_id).await? else {
            tracing::debug!(post_id = %post_id, "Delete requested for unknown post");
            return Ok(DeleteOutcome::NotFound);
        };

        if !caller.can_manage(&post) {
            tracing::warn!(
                post_id = %post_id,
                caller = %caller.user_id,
                "Refusing to delete a post owned by another user"
            );
            return Err(DomainError::Forbidden);
        }

        // Another request may have removed it since the lookup.
        if self.posts.delete(post_id).await? {
            tracing::info!(post_id = %post_id, "Post deleted");
            Ok(DeleteOutcome::Deleted)
        } else {
            Ok(DeleteOutcome::NotFound)
        }
    }
}
