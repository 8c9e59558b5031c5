//! In-memory repositories - used when no database is configured, and in tests.
//!
//! Rows live in insertion order behind an async `RwLock`.
//! Data is lost on process restart.

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use pixpost_core::domain::{Post, User};
use pixpost_core::error::RepoError;
use pixpost_core::ports::{BaseRepository, PostRepository, UserRepository};

use super::mask_email;

/// In-memory post store.
#[derive(Default)]
pub struct InMemoryPostRepository {
    rows: RwLock<Vec<Post>>,
}

impl InMemoryPostRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rows.read().await.is_empty()
    }
}

#[async_trait]
impl BaseRepository<Post, Uuid> for InMemoryPostRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        let rows = self.rows.read().await;
        Ok(rows.iter().find(|p| p.id == id).cloned())
    }

    async fn insert(&self, post: Post) -> Result<Post, RepoError> {
        let mut rows = self.rows.write().await;
        if rows.iter().any(|p| p.id == post.id) {
            return Err(RepoError::Constraint("Entity already exists".to_string()));
        }
        rows.push(post.clone());
        Ok(post)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, RepoError> {
        let mut rows = self.rows.write().await;
        match rows.iter().position(|p| p.id == id) {
            Some(index) => {
                // `remove`, not `swap_remove`: scan order must survive.
                rows.remove(index);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn find_all(&self) -> Result<Vec<Post>, RepoError> {
        Ok(self.rows.read().await.clone())
    }

    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Vec<Post>, RepoError> {
        let rows = self.rows.read().await;
        Ok(rows.iter().filter(|p| p.user_id == user_id).cloned().collect())
    }
}

/// In-memory user store. Emails are unique, compared case-insensitively.
#[derive(Default)]
pub struct InMemoryUserRepository {
    rows: RwLock<Vec<User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BaseRepository<User, Uuid> for InMemoryUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        let rows = self.rows.read().await;
        Ok(rows.iter().find(|u| u.id == id).cloned())
    }

    async fn insert(&self, user: User) -> Result<User, RepoError> {
        let mut rows = self.rows.write().await;
        if rows
            .iter()
            .any(|u| u.id == user.id || u.email.eq_ignore_ascii_case(&user.email))
        {
            return Err(RepoError::Constraint("Entity already exists".to_string()));
        }
        rows.push(user.clone());
        Ok(user)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, RepoError> {
        let mut rows = self.rows.write().await;
        let before = rows.len();
        rows.retain(|u| u.id != id);
        Ok(rows.len() != before)
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        tracing::debug!(user_email = %mask_email(email), "Finding user by email");

        let rows = self.rows.read().await;
        Ok(rows
            .iter()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pixpost_core::domain::UploadedMedia;

    fn post(user_id: Uuid, name: &str) -> Post {
        Post::new(
            user_id,
            String::new(),
            UploadedMedia {
                url: format!("https://cdn.test/{name}"),
                file_type: "image".to_string(),
                name: name.to_string(),
            },
        )
    }

    #[tokio::test]
    async fn test_posts_keep_insertion_order_after_delete() {
        let repo = InMemoryPostRepository::new();
        let owner = Uuid::new_v4();
        let a = repo.insert(post(owner, "a.png")).await.unwrap();
        let b = repo.insert(post(owner, "b.png")).await.unwrap();
        let c = repo.insert(post(owner, "c.png")).await.unwrap();

        assert!(repo.delete(a.id).await.unwrap());
        assert!(!repo.delete(a.id).await.unwrap());

        let ids: Vec<Uuid> = repo.find_all().await.unwrap().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![b.id, c.id]);
    }

    #[tokio::test]
    async fn test_duplicate_post_id_rejected() {
        let repo = InMemoryPostRepository::new();
        let p = post(Uuid::new_v4(), "a.png");
        repo.insert(p.clone()).await.unwrap();

        let err = repo.insert(p).await.unwrap_err();
        assert!(matches!(err, RepoError::Constraint(_)));
        assert_eq!(repo.len().await, 1);
    }

    #[tokio::test]
    async fn test_user_email_is_unique_and_case_insensitive() {
        let repo = InMemoryUserRepository::new();
        repo.insert(User::new("Alice@Example.com".to_string(), "h".to_string()))
            .await
            .unwrap();

        let err = repo
            .insert(User::new("alice@example.com".to_string(), "h".to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::Constraint(_)));

        let found = repo.find_by_email("ALICE@example.com").await.unwrap();
        assert!(found.is_some());
    }
}
