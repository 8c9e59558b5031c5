use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::domain::{MediaFile, Post, UploadedMedia};
use crate::error::{DomainError, RepoError};
use crate::ports::{BaseRepository, MediaUploader, PostRepository, UploadError};
use crate::service::{Caller, DeleteOutcome, PostService};

#[derive(Default)]
struct VecPostRepository {
    rows: Mutex<Vec<Post>>,
    reject_inserts: bool,
}

impl VecPostRepository {
    fn rejecting() -> Self {
        Self {
            rows: Mutex::default(),
            reject_inserts: true,
        }
    }

    async fn count(&self) -> usize {
        self.rows.lock().await.len()
    }
}

#[async_trait]
impl BaseRepository<Post, Uuid> for VecPostRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        Ok(self.rows.lock().await.iter().find(|p| p.id == id).cloned())
    }

    async fn insert(&self, post: Post) -> Result<Post, RepoError> {
        if self.reject_inserts {
            return Err(RepoError::Connection("pool closed".to_string()));
        }
        self.rows.lock().await.push(post.clone());
        Ok(post)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, RepoError> {
        let mut rows = self.rows.lock().await;
        let before = rows.len();
        rows.retain(|p| p.id != id);
        Ok(rows.len() != before)
    }
}

#[async_trait]
impl PostRepository for VecPostRepository {
    async fn find_all(&self) -> Result<Vec<Post>, RepoError> {
        Ok(self.rows.lock().await.clone())
    }

    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Vec<Post>, RepoError> {
        Ok(self
            .rows
            .lock()
            .await
            .iter()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect())
    }
}

/// Uploader that answers from a fixed CDN prefix, or always fails.
struct ScriptedUploader {
    fail: bool,
    calls: AtomicUsize,
}

impl ScriptedUploader {
    fn ok() -> Self {
        Self {
            fail: false,
            calls: AtomicUsize::new(0),
        }
    }

    fn failing() -> Self {
        Self {
            fail: true,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl MediaUploader for ScriptedUploader {
    async fn upload(&self, file: MediaFile) -> Result<UploadedMedia, UploadError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(UploadError::Transport("connection refused".to_string()));
        }
        Ok(UploadedMedia {
            url: format!("https://cdn/x/{}", file.file_name),
            file_type: file
                .content_type
                .unwrap_or_else(|| "application/octet-stream".to_string()),
            name: file.file_name,
        })
    }
}

fn png(name: &str) -> MediaFile {
    MediaFile::new(
        name,
        Some("image/png".to_string()),
        Bytes::from_static(b"\x89PNG\r\n"),
    )
}

fn service(
    repo: Arc<VecPostRepository>,
    uploader: Arc<ScriptedUploader>,
) -> PostService {
    PostService::new(repo, uploader)
}

#[tokio::test]
async fn test_create_post_uses_uploader_output() {
    let repo = Arc::new(VecPostRepository::default());
    let svc = service(repo.clone(), Arc::new(ScriptedUploader::ok()));
    let owner = Uuid::new_v4();

    let post = svc
        .create_post(png("cat.png"), Some("cute cat".to_string()), &Caller::user(owner))
        .await
        .unwrap();

    assert_eq!(post.caption, "cute cat");
    assert_eq!(post.url, "https://cdn/x/cat.png");
    assert_eq!(post.file_type, "image/png");
    assert_eq!(post.file_name, "cat.png");
    assert_eq!(post.user_id, owner);
    assert!(!post.id.is_nil());
    assert!(post.created_at <= chrono::Utc::now());
    assert_eq!(repo.count().await, 1);
}

#[tokio::test]
async fn test_create_post_defaults_caption() {
    let repo = Arc::new(VecPostRepository::default());
    let svc = service(repo, Arc::new(ScriptedUploader::ok()));

    let post = svc
        .create_post(png("dog.png"), None, &Caller::user(Uuid::new_v4()))
        .await
        .unwrap();

    assert_eq!(post.caption, "");
}

#[tokio::test]
async fn test_create_post_rejects_blank_file_name() {
    let repo = Arc::new(VecPostRepository::default());
    let uploader = Arc::new(ScriptedUploader::ok());
    let svc = service(repo.clone(), uploader.clone());

    let err = svc
        .create_post(png("  "), None, &Caller::user(Uuid::new_v4()))
        .await
        .unwrap_err();

    assert!(matches!(err, DomainError::Validation(_)));
    assert_eq!(uploader.calls.load(Ordering::SeqCst), 0);
    assert_eq!(repo.count().await, 0);
}

#[tokio::test]
async fn test_create_post_rejects_empty_file() {
    let repo = Arc::new(VecPostRepository::default());
    let uploader = Arc::new(ScriptedUploader::ok());
    let svc = service(repo.clone(), uploader.clone());

    let empty = MediaFile::new("cat.png", Some("image/png".to_string()), Bytes::new());
    let err = svc
        .create_post(empty, None, &Caller::user(Uuid::new_v4()))
        .await
        .unwrap_err();

    assert!(matches!(err, DomainError::Validation(_)));
    assert_eq!(uploader.calls.load(Ordering::SeqCst), 0);
    assert_eq!(repo.count().await, 0);
}

#[tokio::test]
async fn test_upload_failure_persists_nothing() {
    let repo = Arc::new(VecPostRepository::default());
    let svc = service(repo.clone(), Arc::new(ScriptedUploader::failing()));

    let err = svc
        .create_post(png("cat.png"), None, &Caller::user(Uuid::new_v4()))
        .await
        .unwrap_err();

    assert!(matches!(err, DomainError::Upload(UploadError::Transport(_))));
    assert_eq!(repo.count().await, 0);
}

#[tokio::test]
async fn test_store_failure_after_upload() {
    let repo = Arc::new(VecPostRepository::rejecting());
    let uploader = Arc::new(ScriptedUploader::ok());
    let svc = service(repo.clone(), uploader.clone());

    let err = svc
        .create_post(png("cat.png"), None, &Caller::user(Uuid::new_v4()))
        .await
        .unwrap_err();

    assert!(matches!(err, DomainError::Persistence(_)));
    // The upload happened and is not compensated.
    assert_eq!(uploader.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_list_returns_every_created_post() {
    let repo = Arc::new(VecPostRepository::default());
    let svc = service(repo, Arc::new(ScriptedUploader::ok()));
    let caller = Caller::user(Uuid::new_v4());

    let mut created = Vec::new();
    for i in 0..5 {
        let post = svc
            .create_post(png(&format!("img{i}.png")), None, &caller)
            .await
            .unwrap();
        created.push(post.id);
    }

    let listed: Vec<Uuid> = svc.list_posts().await.unwrap().iter().map(|p| p.id).collect();
    assert_eq!(listed, created);
}

#[tokio::test]
async fn test_list_by_user_filters_owner() {
    let repo = Arc::new(VecPostRepository::default());
    let svc = service(repo, Arc::new(ScriptedUploader::ok()));
    let alice = Caller::user(Uuid::new_v4());
    let bob = Caller::user(Uuid::new_v4());

    svc.create_post(png("a.png"), None, &alice).await.unwrap();
    let bobs = svc.create_post(png("b.png"), None, &bob).await.unwrap();

    let listed = svc.list_posts_by_user(bob.user_id).await.unwrap();
    assert_eq!(listed, vec![bobs]);
}

#[tokio::test]
async fn test_delete_then_list_and_delete_again() {
    let repo = Arc::new(VecPostRepository::default());
    let svc = service(repo, Arc::new(ScriptedUploader::ok()));
    let caller = Caller::user(Uuid::new_v4());

    let a = svc.create_post(png("a.png"), None, &caller).await.unwrap();
    let b = svc
        .create_post(png("b.png"), Some("keep".to_string()), &caller)
        .await
        .unwrap();

    assert_eq!(
        svc.delete_post(a.id, &caller).await.unwrap(),
        DeleteOutcome::Deleted
    );
    assert_eq!(
        svc.delete_post(a.id, &caller).await.unwrap(),
        DeleteOutcome::NotFound
    );

    let remaining = svc.list_posts().await.unwrap();
    assert_eq!(remaining, vec![b]);
}

#[tokio::test]
async fn test_delete_unknown_id_is_not_found() {
    let repo = Arc::new(VecPostRepository::default());
    let svc = service(repo, Arc::new(ScriptedUploader::ok()));

    let outcome = svc
        .delete_post(Uuid::new_v4(), &Caller::user(Uuid::new_v4()))
        .await
        .unwrap();

    assert_eq!(outcome, DeleteOutcome::NotFound);
}

#[tokio::test]
async fn test_delete_by_non_owner_is_forbidden() {
    let repo = Arc::new(VecPostRepository::default());
    let svc = service(repo.clone(), Arc::new(ScriptedUploader::ok()));
    let owner = Caller::user(Uuid::new_v4());

    let post = svc.create_post(png("a.png"), None, &owner).await.unwrap();

    let err = svc
        .delete_post(post.id, &Caller::user(Uuid::new_v4()))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Forbidden));
    assert_eq!(repo.count().await, 1);

    let outcome = svc
        .delete_post(post.id, &Caller::superuser(Uuid::new_v4()))
        .await
        .unwrap();
    assert_eq!(outcome, DeleteOutcome::Deleted);
    assert_eq!(repo.count().await, 0);
}

#[tokio::test]
async fn test_get_post() {
    let repo = Arc::new(VecPostRepository::default());
    let svc = service(repo, Arc::new(ScriptedUploader::ok()));
    let caller = Caller::user(Uuid::new_v4());

    let post = svc.create_post(png("a.png"), None, &caller).await.unwrap();
    assert_eq!(svc.get_post(post.id).await.unwrap(), post);

    let missing = Uuid::new_v4();
    let err = svc.get_post(missing).await.unwrap_err();
    assert!(matches!(err, DomainError::NotFound { id, .. } if id == missing));
}
