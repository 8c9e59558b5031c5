//! Application state - shared across all handlers.

use std::sync::Arc;

use pixpost_core::PostService;
use pixpost_core::ports::{MediaUploader, PostRepository, UserRepository};
use pixpost_infra::{DatabaseConfig, InMemoryMediaUploader, InMemoryPostRepository, InMemoryUserRepository};

#[cfg(feature = "postgres")]
use pixpost_infra::{PostgresPostRepository, PostgresUserRepository};

#[cfg(feature = "imagekit")]
use pixpost_infra::{ImageKitConfig, ImageKitUploader};

use crate::config::{AppConfig, MediaConfig};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub posts: Arc<PostService>,
    pub users: Arc<dyn UserRepository>,
    pub max_upload_bytes: usize,
}

type Repositories = (Arc<dyn UserRepository>, Arc<dyn PostRepository>);

fn in_memory_repositories() -> Repositories {
    (
        Arc::new(InMemoryUserRepository::new()),
        Arc::new(InMemoryPostRepository::new()),
    )
}

#[cfg(feature = "postgres")]
async fn build_repositories(db_config: Option<&DatabaseConfig>) -> Repositories {
    let Some(config) = db_config else {
        tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
        return in_memory_repositories();
    };

    let conn = match pixpost_infra::connect(config).await {
        Ok(conn) => conn,
        Err(e) => {
            tracing::error!(
                "Failed to connect to database: {}. Using in-memory fallback.",
                e
            );
            return in_memory_repositories();
        }
    };

    if let Err(e) = pixpost_infra::ensure_schema(&conn).await {
        tracing::error!(
            "Failed to create database schema: {}. Using in-memory fallback.",
            e
        );
        return in_memory_repositories();
    }

    (
        Arc::new(PostgresUserRepository::new(conn.clone())),
        Arc::new(PostgresPostRepository::new(conn)),
    )
}

#[cfg(not(feature = "postgres"))]
async fn build_repositories(_db_config: Option<&DatabaseConfig>) -> Repositories {
    tracing::info!("Running without postgres feature - using in-memory repositories");
    in_memory_repositories()
}

fn in_memory_uploader(media: &MediaConfig) -> Arc<dyn MediaUploader> {
    match &media.url_endpoint {
        Some(endpoint) => Arc::new(InMemoryMediaUploader::new(endpoint.clone())),
        None => Arc::new(InMemoryMediaUploader::default()),
    }
}

#[cfg(feature = "imagekit")]
fn build_uploader(media: &MediaConfig) -> Arc<dyn MediaUploader> {
    let Some(private_key) = &media.private_key else {
        tracing::warn!("IMAGEKIT_PRIVATE_KEY not set. Uploads will not leave this process.");
        return in_memory_uploader(media);
    };

    let mut config = ImageKitConfig::new(private_key.clone());
    config.public_key = media.public_key.clone();
    config.url_endpoint = media.url_endpoint.clone();
    if let Some(upload_url) = &media.upload_url {
        config.upload_url = upload_url.clone();
    }

    Arc::new(ImageKitUploader::new(config))
}

#[cfg(not(feature = "imagekit"))]
fn build_uploader(media: &MediaConfig) -> Arc<dyn MediaUploader> {
    tracing::info!("Running without imagekit feature - using in-memory uploader");
    in_memory_uploader(media)
}

impl AppState {
    /// Build the application state with appropriate implementations.
    pub async fn new(config: &AppConfig) -> Self {
        let (users, posts) = build_repositories(config.database.as_ref()).await;
        let uploader = build_uploader(&config.media);

        tracing::info!("Application state initialized");

        Self::from_parts(users, posts, uploader, config.max_upload_bytes)
    }

    pub fn from_parts(
        users: Arc<dyn UserRepository>,
        posts: Arc<dyn PostRepository>,
        uploader: Arc<dyn MediaUploader>,
        max_upload_bytes: usize,
    ) -> Self {
        Self {
            posts: Arc::new(PostService::new(posts, uploader)),
            users,
            max_upload_bytes,
        }
    }
}
