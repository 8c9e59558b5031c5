//! # Pixpost Infrastructure
//!
//! Concrete implementations of the ports defined in `pixpost-core`.
//! This crate contains storage, media-host, and credential integrations.
//!
//! ## Feature Flags
//!
//! - `full` (default) - All features enabled
//! - `minimal` - No external services, in-memory only
//! - `postgres` - PostgreSQL storage via SeaORM
//! - `auth` - JWT + Argon2 authentication
//! - `imagekit` - ImageKit media uploads via reqwest

pub mod database;
pub mod media;

#[cfg(feature = "auth")]
pub mod auth;

// Re-exports - In-Memory
pub use database::{DatabaseConfig, InMemoryPostRepository, InMemoryUserRepository};
pub use media::InMemoryMediaUploader;

#[cfg(feature = "auth")]
pub use auth::{Argon2PasswordService, JwtConfig, JwtTokenService};

#[cfg(feature = "postgres")]
pub use database::{PostgresPostRepository, PostgresUserRepository, connect, ensure_schema};

#[cfg(feature = "imagekit")]
pub use media::{ImageKitConfig, ImageKitUploader};
