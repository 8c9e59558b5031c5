//! Application configuration loaded from environment variables, once, at startup.

use std::env;

use pixpost_infra::DatabaseConfig;
use pixpost_infra::auth::JwtConfig;

/// Remote media host credentials.
#[derive(Debug, Clone)]
pub struct MediaConfig {
    pub private_key: Option<String>,
    pub public_key: Option<String>,
    pub url_endpoint: Option<String>,
    pub upload_url: Option<String>,
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database: Option<DatabaseConfig>,
    pub media: MediaConfig,
    pub jwt: JwtConfig,
    pub max_upload_bytes: usize,
}

pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

fn non_empty(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parsed<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let database = non_empty("DATABASE_URL").map(|url| DatabaseConfig {
            url,
            max_connections: parsed("DB_MAX_CONNECTIONS", 20),
            min_connections: parsed("DB_MIN_CONNECTIONS", 2),
        });

        let media = MediaConfig {
            private_key: non_empty("IMAGEKIT_PRIVATE_KEY"),
            public_key: non_empty("IMAGEKIT_PUBLIC_KEY"),
            url_endpoint: non_empty("IMAGEKIT_URL"),
            upload_url: non_empty("IMAGEKIT_UPLOAD_URL"),
        };

        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: parsed("PORT", 8000),
            database,
            media,
            jwt: JwtConfig::from_env(),
            max_upload_bytes: parsed("MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES),
        }
    }
}
