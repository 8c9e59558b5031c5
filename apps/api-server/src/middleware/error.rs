//! Error handling - RFC 7807 responses for faults, `{error, code}` for misses.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use pixpost_core::DomainError;
use pixpost_core::error::RepoError;
use pixpost_shared::{ErrorResponse, OutcomeError};
use std::fmt;

/// Application-level error type rendered as an HTTP response.
#[derive(Debug)]
pub enum AppError {
    /// An expected miss; rendered as `{error, code}` rather than a problem document.
    NotFound(String),
    BadRequest(String),
    Unauthorized,
    Forbidden,
    Conflict(String),
    PayloadTooLarge(usize),
    /// The remote media host failed.
    Upstream(String),
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            AppError::Unauthorized => write!(f, "Unauthorized"),
            AppError::Forbidden => write!(f, "Forbidden"),
            AppError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            AppError::PayloadTooLarge(limit) => write!(f, "Payload exceeds {} bytes", limit),
            AppError::Upstream(msg) => write!(f, "Upstream error: {}", msg),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl AppError {
    /// Render the response, tagging problem documents with `request_id`.
    pub fn render(&self, request_id: Option<&str>) -> HttpResponse {
        let status = self.status_code();
        let error = match self {
            AppError::NotFound(detail) => {
                return HttpResponse::build(status).json(OutcomeError::not_found(detail.clone()));
            }
            AppError::BadRequest(detail) => ErrorResponse::bad_request(detail),
            AppError::Unauthorized => ErrorResponse::unauthorized(),
            AppError::Forbidden => ErrorResponse::forbidden(),
            AppError::Conflict(detail) => ErrorResponse::new(409, "Conflict").with_detail(detail),
            AppError::PayloadTooLarge(limit) => ErrorResponse::new(413, "Payload Too Large")
                .with_detail(format!("Upload exceeds the {} byte limit", limit)),
            AppError::Upstream(_) => {
                ErrorResponse::bad_gateway("The media host could not store the file")
            }
            AppError::Internal(_) => ErrorResponse::internal_error(),
        };
        let error = match request_id {
            Some(id) => error.with_request_id(id),
            None => error,
        };

        HttpResponse::build(status).json(error)
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Upstream(_) => StatusCode::BAD_GATEWAY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            AppError::Upstream(detail) => tracing::error!("Media host error: {}", detail),
            AppError::Internal(detail) => tracing::error!("Internal error: {}", detail),
            _ => {}
        }
        self.render(None)
    }
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::NotFound { entity_type, .. } => {
                AppError::NotFound(format!("{} not found", entity_type))
            }
            DomainError::Validation(msg) => AppError::BadRequest(msg),
            DomainError::Upload(e) => AppError::Upstream(e.to_string()),
            // A store failure behind a domain operation is a fault, never a conflict.
            DomainError::Persistence(e) => {
                tracing::error!("Persistence error: {}", e);
                AppError::Internal("Database error".to_string())
            }
            DomainError::Duplicate(msg) => AppError::Conflict(msg),
            DomainError::Forbidden => AppError::Forbidden,
            DomainError::Unauthorized => AppError::Unauthorized,
        }
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::Constraint(msg) => AppError::Conflict(msg),
            RepoError::Connection(msg) => {
                tracing::error!("Database connection error: {}", msg);
                AppError::Internal("Database error".to_string())
            }
            RepoError::Query(msg) => {
                tracing::error!("Database query error: {}", msg);
                AppError::Internal("Database error".to_string())
            }
        }
    }
}

/// Result type alias for handlers.
pub type AppResult<T> = Result<T, AppError>;
