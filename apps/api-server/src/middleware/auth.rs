//! Authentication extractors.
//!
//! A request is authenticated by a Bearer token in the `Authorization`
//! header or, failing that, by the token in the [`AUTH_COOKIE`] cookie.
//! The token's subject must name a stored, active user.

use actix_web::{FromRequest, HttpMessage, HttpRequest, dev::Payload, http::header, web};
use futures_util::future::LocalBoxFuture;
use std::sync::Arc;

use pixpost_core::Caller;
use pixpost_core::domain::User;
use pixpost_core::ports::{AuthError, TokenClaims, TokenService};

use crate::observability::RequestId;
use crate::state::AppState;

/// Cookie carrying the access token for browser clients.
pub const AUTH_COOKIE: &str = "pixpost_auth";

/// The authenticated, active user behind a request.
///
/// Use this in handlers to require authentication:
/// ```ignore
/// async fn protected_route(identity: Identity) -> impl Responder {
///     format!("Hello, user {}!", identity.user.id)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Identity {
    pub user: User,
}

impl Identity {
    /// The identity as seen by the post service.
    pub fn caller(&self) -> Caller {
        Caller {
            user_id: self.user.id,
            is_superuser: self.user.is_superuser,
        }
    }
}

/// Error type for authentication failures.
#[derive(Debug)]
pub struct AuthenticationError {
    pub error: AuthError,
    pub request_id: Option<String>,
}

impl std::fmt::Display for AuthenticationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.error)
    }
}

impl actix_web::ResponseError for AuthenticationError {
    fn status_code(&self) -> actix_web::http::StatusCode {
        match &self.error {
            AuthError::TokenExpired
            | AuthError::InvalidToken(_)
            | AuthError::MissingAuth
            | AuthError::InvalidCredentials
            | AuthError::Inactive => actix_web::http::StatusCode::UNAUTHORIZED,
            AuthError::HashingError(_) | AuthError::LookupFailed(_) => {
                actix_web::http::StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> actix_web::HttpResponse {
        use pixpost_shared::ErrorResponse;

        let error = match &self.error {
            AuthError::TokenExpired => ErrorResponse::new(401, "Token Expired")
                .with_detail("Your authentication token has expired. Please login again."),
            AuthError::InvalidToken(msg) => {
                ErrorResponse::new(401, "Invalid Token").with_detail(msg.clone())
            }
            AuthError::MissingAuth => ErrorResponse::new(401, "Authentication Required")
                .with_detail("Provide a Bearer token or the auth cookie."),
            AuthError::InvalidCredentials | AuthError::Inactive => ErrorResponse::unauthorized(),
            AuthError::HashingError(_) | AuthError::LookupFailed(_) => {
                tracing::error!(error = %self.error, "Authentication fault");
                ErrorResponse::internal_error()
            }
        };
        let error = match &self.request_id {
            Some(id) => error.with_request_id(id.clone()),
            None => error,
        };

        actix_web::HttpResponse::build(self.status_code()).json(error)
    }
}

/// Pull the raw token from the header, falling back to the cookie.
fn extract_token(req: &HttpRequest) -> Result<String, AuthError> {
    if let Some(value) = req.headers().get(header::AUTHORIZATION) {
        let auth_str = value
            .to_str()
            .map_err(|_| AuthError::InvalidToken("Invalid authorization header".to_string()))?;

        // Scheme is case-insensitive.
        return match auth_str.split_once(' ') {
            Some((scheme, token)) if scheme.eq_ignore_ascii_case("bearer") && !token.is_empty() => {
                Ok(token.trim().to_string())
            }
            _ => Err(AuthError::InvalidToken("Expected Bearer token".to_string())),
        };
    }

    req.cookie(AUTH_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty())
        .ok_or(AuthError::MissingAuth)
}

fn validate(req: &HttpRequest) -> Result<TokenClaims, AuthError> {
    let token_service = req
        .app_data::<web::Data<Arc<dyn TokenService>>>()
        .ok_or_else(|| {
            tracing::error!("TokenService not found in app data");
            AuthError::InvalidToken("Server configuration error".to_string())
        })?;

    let token = extract_token(req)?;
    token_service.validate_token(&token)
}

/// Resolve a validated token to the user it was issued for.
async fn authenticate(req: &HttpRequest) -> Result<Identity, AuthError> {
    let claims = validate(req)?;

    let state = req.app_data::<web::Data<AppState>>().ok_or_else(|| {
        tracing::error!("AppState not found in app data");
        AuthError::LookupFailed("Server configuration error".to_string())
    })?;

    let user = state
        .users
        .find_by_id(claims.user_id)
        .await
        .map_err(|e| AuthError::LookupFailed(e.to_string()))?
        .ok_or(AuthError::InvalidCredentials)?;

    if !user.is_active {
        return Err(AuthError::Inactive);
    }

    Ok(Identity { user })
}

impl FromRequest for Identity {
    type Error = AuthenticationError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let req = req.clone();
        Box::pin(async move {
            authenticate(&req).await.map_err(|error| {
                tracing::debug!(error = %error, "Authentication failed");
                AuthenticationError {
                    error,
                    request_id: req
                        .extensions()
                        .get::<RequestId>()
                        .map(|id| id.as_str().to_string()),
                }
            })
        })
    }
}
