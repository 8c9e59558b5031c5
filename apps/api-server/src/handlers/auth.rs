//! Registration, login and logout.

use actix_web::cookie::{Cookie, SameSite, time::Duration};
use actix_web::{HttpResponse, web};
use std::sync::Arc;

use pixpost_core::domain::User;
use pixpost_core::ports::{PasswordService, TokenService};
use pixpost_shared::dto::{AuthResponse, LoginForm, RegisterUserRequest};

use super::users::to_response;
use crate::middleware::auth::{AUTH_COOKIE, Identity};
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

const MIN_PASSWORD_LEN: usize = 8;
const LOGIN_BAD_CREDENTIALS: &str = "LOGIN_BAD_CREDENTIALS";

fn valid_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.ends_with('.'),
        None => false,
    }
}

/// Emails are stored and compared in lowercase.
fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn auth_cookie(token: String, max_age_seconds: i64) -> Cookie<'static> {
    Cookie::build(AUTH_COOKIE, token)
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(Duration::seconds(max_age_seconds))
        .finish()
}

/// POST /auth/register
pub async fn register(
    state: web::Data<AppState>,
    password_service: web::Data<Arc<dyn PasswordService>>,
    body: web::Json<RegisterUserRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let email = normalize_email(&req.email);

    if !valid_email(&email) {
        return Err(AppError::BadRequest("Invalid email address".to_string()));
    }
    if req.password.len() < MIN_PASSWORD_LEN {
        return Err(AppError::BadRequest(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }

    if state.users.find_by_email(&email).await?.is_some() {
        return Err(AppError::Conflict("REGISTER_USER_ALREADY_EXISTS".to_string()));
    }

    let hashed_password = password_service
        .hash(&req.password)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    // A concurrent registration surfaces as a constraint violation, i.e. 409.
    let user = state.users.insert(User::new(email, hashed_password)).await?;
    tracing::info!(user_id = %user.id, "User registered");

    Ok(HttpResponse::Created().json(to_response(user)))
}

/// POST /auth/jwt/login
pub async fn login(
    state: web::Data<AppState>,
    token_service: web::Data<Arc<dyn TokenService>>,
    password_service: web::Data<Arc<dyn PasswordService>>,
    form: web::Form<LoginForm>,
) -> AppResult<HttpResponse> {
    let form = form.into_inner();

    let Some(user) = state.users.find_by_email(&normalize_email(&form.username)).await? else {
        // Spend the same hashing time as a real check.
        let _ = password_service.hash(&form.password);
        return Err(AppError::BadRequest(LOGIN_BAD_CREDENTIALS.to_string()));
    };

    let valid = password_service
        .verify(&form.password, &user.hashed_password)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    if !valid || !user.is_active {
        tracing::debug!(user_id = %user.id, active = user.is_active, "Login rejected");
        return Err(AppError::BadRequest(LOGIN_BAD_CREDENTIALS.to_string()));
    }

    let token = token_service
        .generate_token(user.id, &user.email, user.roles())
        .map_err(|e| AppError::Internal(e.to_string()))?;

    tracing::info!(user_id = %user.id, "User logged in");

    Ok(HttpResponse::Ok()
        .cookie(auth_cookie(token.clone(), token_service.expiration_seconds()))
        .json(AuthResponse {
            access_token: token,
            token_type: "bearer".to_string(),
        }))
}

/// POST /auth/jwt/logout
pub async fn logout(identity: Identity) -> HttpResponse {
    tracing::debug!(user_id = %identity.user.id, "User logged out");

    let mut cookie = auth_cookie(String::new(), 0);
    cookie.make_removal();

    HttpResponse::NoContent().cookie(cookie).finish()
}

#[cfg(test)]
mod tests {
    use super::{normalize_email, valid_email};

    #[test]
    fn test_email_shape() {
        assert!(valid_email("ada@example.com"));
        assert!(!valid_email("ada"));
        assert!(!valid_email("@example.com"));
        assert!(!valid_email("ada@localhost"));
        assert!(!valid_email("ada@example."));
    }

    #[test]
    fn test_email_normalization() {
        assert_eq!(normalize_email("  Ada@Example.COM "), "ada@example.com");
    }
}
