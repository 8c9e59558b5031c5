//! Current-user endpoint.

use actix_web::HttpResponse;

use pixpost_core::domain::User;
use pixpost_shared::dto::UserResponse;

use crate::middleware::auth::Identity;

pub(crate) fn to_response(user: User) -> UserResponse {
    UserResponse {
        id: user.id,
        email: user.email,
        is_active: user.is_active,
        is_superuser: user.is_superuser,
        is_verified: user.is_verified,
    }
}

/// GET /users/me
pub async fn me(identity: Identity) -> HttpResponse {
    HttpResponse::Ok().json(to_response(identity.user))
}
