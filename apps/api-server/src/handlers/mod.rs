//! HTTP handlers and route configuration.

mod auth;
mod health;
mod posts;
mod users;


use actix_web::web;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health::health_check))
        .route("/upload", web::post().to(posts::upload))
        .service(
            web::scope("/posts")
                .route("/", web::get().to(posts::list))
                .route("/me", web::get().to(posts::list_mine))
                .route("/{post_id}", web::get().to(posts::get))
                .route("/{post_id}", web::delete().to(posts::delete)),
        )
        .service(
            web::scope("/auth")
                .route("/register", web::post().to(auth::register))
                .route("/jwt/login", web::post().to(auth::login))
                .route("/jwt/logout", web::post().to(auth::logout)),
        )
        .service(web::scope("/users").route("/me", web::get().to(users::me)));
}
