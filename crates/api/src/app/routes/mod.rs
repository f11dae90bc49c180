use axum::{
    routing::{get, post},
    Router,
};

pub mod auth;
pub mod common;
pub mod sweets;
pub mod system;

/// Endpoints reachable without a token.
pub fn public_router() -> Router {
    Router::new()
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
}

/// Endpoints that need an authenticated principal.
pub fn protected_router() -> Router {
    Router::new()
        .route("/api/auth/me", get(auth::me))
        .nest("/api/sweets", sweets::router())
}
