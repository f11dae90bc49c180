use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;

use sweetshop_auth::{
    hash_password, normalize_email, verify_password, verify_unknown_account, Principal,
    Registration, Role, User,
};
use sweetshop_core::UserId;

use crate::app::dto::{self, AuthResponse, UserResponse};
use crate::app::errors::{self, json_error};
use crate::app::routes::common;
use crate::app::services::AppServices;

const BAD_CREDENTIALS: &str = "invalid email or password";

pub async fn register(
    Extension(services): Extension<Arc<AppServices>>,
    payload: Result<Json<dto::RegisterRequest>, JsonRejection>,
) -> Response {
    let body = match common::body(payload) {
        Ok(b) => b,
        Err(resp) => return resp,
    };

    let registration = match (Registration {
        email: body.email,
        password: body.password,
    })
    .validate()
    {
        Ok(r) => r,
        Err(e) => return errors::domain_error_to_response(e),
    };

    // Checked before hashing; the store still enforces uniqueness.
    match services.users.find_by_email(&registration.email).await {
        Ok(Some(_)) => {
            return json_error(StatusCode::CONFLICT, "conflict", "email already registered");
        }
        Ok(None) => {}
        Err(e) => return errors::store_error_to_response(e),
    }

    let password = registration.password;
    let hash = match tokio::task::spawn_blocking(move || hash_password(&password)).await {
        Ok(Ok(h)) => h,
        Ok(Err(e)) => {
            tracing::error!("password hashing failed: {e}");
            return errors::internal_error("hash_error");
        }
        Err(e) => {
            tracing::error!("password hashing task failed: {e}");
            return errors::internal_error("hash_error");
        }
    };

    let now = Utc::now();
    let user = User::new(UserId::new(), registration.email, hash, Role::User, now);
    let user = match services.users.insert(user).await {
        Ok(u) => u,
        Err(e) => return errors::store_error_to_response(e),
    };

    tracing::info!(user_id = %user.id, "user registered");
    issue_token(&services, &user, StatusCode::CREATED)
}

pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    payload: Result<Json<dto::LoginRequest>, JsonRejection>,
) -> Response {
    let body = match common::body(payload) {
        Ok(b) => b,
        Err(resp) => return resp,
    };

    let email = normalize_email(&body.email);
    let user = match services.users.find_by_email(&email).await {
        Ok(Some(u)) => u,
        Ok(None) => {
            let password = body.password;
            let _ = tokio::task::spawn_blocking(move || verify_unknown_account(&password)).await;
            return json_error(StatusCode::UNAUTHORIZED, "unauthorized", BAD_CREDENTIALS);
        }
        Err(e) => return errors::store_error_to_response(e),
    };

    let password = body.password;
    let stored = user.password_hash.clone();
    let verified = tokio::task::spawn_blocking(move || verify_password(&password, &stored)).await;
    match verified {
        Ok(Ok(true)) => {}
        Ok(Ok(false)) => {
            tracing::info!(user_id = %user.id, "login rejected: wrong password");
            return json_error(StatusCode::UNAUTHORIZED, "unauthorized", BAD_CREDENTIALS);
        }
        Ok(Err(e)) => {
            tracing::error!(user_id = %user.id, "password verification failed: {e}");
            return errors::internal_error("hash_error");
        }
        Err(e) => {
            tracing::error!("password verification task failed: {e}");
            return errors::internal_error("hash_error");
        }
    }

    issue_token(&services, &user, StatusCode::OK)
}

pub async fn me(Extension(principal): Extension<Principal>) -> Response {
    (StatusCode::OK, Json(UserResponse::from(&principal))).into_response()
}

fn issue_token(services: &AppServices, user: &User, status: StatusCode) -> Response {
    match services.tokens.issue(user, Utc::now()) {
        Ok(token) => (status, Json(AuthResponse::bearer(token, user))).into_response(),
        Err(e) => {
            tracing::error!("token signing failed: {e}");
            errors::internal_error("token_error")
        }
    }
}
