//! Permission checks at the handler boundary.

use axum::http::StatusCode;
use axum::response::Response;

use sweetshop_auth::{authorize, Permission, Principal};

use crate::app::errors::json_error;

/// Check `permission` for the calling principal, producing a 403 response
/// on denial. Call before touching the request body so that unprivileged
/// callers always see 403 rather than a validation error.
pub fn require(principal: &Principal, permission: &Permission) -> Result<(), Response> {
    authorize(principal, permission)
        .map_err(|e| json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string()))
}
