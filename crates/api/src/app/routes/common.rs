use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Json, Path, Query};
use axum::http::StatusCode;
use axum::response::Response;

use sweetshop_core::SweetId;

use crate::app::errors::{domain_error_to_response, json_error};

/// Unwrap a JSON body, turning extractor rejections (bad syntax, missing
/// fields, wrong content type) into a 400 with the serde message.
pub fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, Response> {
    payload
        .map(|Json(v)| v)
        .map_err(|e| json_error(StatusCode::BAD_REQUEST, "invalid_body", e.body_text()))
}

pub fn query<T>(payload: Result<Query<T>, QueryRejection>) -> Result<T, Response> {
    payload
        .map(|Query(v)| v)
        .map_err(|e| json_error(StatusCode::BAD_REQUEST, "invalid_query", e.body_text()))
}

/// Parse the `:id` segment. Extractor rejections (e.g. invalid UTF-8 after
/// percent-decoding) and malformed UUIDs are both 400 `invalid_id`.
pub fn sweet_id(path: Result<Path<String>, PathRejection>) -> Result<SweetId, Response> {
    let Path(raw) =
        path.map_err(|e| json_error(StatusCode::BAD_REQUEST, "invalid_id", e.body_text()))?;
    raw.parse().map_err(domain_error_to_response)
}
