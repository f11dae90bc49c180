use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Extension, Path, Query,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;

use sweetshop_auth::{permissions, Principal};
use sweetshop_core::Entity;
use sweetshop_inventory::{NewSweet, SweetFilter, SweetUpdate};

use crate::app::dto::{self, SweetResponse};
use crate::app::errors::{self, json_error};
use crate::app::routes::common;
use crate::app::services::AppServices;
use crate::authz;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_sweets).post(create_sweet))
        .route("/search", get(list_sweets))
        .route("/:id", get(get_sweet).put(update_sweet))
        .route("/:id/purchase", post(purchase_sweet))
        .route("/:id/restock", post(restock_sweet))
}

pub async fn list_sweets(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    query: Result<Query<dto::SweetQuery>, QueryRejection>,
) -> Response {
    if let Err(resp) = authz::require(&principal, &permissions::SWEETS_READ) {
        return resp;
    }

    let filter = match common::query(query).map(SweetFilter::from) {
        Ok(f) => f,
        Err(resp) => return resp,
    };
    let filter = match filter.validate() {
        Ok(f) => f,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.sweets.list(&filter).await {
        Ok(sweets) => {
            let body: Vec<SweetResponse> = sweets.iter().map(SweetResponse::from).collect();
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn get_sweet(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    path: Result<Path<String>, PathRejection>,
) -> Response {
    if let Err(resp) = authz::require(&principal, &permissions::SWEETS_READ) {
        return resp;
    }

    let id = match common::sweet_id(path) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.sweets.get(id).await {
        Ok(Some(sweet)) => (StatusCode::OK, Json(SweetResponse::from(&sweet))).into_response(),
        Ok(None) => json_error(StatusCode::NOT_FOUND, "not_found", "sweet not found"),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn create_sweet(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    payload: Result<Json<dto::CreateSweetRequest>, JsonRejection>,
) -> Response {
    if let Err(resp) = authz::require(&principal, &permissions::SWEETS_CREATE) {
        return resp;
    }

    let input = match common::body(payload) {
        Ok(b) => NewSweet::from(b),
        Err(resp) => return resp,
    };

    match services.sweets.insert(input, Utc::now()).await {
        Ok(sweet) => {
            tracing::info!(sweet_id = %sweet.id(), name = sweet.name(), by = %principal.user_id, "sweet created");
            (StatusCode::CREATED, Json(SweetResponse::from(&sweet))).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn update_sweet(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    path: Result<Path<String>, PathRejection>,
    payload: Result<Json<dto::UpdateSweetRequest>, JsonRejection>,
) -> Response {
    if let Err(resp) = authz::require(&principal, &permissions::SWEETS_UPDATE) {
        return resp;
    }

    let id = match common::sweet_id(path) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let update = match common::body(payload) {
        Ok(b) => SweetUpdate::from(b),
        Err(resp) => return resp,
    };

    match services.sweets.update(id, update, Utc::now()).await {
        Ok(sweet) => (StatusCode::OK, Json(SweetResponse::from(&sweet))).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn purchase_sweet(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    path: Result<Path<String>, PathRejection>,
    body: Bytes,
) -> Response {
    if let Err(resp) = authz::require(&principal, &permissions::SWEETS_PURCHASE) {
        return resp;
    }

    let id = match common::sweet_id(path) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    // An empty body means "one unit".
    let request = if body.iter().all(u8::is_ascii_whitespace) {
        dto::PurchaseRequest::default()
    } else {
        match serde_json::from_slice::<dto::PurchaseRequest>(&body) {
            Ok(r) => r,
            Err(e) => return json_error(StatusCode::BAD_REQUEST, "invalid_body", e.to_string()),
        }
    };

    match services.sweets.purchase(id, request.quantity, Utc::now()).await {
        Ok(sweet) => {
            tracing::info!(
                sweet_id = %id,
                quantity = request.quantity,
                remaining = sweet.quantity(),
                by = %principal.user_id,
                "sweet purchased"
            );
            (StatusCode::OK, Json(SweetResponse::from(&sweet))).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn restock_sweet(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    path: Result<Path<String>, PathRejection>,
    payload: Result<Json<dto::RestockRequest>, JsonRejection>,
) -> Response {
    if let Err(resp) = authz::require(&principal, &permissions::SWEETS_RESTOCK) {
        return resp;
    }

    let id = match common::sweet_id(path) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let request = match common::body(payload) {
        Ok(b) => b,
        Err(resp) => return resp,
    };

    match services.sweets.restock(id, request.quantity, Utc::now()).await {
        Ok(sweet) => {
            tracing::info!(
                sweet_id = %id,
                quantity = request.quantity,
                stock = sweet.quantity(),
                by = %principal.user_id,
                "sweet restocked"
            );
            (StatusCode::OK, Json(SweetResponse::from(&sweet))).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}
