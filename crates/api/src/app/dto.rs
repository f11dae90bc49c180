use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use sweetshop_auth::{Principal, Role, User};
use sweetshop_core::{Entity, SweetId, UserId};
use sweetshop_inventory::{NewSweet, Sweet, SweetFilter, SweetUpdate};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateSweetRequest {
    pub name: String,
    pub category: String,
    pub price: i64,
    #[serde(default)]
    pub quantity: i64,
}

impl From<CreateSweetRequest> for NewSweet {
    fn from(req: CreateSweetRequest) -> Self {
        NewSweet {
            name: req.name,
            category: req.category,
            price: req.price,
            quantity: req.quantity,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateSweetRequest {
    pub name: Option<String>,
    pub category: Option<String>,
    pub price: Option<i64>,
}

impl From<UpdateSweetRequest> for SweetUpdate {
    fn from(req: UpdateSweetRequest) -> Self {
        SweetUpdate {
            name: req.name,
            category: req.category,
            price: req.price,
        }
    }
}

/// Purchase body; an empty body buys a single unit.
#[derive(Debug, Deserialize)]
pub struct PurchaseRequest {
    #[serde(default = "one")]
    pub quantity: i64,
}

impl Default for PurchaseRequest {
    fn default() -> Self {
        Self { quantity: one() }
    }
}

fn one() -> i64 {
    1
}

#[derive(Debug, Deserialize)]
pub struct RestockRequest {
    pub quantity: i64,
}

/// `GET /api/sweets` query string.
#[derive(Debug, Default, Deserialize)]
pub struct SweetQuery {
    pub name: Option<String>,
    pub category: Option<String>,
    #[serde(alias = "minPrice")]
    pub min_price: Option<i64>,
    #[serde(alias = "maxPrice")]
    pub max_price: Option<i64>,
}

impl From<SweetQuery> for SweetFilter {
    fn from(q: SweetQuery) -> Self {
        SweetFilter {
            name: q.name,
            category: q.category,
            min_price: q.min_price,
            max_price: q.max_price,
        }
    }
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
pub struct SweetResponse {
    pub id: SweetId,
    pub name: String,
    pub category: String,
    pub price: i64,
    pub quantity: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Sweet> for SweetResponse {
    fn from(s: &Sweet) -> Self {
        Self {
            id: *s.id(),
            name: s.name().to_string(),
            category: s.category().to_string(),
            price: s.price(),
            quantity: s.quantity(),
            created_at: s.created_at(),
            updated_at: s.updated_at(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: UserId,
    pub email: String,
    pub role: Role,
}

impl From<&User> for UserResponse {
    fn from(u: &User) -> Self {
        Self {
            id: u.id,
            email: u.email.clone(),
            role: u.role,
        }
    }
}

impl From<&Principal> for UserResponse {
    fn from(p: &Principal) -> Self {
        Self {
            id: p.user_id,
            email: p.email.clone(),
            role: p.role,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub token_type: &'static str,
    pub user: UserResponse,
}

impl AuthResponse {
    pub fn bearer(token: String, user: &User) -> Self {
        Self {
            token,
            token_type: "Bearer",
            user: user.into(),
        }
    }
}
