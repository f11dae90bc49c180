use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use sweetshop_auth::Role;
use sweetshop_core::{SweetId, UserId};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SweetView {
    pub id: SweetId,
    pub name: String,
    pub category: String,
    pub price: i64,
    pub quantity: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UserView {
    pub id: UserId,
    pub email: String,
    pub role: Role,
}

/// Token plus the account it belongs to, as returned by register/login.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthSession {
    pub token: String,
    pub token_type: String,
    pub user: UserView,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewSweetBody {
    pub name: String,
    pub category: String,
    pub price: i64,
    pub quantity: i64,
}

/// Partial update; absent fields are left unchanged by the server.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SweetChanges {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SearchQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_price: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_price: Option<i64>,
}

impl SearchQuery {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.category.is_none()
            && self.min_price.is_none()
            && self.max_price.is_none()
    }
}
