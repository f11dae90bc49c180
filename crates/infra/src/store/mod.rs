//! Store abstractions for users and sweets.
//!
//! Every mutation runs as one transaction: read the current row, apply the
//! domain rule from `sweetshop-inventory`, write the result. A rejected
//! mutation leaves the row untouched.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use sweetshop_auth::User;
use sweetshop_core::{DomainError, SweetId, UserId};
use sweetshop_inventory::{NewSweet, Sweet, SweetFilter, SweetUpdate};

pub use memory::{InMemorySweetStore, InMemoryUserStore};
pub use postgres::{ensure_schema, PostgresSweetStore, PostgresUserStore};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Business rule rejection (not found, insufficient stock, duplicate, ...).
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Unexpected persistence failure.
    #[error("database error: {0}")]
    Database(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Sweet inventory persistence.
#[async_trait]
pub trait SweetStore: Send + Sync {
    /// Insert a new sweet. Names are unique case-insensitively.
    async fn insert(&self, input: NewSweet, now: DateTime<Utc>) -> StoreResult<Sweet>;

    async fn get(&self, id: SweetId) -> StoreResult<Option<Sweet>>;

    /// Sweets matching `filter`, ordered by name (case-insensitive) then id.
    async fn list(&self, filter: &SweetFilter) -> StoreResult<Vec<Sweet>>;

    async fn update(&self, id: SweetId, update: SweetUpdate, now: DateTime<Utc>) -> StoreResult<Sweet>;

    /// Decrement stock by `amount`; rejected when `amount` exceeds stock.
    async fn purchase(&self, id: SweetId, amount: i64, now: DateTime<Utc>) -> StoreResult<Sweet>;

    /// Increment stock by `amount`; rejected when `amount <= 0`.
    async fn restock(&self, id: SweetId, amount: i64, now: DateTime<Utc>) -> StoreResult<Sweet>;
}

/// User account persistence.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a user. Emails are unique.
    async fn insert(&self, user: User) -> StoreResult<User>;

    /// Look up by normalized email.
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    async fn get(&self, id: UserId) -> StoreResult<Option<User>>;
}

fn duplicate_sweet(name: &str) -> StoreError {
    StoreError::Domain(DomainError::conflict(format!("a sweet named '{name}' already exists")))
}

fn duplicate_email() -> StoreError {
    StoreError::Domain(DomainError::conflict("email already registered"))
}

fn sweet_not_found() -> StoreError {
    StoreError::Domain(DomainError::not_found("sweet"))
}

/// Sort order shared by every store.
fn sort_sweets(sweets: &mut [Sweet]) {
    use sweetshop_core::Entity;
    sweets.sort_by(|a, b| a.name_key().cmp(&b.name_key()).then_with(|| a.id().cmp(b.id())));
}
