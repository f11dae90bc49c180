//! Postgres-backed stores.
//!
//! ## Error Mapping
//!
//! | SQLx error | PostgreSQL code | StoreError |
//! |------------|-----------------|------------|
//! | Database (unique violation) | `23505` | `Domain(Conflict)` |
//! | Database (check violation) | `23514` | `Domain(InvariantViolation)` |
//! | anything else | | `Database` |
//!
//! ## Concurrency
//!
//! Stock mutations lock the row with `SELECT ... FOR UPDATE`, apply the
//! domain rule in Rust, then `UPDATE` and commit. Concurrent purchases of
//! the same sweet serialize on the row lock; the `CHECK (quantity >= 0)`
//! constraint backs the invariant at the database level.

use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::instrument;
use uuid::Uuid;

use sweetshop_auth::{Role, User};
use sweetshop_core::{DomainError, DomainResult, Entity, SweetId, UserId};
use sweetshop_inventory::{NewSweet, Sweet, SweetFilter, SweetUpdate};

use super::{
    duplicate_email, duplicate_sweet, sweet_not_found, StoreError, StoreResult, SweetStore,
    UserStore,
};

const SCHEMA: &str = include_str!("schema.sql");

const SWEET_COLUMNS: &str = "id, name, category, price, quantity, created_at, updated_at";

/// Create tables and indexes if they do not exist yet. Idempotent.
pub async fn ensure_schema(pool: &PgPool) -> StoreResult<()> {
    for statement in SCHEMA.split(';').map(str::trim).filter(|s| !s.is_empty()) {
        sqlx::query(statement)
            .execute(pool)
            .await
            .map_err(|e| StoreError::Database(e.to_string()))?;
    }
    tracing::info!("database schema ready");
    Ok(())
}

fn map_sqlx(err: sqlx::Error, on_conflict: impl FnOnce() -> StoreError) -> StoreError {
    if let sqlx::Error::Database(db) = &err {
        match db.code().as_deref() {
            Some("23505") => return on_conflict(),
            Some("23514") => {
                return StoreError::Domain(DomainError::invariant(db.message().to_string()));
            }
            _ => {}
        }
    }
    StoreError::Database(err.to_string())
}

fn db_err(err: sqlx::Error) -> StoreError {
    StoreError::Database(err.to_string())
}

/// A stored row that breaks a domain rule is a persistence fault, not a
/// client error.
fn corrupt_row(err: DomainError) -> StoreError {
    StoreError::Database(format!("corrupt row: {err}"))
}

fn parse_role(raw: &str) -> StoreResult<Role> {
    Role::from_str(raw).map_err(corrupt_row)
}

fn sweet_from_row(row: &PgRow) -> StoreResult<Sweet> {
    let sweet = Sweet::rehydrate(
        SweetId::from_uuid(row.try_get::<Uuid, _>("id").map_err(db_err)?),
        row.try_get("name").map_err(db_err)?,
        row.try_get("category").map_err(db_err)?,
        row.try_get("price").map_err(db_err)?,
        row.try_get("quantity").map_err(db_err)?,
        row.try_get("created_at").map_err(db_err)?,
        row.try_get("updated_at").map_err(db_err)?,
    )
    .map_err(corrupt_row)?;
    Ok(sweet)
}

fn user_from_row(row: &PgRow) -> StoreResult<User> {
    let role: String = row.try_get("role").map_err(db_err)?;
    Ok(User::new(
        UserId::from_uuid(row.try_get::<Uuid, _>("id").map_err(db_err)?),
        row.try_get("email").map_err(db_err)?,
        row.try_get("password_hash").map_err(db_err)?,
        parse_role(&role)?,
        row.try_get("created_at").map_err(db_err)?,
    ))
}

/// Postgres-backed sweet store.
#[derive(Debug, Clone)]
pub struct PostgresSweetStore {
    pool: Arc<PgPool>,
}

impl PostgresSweetStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Lock the row, apply `change`, write back, commit.
    ///
    /// Dropping the transaction on any error rolls it back.
    async fn mutate(
        &self,
        id: SweetId,
        change: impl FnOnce(&mut Sweet) -> DomainResult<()> + Send,
    ) -> StoreResult<Sweet> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        let row = sqlx::query(&format!(
            "SELECT {SWEET_COLUMNS} FROM sweets WHERE id = $1 FOR UPDATE"
        ))
        .bind(Uuid::from(id))
        .fetch_optional(&mut *tx)
        .await
        .map_err(db_err)?
        .ok_or_else(sweet_not_found)?;

        let mut sweet = sweet_from_row(&row)?;
        change(&mut sweet)?;

        sqlx::query(
            r#"
            UPDATE sweets
            SET name = $2, category = $3, price = $4, quantity = $5, updated_at = $6
            WHERE id = $1
            "#,
        )
        .bind(Uuid::from(id))
        .bind(sweet.name())
        .bind(sweet.category())
        .bind(sweet.price())
        .bind(sweet.quantity())
        .bind(sweet.updated_at())
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx(e, || duplicate_sweet(sweet.name())))?;

        tx.commit().await.map_err(db_err)?;
        Ok(sweet)
    }
}

#[async_trait]
impl SweetStore for PostgresSweetStore {
    #[instrument(skip(self, now), err)]
    async fn insert(&self, input: NewSweet, now: DateTime<Utc>) -> StoreResult<Sweet> {
        let sweet = Sweet::create(SweetId::new(), input, now)?;

        sqlx::query(&format!(
            "INSERT INTO sweets ({SWEET_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7)"
        ))
        .bind(Uuid::from(*sweet.id()))
        .bind(sweet.name())
        .bind(sweet.category())
        .bind(sweet.price())
        .bind(sweet.quantity())
        .bind(sweet.created_at())
        .bind(sweet.updated_at())
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx(e, || duplicate_sweet(sweet.name())))?;

        Ok(sweet)
    }

    #[instrument(skip(self), err)]
    async fn get(&self, id: SweetId) -> StoreResult<Option<Sweet>> {
        let row = sqlx::query(&format!("SELECT {SWEET_COLUMNS} FROM sweets WHERE id = $1"))
            .bind(Uuid::from(id))
            .fetch_optional(&*self.pool)
            .await
            .map_err(db_err)?;

        row.as_ref().map(sweet_from_row).transpose()
    }

    #[instrument(skip(self), err)]
    async fn list(&self, filter: &SweetFilter) -> StoreResult<Vec<Sweet>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {SWEET_COLUMNS}
            FROM sweets
            WHERE ($1::text IS NULL OR strpos(lower(name), lower($1)) > 0)
              AND ($2::text IS NULL OR lower(category) = lower($2))
              AND ($3::bigint IS NULL OR price >= $3)
              AND ($4::bigint IS NULL OR price <= $4)
            ORDER BY lower(name) COLLATE "C", id
            "#
        ))
        .bind(filter.name.as_deref())
        .bind(filter.category.as_deref())
        .bind(filter.min_price)
        .bind(filter.max_price)
        .fetch_all(&*self.pool)
        .await
        .map_err(db_err)?;

        rows.iter().map(sweet_from_row).collect()
    }

    #[instrument(skip(self, now), err)]
    async fn update(&self, id: SweetId, update: SweetUpdate, now: DateTime<Utc>) -> StoreResult<Sweet> {
        self.mutate(id, move |sweet| sweet.apply_update(update, now)).await
    }

    #[instrument(skip(self, now), err)]
    async fn purchase(&self, id: SweetId, amount: i64, now: DateTime<Utc>) -> StoreResult<Sweet> {
        self.mutate(id, move |sweet| sweet.purchase(amount, now)).await
    }

    #[instrument(skip(self, now), err)]
    async fn restock(&self, id: SweetId, amount: i64, now: DateTime<Utc>) -> StoreResult<Sweet> {
        self.mutate(id, move |sweet| sweet.restock(amount, now)).await
    }
}

/// Postgres-backed user store.
#[derive(Debug, Clone)]
pub struct PostgresUserStore {
    pool: Arc<PgPool>,
}

impl PostgresUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }
}

#[async_trait]
impl UserStore for PostgresUserStore {
    #[instrument(skip(self, user), fields(email = %user.email), err)]
    async fn insert(&self, user: User) -> StoreResult<User> {
        sqlx::query(
            r#"
            INSERT INTO users (id, email, password_hash, role, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(Uuid::from(user.id))
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(user.created_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx(e, duplicate_email))?;

        Ok(user)
    }

    #[instrument(skip(self), err)]
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let row = sqlx::query(
            "SELECT id, email, password_hash, role, created_at FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&*self.pool)
        .await
        .map_err(db_err)?;

        row.as_ref().map(user_from_row).transpose()
    }

    #[instrument(skip(self), err)]
    async fn get(&self, id: UserId) -> StoreResult<Option<User>> {
        let row = sqlx::query(
            "SELECT id, email, password_hash, role, created_at FROM users WHERE id = $1",
        )
        .bind(Uuid::from(id))
        .fetch_optional(&*self.pool)
        .await
        .map_err(db_err)?;

        row.as_ref().map(user_from_row).transpose()
    }
}
