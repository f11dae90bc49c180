use std::sync::Arc;

use anyhow::Context;
use chrono::Utc;
use sqlx::postgres::PgPoolOptions;

use sweetshop_auth::{hash_password, Hs256Jwt, JwtIssuer, JwtValidator, Registration, Role, User};
use sweetshop_core::UserId;
use sweetshop_infra::{
    store::ensure_schema, InMemorySweetStore, InMemoryUserStore, PostgresSweetStore,
    PostgresUserStore, SweetStore, UserStore,
};

use crate::AppConfig;

/// Shared handler dependencies.
#[derive(Clone)]
pub struct AppServices {
    pub sweets: Arc<dyn SweetStore>,
    pub users: Arc<dyn UserStore>,
    pub jwt: Arc<dyn JwtValidator>,
    pub tokens: Arc<dyn JwtIssuer>,
}

impl AppServices {
    /// In-memory wiring (dev/test).
    pub fn in_memory(codec: Arc<Hs256Jwt>) -> Self {
        Self {
            sweets: Arc::new(InMemorySweetStore::new()),
            users: Arc::new(InMemoryUserStore::new()),
            jwt: codec.clone(),
            tokens: codec,
        }
    }
}

pub async fn build_services(config: &AppConfig) -> anyhow::Result<AppServices> {
    config.validate()?;

    let codec = Arc::new(Hs256Jwt::new(config.jwt_secret().as_bytes(), config.token_ttl()?));

    let services = match &config.database_url {
        Some(url) => {
            let pool = PgPoolOptions::new()
                .max_connections(config.database_max_connections)
                .connect(url)
                .await
                .context("failed to connect to Postgres")?;
            ensure_schema(&pool).await.context("failed to prepare schema")?;
            tracing::info!("using Postgres stores");

            AppServices {
                sweets: Arc::new(PostgresSweetStore::new(pool.clone())),
                users: Arc::new(PostgresUserStore::new(pool)),
                jwt: codec.clone(),
                tokens: codec,
            }
        }
        None => {
            tracing::warn!("DATABASE_URL not set; using in-memory stores (data is lost on restart)");
            AppServices::in_memory(codec)
        }
    };

    if let Some((email, password)) = config.admin_seed() {
        seed_admin(services.users.as_ref(), email, password).await?;
    }

    Ok(services)
}

/// Create the configured admin account unless the email is already taken.
pub async fn seed_admin(users: &dyn UserStore, email: &str, password: &str) -> anyhow::Result<()> {
    let registration = Registration {
        email: email.to_string(),
        password: password.to_string(),
    }
    .validate()
    .context("invalid admin credentials")?;

    if let Some(existing) = users.find_by_email(&registration.email).await? {
        if existing.role != Role::Admin {
            tracing::warn!(email = %existing.email, "admin seed email belongs to a non-admin account; leaving it unchanged");
        }
        return Ok(());
    }

    let password = registration.password;
    let hash = tokio::task::spawn_blocking(move || hash_password(&password)).await??;

    let admin = User::new(UserId::new(), registration.email, hash, Role::Admin, Utc::now());
    let admin = users.insert(admin).await?;
    tracing::info!(user_id = %admin.id, email = %admin.email, "seeded admin account");
    Ok(())
}
