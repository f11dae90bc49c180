//! Server configuration (flags with environment fallbacks).

use std::net::SocketAddr;

use clap::Parser;
use thiserror::Error;

const DEV_JWT_SECRET: &str = "dev-secret";

/// Longest accepted token lifetime: one year.
pub const MAX_TOKEN_TTL_MINUTES: i64 = 60 * 24 * 365;

#[derive(Debug, Clone, Parser)]
#[command(name = "sweetshop-api", about = "Sweet shop inventory HTTP API")]
pub struct AppConfig {
    /// Socket address to listen on.
    #[arg(long = "bind", env = "BIND_ADDR", default_value = "0.0.0.0:8080")]
    pub bind_addr: SocketAddr,

    /// HS256 signing secret for bearer tokens.
    #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
    pub jwt_secret: Option<String>,

    /// Lifetime of issued tokens.
    #[arg(long, env = "TOKEN_TTL_MINUTES", default_value_t = 60)]
    pub token_ttl_minutes: i64,

    /// Postgres connection string. In-memory stores are used when absent.
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    pub database_url: Option<String>,

    #[arg(long, env = "DATABASE_MAX_CONNECTIONS", default_value_t = 10)]
    pub database_max_connections: u32,

    /// Admin account created at startup if missing.
    #[arg(long, env = "ADMIN_EMAIL")]
    pub admin_email: Option<String>,

    #[arg(long, env = "ADMIN_PASSWORD", hide_env_values = true)]
    pub admin_password: Option<String>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("JWT secret must not be empty")]
    EmptyJwtSecret,

    #[error("token TTL must be between 1 and 525600 minutes (got {0})")]
    InvalidTokenTtl(i64),

    #[error("ADMIN_EMAIL and ADMIN_PASSWORD must be set together")]
    PartialAdminSeed,

    #[error("database pool needs at least one connection")]
    EmptyPool,
}

impl AppConfig {
    /// In-memory configuration with defaults; handy for tests and embedding.
    pub fn new(jwt_secret: impl Into<String>) -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
            jwt_secret: Some(jwt_secret.into()),
            token_ttl_minutes: 60,
            database_url: None,
            database_max_connections: 10,
            admin_email: None,
            admin_password: None,
        }
    }

    pub fn with_admin(mut self, email: impl Into<String>, password: impl Into<String>) -> Self {
        self.admin_email = Some(email.into());
        self.admin_password = Some(password.into());
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt_secret.as_deref().is_some_and(|s| s.is_empty()) {
            return Err(ConfigError::EmptyJwtSecret);
        }
        self.token_ttl()?;
        if self.admin_email.is_some() != self.admin_password.is_some() {
            return Err(ConfigError::PartialAdminSeed);
        }
        if self.database_url.is_some() && self.database_max_connections == 0 {
            return Err(ConfigError::EmptyPool);
        }
        Ok(())
    }

    pub fn jwt_secret(&self) -> &str {
        match self.jwt_secret.as_deref() {
            Some(secret) => secret,
            None => {
                tracing::warn!("JWT_SECRET not set; using insecure dev default");
                DEV_JWT_SECRET
            }
        }
    }

    pub fn token_ttl(&self) -> Result<chrono::Duration, ConfigError> {
        if !(1..=MAX_TOKEN_TTL_MINUTES).contains(&self.token_ttl_minutes) {
            return Err(ConfigError::InvalidTokenTtl(self.token_ttl_minutes));
        }
        chrono::Duration::try_minutes(self.token_ttl_minutes)
            .ok_or(ConfigError::InvalidTokenTtl(self.token_ttl_minutes))
    }

    pub fn admin_seed(&self) -> Option<(&str, &str)> {
        self.admin_email.as_deref().zip(self.admin_password.as_deref())
    }
}
