//! User accounts and registration rules.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use sweetshop_core::{DomainError, DomainResult, Entity, UserId};

use crate::Role;

pub const MIN_PASSWORD_LEN: usize = 8;

/// A registered account.
///
/// `password_hash` is an argon2 PHC string and must never leave the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(
        id: UserId,
        email: String,
        password_hash: String,
        role: Role,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            email,
            password_hash,
            role,
            created_at,
        }
    }
}

impl Entity for User {
    type Id = UserId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Self-service sign-up request. Always yields a [`Role::User`] account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    pub email: String,
    pub password: String,
}

impl Registration {
    /// Validate and normalize the email; check password length.
    pub fn validate(self) -> DomainResult<Self> {
        let email = normalize_email(&self.email);
        validate_email(&email)?;
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(DomainError::validation(format!(
                "password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }
        Ok(Self {
            email,
            password: self.password,
        })
    }
}

/// Canonical form used for storage and lookups.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn validate_email(email: &str) -> DomainResult<()> {
    let invalid = || DomainError::validation("email is not a valid address");

    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') || email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }
    match domain.split_once('.') {
        Some((host, tld)) if !host.is_empty() && !tld.is_empty() && !domain.ends_with('.') => Ok(()),
        _ => Err(invalid()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registration(email: &str, password: &str) -> Registration {
        Registration {
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn email_is_normalized() {
        let reg = registration("  Alice@Example.COM ", "longenough").validate().unwrap();
        assert_eq!(reg.email, "alice@example.com");
    }

    #[test]
    fn malformed_emails_are_rejected() {
        for email in ["", "alice", "@example.com", "alice@", "alice@example", "a@b@c.com", "al ice@x.io", "a@x."] {
            assert!(
                registration(email, "longenough").validate().is_err(),
                "accepted {email:?}"
            );
        }
    }

    #[test]
    fn short_password_is_rejected() {
        let err = registration("bob@example.com", "short").validate().unwrap_err();
        assert_eq!(
            err,
            DomainError::validation("password must be at least 8 characters")
        );
    }
}
