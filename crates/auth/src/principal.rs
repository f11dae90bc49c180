use sweetshop_core::UserId;

use crate::{permissions_for, JwtClaims, Permission, Role};

/// A fully resolved caller, ready for authorization decisions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub user_id: UserId,
    pub email: String,
    pub role: Role,
    pub permissions: Vec<Permission>,
}

impl Principal {
    pub fn new(user_id: UserId, email: impl Into<String>, role: Role) -> Self {
        Self {
            user_id,
            email: email.into(),
            role,
            permissions: permissions_for(role),
        }
    }

    /// Resolve a principal from already-validated token claims.
    pub fn from_claims(claims: &JwtClaims) -> Self {
        Self::new(claims.sub, claims.email.clone(), claims.role)
    }
}
