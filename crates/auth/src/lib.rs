//! `sweetshop-auth`: authentication and authorization boundary.
//!
//! Decoupled from HTTP and storage: the API layer feeds it bearer tokens and
//! plaintext credentials, stores persist the [`User`] values it produces.

pub mod authorize;
pub mod claims;
pub mod jwt;
pub mod password;
pub mod permissions;
pub mod principal;
pub mod roles;
pub mod user;

pub use authorize::{authorize, AuthzError};
pub use claims::{validate_claims, JwtClaims, TokenError};
pub use jwt::{Hs256Jwt, JwtIssuer, JwtValidator};
pub use password::{hash_password, verify_password, verify_unknown_account, PasswordError};
pub use permissions::{permissions_for, Permission};
pub use principal::Principal;
pub use roles::Role;
pub use user::{normalize_email, Registration, User};
