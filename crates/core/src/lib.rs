//! `sweetshop-core`: shared domain primitives.
//!
//! Pure types only: identifiers, the domain error model and the entity
//! contract. No IO, no HTTP, no storage.

pub mod entity;
pub mod error;
pub mod id;

pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{SweetId, UserId};
