//! Thin front-end for the sweetshop API: a typed HTTP client plus the
//! plain-text rendering used by the `sweetshop` binary.

pub mod client;
pub mod error;
pub mod table;
pub mod types;

pub use client::SweetshopClient;
pub use error::ClientError;
pub use types::{AuthSession, NewSweetBody, SearchQuery, SweetChanges, SweetView, UserView};
