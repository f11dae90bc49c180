//! Sweet inventory domain.
//!
//! Business rules for the sweet catalogue and its stock levels, implemented
//! as deterministic domain logic (no IO, no HTTP, no storage). Stores call
//! into these rules inside their own transaction boundary.

pub mod filter;
pub mod sweet;

pub use filter::SweetFilter;
pub use sweet::{NewSweet, Sweet, SweetUpdate};
