//! Infrastructure layer: persistence for users and the sweet inventory.

pub mod store;

pub use store::{
    InMemorySweetStore, InMemoryUserStore, PostgresSweetStore, PostgresUserStore, StoreError,
    StoreResult, SweetStore, UserStore,
};
