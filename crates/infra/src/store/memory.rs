//! In-memory stores for tests and local development.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use sweetshop_auth::User;
use sweetshop_core::{DomainResult, SweetId, UserId};
use sweetshop_inventory::{NewSweet, Sweet, SweetFilter, SweetUpdate};

use super::{
    duplicate_email, duplicate_sweet, sort_sweets, sweet_not_found, StoreError, StoreResult,
    SweetStore, UserStore,
};

fn poisoned() -> StoreError {
    StoreError::Database("in-memory store lock poisoned".to_string())
}

/// In-memory sweet store.
///
/// The write lock is held across read-check-write, which gives every
/// mutation the same all-or-nothing behaviour as a database transaction.
#[derive(Debug, Default)]
pub struct InMemorySweetStore {
    inner: RwLock<HashMap<SweetId, Sweet>>,
}

impl InMemorySweetStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn mutate(
        &self,
        id: SweetId,
        change: impl FnOnce(&mut Sweet) -> DomainResult<()>,
    ) -> StoreResult<Sweet> {
        let mut map = self.inner.write().map_err(|_| poisoned())?;

        let current = map.get(&id).ok_or_else(sweet_not_found)?;
        let mut next = current.clone();
        change(&mut next)?;

        let key = next.name_key();
        let clash = map
            .iter()
            .any(|(other_id, other)| *other_id != id && other.name_key() == key);
        if clash {
            return Err(duplicate_sweet(next.name()));
        }

        map.insert(id, next.clone());
        Ok(next)
    }
}

#[async_trait]
impl SweetStore for InMemorySweetStore {
    async fn insert(&self, input: NewSweet, now: DateTime<Utc>) -> StoreResult<Sweet> {
        let sweet = Sweet::create(SweetId::new(), input, now)?;
        let mut map = self.inner.write().map_err(|_| poisoned())?;

        let key = sweet.name_key();
        if map.values().any(|s| s.name_key() == key) {
            return Err(duplicate_sweet(sweet.name()));
        }

        map.insert(*sweetshop_core::Entity::id(&sweet), sweet.clone());
        Ok(sweet)
    }

    async fn get(&self, id: SweetId) -> StoreResult<Option<Sweet>> {
        let map = self.inner.read().map_err(|_| poisoned())?;
        Ok(map.get(&id).cloned())
    }

    async fn list(&self, filter: &SweetFilter) -> StoreResult<Vec<Sweet>> {
        let map = self.inner.read().map_err(|_| poisoned())?;
        let mut sweets: Vec<Sweet> = map.values().filter(|s| filter.matches(s)).cloned().collect();
        sort_sweets(&mut sweets);
        Ok(sweets)
    }

    async fn update(&self, id: SweetId, update: SweetUpdate, now: DateTime<Utc>) -> StoreResult<Sweet> {
        self.mutate(id, |sweet| sweet.apply_update(update, now))
    }

    async fn purchase(&self, id: SweetId, amount: i64, now: DateTime<Utc>) -> StoreResult<Sweet> {
        self.mutate(id, |sweet| sweet.purchase(amount, now))
    }

    async fn restock(&self, id: SweetId, amount: i64, now: DateTime<Utc>) -> StoreResult<Sweet> {
        self.mutate(id, |sweet| sweet.restock(amount, now))
    }
}

/// In-memory user store, keyed by id with an email index.
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    inner: RwLock<UserMaps>,
}

#[derive(Debug, Default)]
struct UserMaps {
    by_id: HashMap<UserId, User>,
    by_email: HashMap<String, UserId>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn insert(&self, user: User) -> StoreResult<User> {
        let mut maps = self.inner.write().map_err(|_| poisoned())?;
        if maps.by_email.contains_key(&user.email) {
            return Err(duplicate_email());
        }
        maps.by_email.insert(user.email.clone(), user.id);
        maps.by_id.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let maps = self.inner.read().map_err(|_| poisoned())?;
        Ok(maps
            .by_email
            .get(email)
            .and_then(|id| maps.by_id.get(id))
            .cloned())
    }

    async fn get(&self, id: UserId) -> StoreResult<Option<User>> {
        let maps = self.inner.read().map_err(|_| poisoned())?;
        Ok(maps.by_id.get(&id).cloned())
    }
}
