use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use sweetshop_core::{DomainError, DomainResult, Entity, SweetId};

/// Input for creating a sweet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSweet {
    pub name: String,
    pub category: String,
    /// Price in the smallest currency unit (e.g. cents).
    pub price: i64,
    /// Initial stock.
    pub quantity: i64,
}

impl NewSweet {
    /// Validate and normalize (trim) the input.
    pub fn validate(self) -> DomainResult<Self> {
        let name = normalize_text(&self.name, "name")?;
        let category = normalize_text(&self.category, "category")?;
        ensure_price(self.price)?;
        if self.quantity < 0 {
            return Err(DomainError::validation("quantity cannot be negative"));
        }
        Ok(Self {
            name,
            category,
            price: self.price,
            quantity: self.quantity,
        })
    }
}

/// Partial update of a sweet's catalogue fields.
///
/// Stock is deliberately absent: it only moves through purchase/restock.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweetUpdate {
    pub name: Option<String>,
    pub category: Option<String>,
    pub price: Option<i64>,
}

impl SweetUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.category.is_none() && self.price.is_none()
    }
}

/// A sweet: catalogue entry plus available stock.
///
/// # Invariants
/// - `quantity >= 0`
/// - `price >= 0`
/// - `name` and `category` are trimmed and non-empty
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sweet {
    id: SweetId,
    name: String,
    category: String,
    price: i64,
    quantity: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Sweet {
    /// Build a new sweet from validated input.
    pub fn create(id: SweetId, input: NewSweet, now: DateTime<Utc>) -> DomainResult<Self> {
        let input = input.validate()?;
        Ok(Self {
            id,
            name: input.name,
            category: input.category,
            price: input.price,
            quantity: input.quantity,
            created_at: now,
            updated_at: now,
        })
    }

    /// Rebuild a sweet from persisted columns, re-checking invariants.
    pub fn rehydrate(
        id: SweetId,
        name: String,
        category: String,
        price: i64,
        quantity: i64,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        if quantity < 0 {
            return Err(DomainError::invariant("stored quantity is negative"));
        }
        ensure_price(price)?;
        Ok(Self {
            id,
            name,
            category,
            price,
            quantity,
            created_at,
            updated_at,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Case-insensitive key used for name uniqueness.
    pub fn name_key(&self) -> String {
        self.name.to_lowercase()
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn price(&self) -> i64 {
        self.price
    }

    pub fn quantity(&self) -> i64 {
        self.quantity
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Take `amount` units out of stock.
    ///
    /// Rejected without any change when `amount <= 0` or `amount > quantity`.
    pub fn purchase(&mut self, amount: i64, now: DateTime<Utc>) -> DomainResult<()> {
        if amount <= 0 {
            return Err(DomainError::validation("purchase quantity must be positive"));
        }
        if amount > self.quantity {
            return Err(DomainError::invariant(format!(
                "insufficient stock for '{}': requested {}, available {}",
                self.name, amount, self.quantity
            )));
        }
        self.quantity -= amount;
        self.updated_at = now;
        Ok(())
    }

    /// Put `amount` units back into stock.
    pub fn restock(&mut self, amount: i64, now: DateTime<Utc>) -> DomainResult<()> {
        if amount <= 0 {
            return Err(DomainError::validation("restock quantity must be positive"));
        }
        self.quantity = self
            .quantity
            .checked_add(amount)
            .ok_or_else(|| DomainError::validation("restock quantity too large"))?;
        self.updated_at = now;
        Ok(())
    }

    /// Apply a catalogue update. All-or-nothing: on error `self` is unchanged.
    pub fn apply_update(&mut self, update: SweetUpdate, now: DateTime<Utc>) -> DomainResult<()> {
        if update.is_empty() {
            return Err(DomainError::validation("update must change at least one field"));
        }

        let name = match update.name {
            Some(n) => normalize_text(&n, "name")?,
            None => self.name.clone(),
        };
        let category = match update.category {
            Some(c) => normalize_text(&c, "category")?,
            None => self.category.clone(),
        };
        let price = match update.price {
            Some(p) => {
                ensure_price(p)?;
                p
            }
            None => self.price,
        };

        self.name = name;
        self.category = category;
        self.price = price;
        self.updated_at = now;
        Ok(())
    }
}

impl Entity for Sweet {
    type Id = SweetId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

fn normalize_text(value: &str, field: &str) -> DomainResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DomainError::validation(format!("{field} cannot be empty")));
    }
    Ok(trimmed.to_string())
}

fn ensure_price(price: i64) -> DomainResult<()> {
    if price < 0 {
        return Err(DomainError::validation("price cannot be negative"));
    }
    Ok(())
}
