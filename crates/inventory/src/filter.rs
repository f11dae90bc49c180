//! Catalogue search criteria.

use serde::{Deserialize, Serialize};

use sweetshop_core::{DomainError, DomainResult};

use crate::Sweet;

/// Search criteria for listing sweets. Empty filter matches everything.
///
/// - `name`: case-insensitive substring
/// - `category`: case-insensitive exact match
/// - `min_price` / `max_price`: inclusive bounds
///
/// Every store must agree with [`SweetFilter::matches`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweetFilter {
    pub name: Option<String>,
    pub category: Option<String>,
    pub min_price: Option<i64>,
    pub max_price: Option<i64>,
}

impl SweetFilter {
    /// Normalize: blank text criteria are dropped, the rest trimmed.
    pub fn validate(self) -> DomainResult<Self> {
        if let (Some(min), Some(max)) = (self.min_price, self.max_price) {
            if min > max {
                return Err(DomainError::validation("min_price cannot exceed max_price"));
            }
        }
        Ok(Self {
            name: non_blank(self.name),
            category: non_blank(self.category),
            min_price: self.min_price,
            max_price: self.max_price,
        })
    }

    pub fn matches(&self, sweet: &Sweet) -> bool {
        if let Some(name) = &self.name {
            if !sweet.name().to_lowercase().contains(&name.to_lowercase()) {
                return false;
            }
        }
        if let Some(category) = &self.category {
            if sweet.category().to_lowercase() != category.to_lowercase() {
                return false;
            }
        }
        if self.min_price.is_some_and(|min| sweet.price() < min) {
            return false;
        }
        if self.max_price.is_some_and(|max| sweet.price() > max) {
            return false;
        }
        true
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
