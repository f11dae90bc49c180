use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::Role;

/// Permission identifier.
///
/// Permissions are opaque strings (e.g. "sweets.read"). The wildcard `"*"`
/// grants everything.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Permission(Cow<'static, str>);

impl Permission {
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub const fn from_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_wildcard(&self) -> bool {
        self.as_str() == "*"
    }
}

impl core::fmt::Display for Permission {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

pub const ALL: Permission = Permission::from_static("*");
pub const SWEETS_READ: Permission = Permission::from_static("sweets.read");
pub const SWEETS_PURCHASE: Permission = Permission::from_static("sweets.purchase");
pub const SWEETS_CREATE: Permission = Permission::from_static("sweets.create");
pub const SWEETS_UPDATE: Permission = Permission::from_static("sweets.update");
pub const SWEETS_RESTOCK: Permission = Permission::from_static("sweets.restock");

/// Static role → permission policy.
pub fn permissions_for(role: Role) -> Vec<Permission> {
    match role {
        Role::Admin => vec![ALL],
        Role::User => vec![SWEETS_READ, SWEETS_PURCHASE],
    }
}
