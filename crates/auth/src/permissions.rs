use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Permission identifier.
///
/// Permissions are modeled as opaque strings (e.g. "create_product"). Each one
/// gates exactly one kind of operation; roles are bundles of them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
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
}

impl core::fmt::Display for Permission {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&'static str> for Permission {
    fn from(value: &'static str) -> Self {
        Self::from_static(value)
    }
}

// Built-in vocabulary seeded into every catalog.

pub const CREATE_PRODUCT: Permission = Permission::from_static("create_product");
pub const READ_PRODUCT: Permission = Permission::from_static("read_product");
pub const UPDATE_PRODUCT: Permission = Permission::from_static("update_product");
pub const DELETE_PRODUCT: Permission = Permission::from_static("delete_product");
pub const CREATE_USER: Permission = Permission::from_static("create_user");
pub const READ_USER: Permission = Permission::from_static("read_user");
pub const UPDATE_USER: Permission = Permission::from_static("update_user");
pub const DELETE_USER: Permission = Permission::from_static("delete_user");
pub const MANAGE_ROLES: Permission = Permission::from_static("manage_roles");
pub const MANAGE_TABLES: Permission = Permission::from_static("manage_tables");

/// Default permission vocabulary with descriptions, in seeding order.
pub const DEFAULT_PERMISSIONS: [(Permission, &str); 10] = [
    (CREATE_PRODUCT, "Can create new products"),
    (READ_PRODUCT, "Can view products"),
    (UPDATE_PRODUCT, "Can update products"),
    (DELETE_PRODUCT, "Can delete products"),
    (CREATE_USER, "Can create new users"),
    (READ_USER, "Can view users"),
    (UPDATE_USER, "Can update users"),
    (DELETE_USER, "Can delete users"),
    (MANAGE_ROLES, "Can manage user roles and permissions"),
    (MANAGE_TABLES, "Can manage database tables"),
];
