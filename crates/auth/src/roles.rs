use std::borrow::Cow;
use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::permissions::{self, Permission};

/// Role identifier used for RBAC.
///
/// Role names are unique within a catalog, so the name doubles as the
/// reference a user record carries.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Role(Cow<'static, str>);

impl Role {
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

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

pub const ADMIN: Role = Role::from_static("admin");
pub const MANAGER: Role = Role::from_static("manager");
pub const USER: Role = Role::from_static("user");

/// Role assigned to self-registered accounts.
pub const DEFAULT_SIGNUP_ROLE: Role = USER;

/// Role with its description and granted permissions (catalog record).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleDefinition {
    pub name: Role,
    pub description: String,
    pub permissions: BTreeSet<Permission>,
}

/// Permission with its description (catalog record).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionDefinition {
    pub name: Permission,
    pub description: String,
}

/// Baseline roles and the permissions each must hold after seeding.
///
/// `admin` receives the whole default vocabulary.
pub fn default_roles() -> Vec<(Role, &'static str, Vec<Permission>)> {
    vec![
        (
            ADMIN,
            "Administrator with full access",
            permissions::DEFAULT_PERMISSIONS
                .iter()
                .map(|(p, _)| p.clone())
                .collect(),
        ),
        (
            MANAGER,
            "Manager with product management access",
            vec![
                permissions::CREATE_PRODUCT,
                permissions::READ_PRODUCT,
                permissions::UPDATE_PRODUCT,
                permissions::READ_USER,
            ],
        ),
        (
            USER,
            "Regular user with limited access",
            vec![permissions::READ_PRODUCT],
        ),
    ]
}
