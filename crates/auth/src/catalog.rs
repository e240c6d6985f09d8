//! Permission catalog seam: roles, permissions and the grants between them.

use std::collections::BTreeSet;

use thiserror::Error;

use crate::roles::{self, PermissionDefinition, RoleDefinition};
use crate::{Permission, Role};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("unknown role '{0}'")]
    UnknownRole(String),

    #[error("unknown permission '{0}'")]
    UnknownPermission(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("permission catalog unavailable: {0}")]
    Unavailable(String),
}

/// Role/permission storage.
///
/// Names are unique. Grants are additive: nothing here removes a permission
/// from a role.
pub trait PermissionCatalog: Send + Sync {
    /// Permission names granted to `role`.
    fn permissions_for_role(&self, role: &Role) -> Result<BTreeSet<Permission>, CatalogError>;

    fn role_by_name(&self, name: &str) -> Result<Option<RoleDefinition>, CatalogError>;

    fn permission_by_name(&self, name: &str) -> Result<Option<PermissionDefinition>, CatalogError>;

    /// Fails with [`CatalogError::Conflict`] if the name exists.
    fn create_role(&self, name: Role, description: &str) -> Result<RoleDefinition, CatalogError>;

    /// Fails with [`CatalogError::Conflict`] if the name exists.
    fn create_permission(
        &self,
        name: Permission,
        description: &str,
    ) -> Result<PermissionDefinition, CatalogError>;

    /// Grant a permission to a role. Granting twice is a no-op.
    fn grant(&self, role: &Role, permission: &Permission) -> Result<RoleDefinition, CatalogError>;

    fn list_roles(&self) -> Result<Vec<RoleDefinition>, CatalogError>;

    fn list_permissions(&self) -> Result<Vec<PermissionDefinition>, CatalogError>;

    /// Ensure the default vocabulary and baseline roles exist.
    ///
    /// Idempotent: looks up by name before inserting and only ever adds grants,
    /// so it is safe to run on every process start.
    fn seed_defaults(&self) -> Result<(), CatalogError> {
        for (permission, description) in crate::permissions::DEFAULT_PERMISSIONS {
            if self.permission_by_name(permission.as_str())?.is_none() {
                self.create_permission(permission.clone(), description)?;
                tracing::debug!(permission = %permission, "seeded permission");
            }
        }

        for (role, description, grants) in roles::default_roles() {
            let existing = match self.role_by_name(role.as_str())? {
                Some(def) => def,
                None => {
                    tracing::debug!(role = %role, "seeded role");
                    self.create_role(role.clone(), description)?
                }
            };
            for permission in grants {
                if !existing.permissions.contains(&permission) {
                    self.grant(&role, &permission)?;
                }
            }
        }

        Ok(())
    }
}
