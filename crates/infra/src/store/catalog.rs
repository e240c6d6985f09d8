use std::collections::{BTreeMap, BTreeSet};

use parking_lot::RwLock;

use bazaar_auth::{
    CatalogError, Permission, PermissionCatalog, PermissionDefinition, Role, RoleDefinition,
};

#[derive(Default)]
struct Catalog {
    permissions: BTreeMap<String, PermissionDefinition>,
    roles: BTreeMap<String, RoleDefinition>,
}

/// In-memory role/permission catalog for tests/dev.
#[derive(Default)]
pub struct InMemoryCatalog {
    inner: RwLock<Catalog>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// A catalog with the default vocabulary and baseline roles already seeded.
    pub fn seeded() -> Result<Self, CatalogError> {
        let catalog = Self::new();
        catalog.seed_defaults()?;
        Ok(catalog)
    }
}

impl PermissionCatalog for InMemoryCatalog {
    fn permissions_for_role(&self, role: &Role) -> Result<BTreeSet<Permission>, CatalogError> {
        self.inner
            .read()
            .roles
            .get(role.as_str())
            .map(|def| def.permissions.clone())
            .ok_or_else(|| CatalogError::UnknownRole(role.to_string()))
    }

    fn role_by_name(&self, name: &str) -> Result<Option<RoleDefinition>, CatalogError> {
        Ok(self.inner.read().roles.get(name).cloned())
    }

    fn permission_by_name(&self, name: &str) -> Result<Option<PermissionDefinition>, CatalogError> {
        Ok(self.inner.read().permissions.get(name).cloned())
    }

    fn create_role(&self, name: Role, description: &str) -> Result<RoleDefinition, CatalogError> {
        let mut catalog = self.inner.write();
        if catalog.roles.contains_key(name.as_str()) {
            return Err(CatalogError::Conflict(format!("role '{name}' already exists")));
        }
        let def = RoleDefinition {
            name: name.clone(),
            description: description.to_string(),
            permissions: BTreeSet::new(),
        };
        catalog.roles.insert(name.as_str().to_string(), def.clone());
        Ok(def)
    }

    fn create_permission(
        &self,
        name: Permission,
        description: &str,
    ) -> Result<PermissionDefinition, CatalogError> {
        let mut catalog = self.inner.write();
        if catalog.permissions.contains_key(name.as_str()) {
            return Err(CatalogError::Conflict(format!("permission '{name}' already exists")));
        }
        let def = PermissionDefinition {
            name: name.clone(),
            description: description.to_string(),
        };
        catalog.permissions.insert(name.as_str().to_string(), def.clone());
        Ok(def)
    }

    fn grant(&self, role: &Role, permission: &Permission) -> Result<RoleDefinition, CatalogError> {
        let mut catalog = self.inner.write();
        if !catalog.permissions.contains_key(permission.as_str()) {
            return Err(CatalogError::UnknownPermission(permission.to_string()));
        }
        let def = catalog
            .roles
            .get_mut(role.as_str())
            .ok_or_else(|| CatalogError::UnknownRole(role.to_string()))?;
        def.permissions.insert(permission.clone());
        Ok(def.clone())
    }

    fn list_roles(&self) -> Result<Vec<RoleDefinition>, CatalogError> {
        Ok(self.inner.read().roles.values().cloned().collect())
    }

    fn list_permissions(&self) -> Result<Vec<PermissionDefinition>, CatalogError> {
        Ok(self.inner.read().permissions.values().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bazaar_auth::permissions::*;
    use bazaar_auth::roles;

    #[test]
    fn seeding_grants_baseline_roles() {
        let catalog = InMemoryCatalog::seeded().unwrap();

        let admin = catalog.permissions_for_role(&roles::ADMIN).unwrap();
        assert_eq!(admin.len(), DEFAULT_PERMISSIONS.len());

        let manager = catalog.permissions_for_role(&roles::MANAGER).unwrap();
        let expected: BTreeSet<Permission> =
            [CREATE_PRODUCT, READ_PRODUCT, UPDATE_PRODUCT, READ_USER].into_iter().collect();
        assert_eq!(manager, expected);

        let user = catalog.permissions_for_role(&roles::USER).unwrap();
        assert_eq!(user, BTreeSet::from([READ_PRODUCT]));
    }

    #[test]
    fn seeding_twice_duplicates_nothing() {
        let catalog = InMemoryCatalog::seeded().unwrap();
        catalog.seed_defaults().unwrap();

        assert_eq!(catalog.list_roles().unwrap().len(), 3);
        assert_eq!(catalog.list_permissions().unwrap().len(), DEFAULT_PERMISSIONS.len());
    }

    #[test]
    fn reseeding_keeps_extra_grants() {
        let catalog = InMemoryCatalog::seeded().unwrap();
        catalog.grant(&roles::USER, &READ_USER).unwrap();

        catalog.seed_defaults().unwrap();

        let user = catalog.permissions_for_role(&roles::USER).unwrap();
        assert!(user.contains(&READ_USER));
        assert!(user.contains(&READ_PRODUCT));
    }

    #[test]
    fn duplicate_names_conflict() {
        let catalog = InMemoryCatalog::seeded().unwrap();
        assert!(matches!(
            catalog.create_role(roles::ADMIN, "again"),
            Err(CatalogError::Conflict(_))
        ));
        assert!(matches!(
            catalog.create_permission(READ_PRODUCT, "again"),
            Err(CatalogError::Conflict(_))
        ));
    }

    #[test]
    fn grant_requires_known_role_and_permission() {
        let catalog = InMemoryCatalog::seeded().unwrap();
        assert!(matches!(
            catalog.grant(&Role::new("ghost"), &READ_PRODUCT),
            Err(CatalogError::UnknownRole(_))
        ));
        assert!(matches!(
            catalog.grant(&roles::USER, &Permission::new("fly")),
            Err(CatalogError::UnknownPermission(_))
        ));
    }

    #[test]
    fn unknown_role_has_no_permissions() {
        let catalog = InMemoryCatalog::seeded().unwrap();
        assert_eq!(
            catalog.permissions_for_role(&Role::new("ghost")),
            Err(CatalogError::UnknownRole("ghost".into()))
        );
    }
}
