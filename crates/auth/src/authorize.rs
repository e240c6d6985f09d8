use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::Permission;

/// How a set of required permissions combines.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// Every required permission must be held.
    #[default]
    All,
    /// At least one required permission must be held.
    Any,
}

/// Permissions an operation demands, declared statically per route.
///
/// An empty requirement means "valid credential only".
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Requirement {
    permissions: Vec<Permission>,
    mode: MatchMode,
}

impl Requirement {
    pub fn new(permissions: impl IntoIterator<Item = Permission>, mode: MatchMode) -> Self {
        Self {
            permissions: permissions.into_iter().collect(),
            mode,
        }
    }

    pub fn all(permissions: impl IntoIterator<Item = Permission>) -> Self {
        Self::new(permissions, MatchMode::All)
    }

    pub fn any(permissions: impl IntoIterator<Item = Permission>) -> Self {
        Self::new(permissions, MatchMode::Any)
    }

    /// Authenticated caller, no specific permission.
    pub fn authenticated() -> Self {
        Self::default()
    }

    pub fn permissions(&self) -> &[Permission] {
        &self.permissions
    }

    pub fn mode(&self) -> MatchMode {
        self.mode
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("missing required permissions: {}", join(.missing))]
    MissingPermissions { missing: Vec<Permission> },

    #[error("requires any of: {}", join(.required))]
    NoneOfPermissions { required: Vec<Permission> },
}

impl AuthzError {
    /// Permissions the caller would need to be granted.
    pub fn missing(&self) -> &[Permission] {
        match self {
            AuthzError::MissingPermissions { missing } => missing,
            AuthzError::NoneOfPermissions { required } => required,
        }
    }
}

fn join(perms: &[Permission]) -> String {
    perms
        .iter()
        .map(Permission::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Evaluate a requirement against the permissions a caller holds.
///
/// - No IO
/// - No panics
/// - Missing permissions are reported sorted and de-duplicated
pub fn authorize(held: &BTreeSet<Permission>, requirement: &Requirement) -> Result<(), AuthzError> {
    let required: BTreeSet<&Permission> = requirement.permissions.iter().collect();
    if required.is_empty() {
        return Ok(());
    }

    match requirement.mode {
        MatchMode::All => {
            let missing: Vec<Permission> = required
                .into_iter()
                .filter(|p| !held.contains(*p))
                .cloned()
                .collect();
            if missing.is_empty() {
                Ok(())
            } else {
                Err(AuthzError::MissingPermissions { missing })
            }
        }
        MatchMode::Any => {
            if required.iter().any(|p| held.contains(*p)) {
                Ok(())
            } else {
                Err(AuthzError::NoneOfPermissions {
                    required: required.into_iter().cloned().collect(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::permissions::*;
    use proptest::prelude::*;

    fn held(perms: &[Permission]) -> BTreeSet<Permission> {
        perms.iter().cloned().collect()
    }

    #[test]
    fn empty_requirement_always_passes() {
        assert_eq!(authorize(&BTreeSet::new(), &Requirement::authenticated()), Ok(()));
        assert_eq!(authorize(&BTreeSet::new(), &Requirement::any(Vec::new())), Ok(()));
    }

    #[test]
    fn all_mode_reports_every_missing_permission() {
        let perms = held(&[READ_PRODUCT, CREATE_PRODUCT]);
        let req = Requirement::all([DELETE_PRODUCT, READ_PRODUCT, CREATE_USER]);

        let err = authorize(&perms, &req).unwrap_err();
        assert_eq!(err.missing(), &[CREATE_USER, DELETE_PRODUCT]);
        assert_eq!(
            err.to_string(),
            "missing required permissions: create_user, delete_product"
        );
    }

    #[test]
    fn any_mode_needs_one_match() {
        let perms = held(&[READ_USER]);
        assert_eq!(authorize(&perms, &Requirement::any([MANAGE_ROLES, READ_USER])), Ok(()));
        assert!(matches!(
            authorize(&perms, &Requirement::any([MANAGE_ROLES, DELETE_USER])),
            Err(AuthzError::NoneOfPermissions { .. })
        ));
    }

    #[test]
    fn default_mode_is_all() {
        assert_eq!(Requirement::default().mode(), MatchMode::All);
    }

    fn vocab() -> impl Strategy<Value = BTreeSet<Permission>> {
        proptest::sample::subsequence(
            DEFAULT_PERMISSIONS.iter().map(|(p, _)| p.clone()).collect::<Vec<_>>(),
            0..=DEFAULT_PERMISSIONS.len(),
        )
        .prop_map(|v| v.into_iter().collect())
    }

    proptest! {
        #[test]
        fn all_mode_missing_is_set_difference(held in vocab(), required in vocab()) {
            let req = Requirement::all(required.iter().cloned());
            let expected: Vec<Permission> = required.difference(&held).cloned().collect();

            match authorize(&held, &req) {
                Ok(()) => prop_assert!(expected.is_empty()),
                Err(e) => prop_assert_eq!(e.missing(), expected.as_slice()),
            }
        }

        #[test]
        fn any_mode_passes_iff_intersection(held in vocab(), required in vocab()) {
            let req = Requirement::any(required.iter().cloned());
            let intersects = required.intersection(&held).next().is_some();
            prop_assert_eq!(authorize(&held, &req).is_ok(), intersects || required.is_empty());
        }
    }
}
