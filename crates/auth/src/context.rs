use bazaar_core::UserId;

use crate::Permission;
use crate::cache::PermissionSet;

/// Authorization result attached to a request once the guard lets it through.
///
/// Handlers read the caller's identity and permissions from here; nothing else
/// about the request is coupled to authorization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    user_id: UserId,
    email: String,
    permissions: PermissionSet,
}

impl AuthContext {
    pub fn new(user_id: UserId, email: impl Into<String>, permissions: PermissionSet) -> Self {
        Self {
            user_id,
            email: email.into(),
            permissions,
        }
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn permissions(&self) -> &PermissionSet {
        &self.permissions
    }

    pub fn has(&self, permission: &Permission) -> bool {
        self.permissions.contains(permission)
    }
}
