//! User records owned by the user directory.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use bazaar_core::{DomainError, DomainResult, UserId, error::require_non_blank};

use crate::Role;

/// Canonical form of an email address (lookups are case-insensitive).
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn validate_email(email: &str) -> DomainResult<()> {
    require_non_blank("email", email)?;
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(()),
        _ => Err(DomainError::validation(format!("'{email}' is not a valid email address"))),
    }
}

/// A stored user (identity + credentials + role reference).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub username: String,
    pub hashed_password: String,
    pub is_active: bool,
    pub role: Option<Role>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Public projection (never exposes the password hash).
    pub fn view(&self) -> UserView {
        UserView {
            id: self.id,
            email: self.email.clone(),
            username: self.username.clone(),
            is_active: self.is_active,
            role: self.role.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

impl bazaar_core::Entity for User {
    type Id = UserId;

    fn id(&self) -> &UserId {
        &self.id
    }
}

/// Input for creating a user. The password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub username: String,
    pub hashed_password: String,
    pub role: Option<Role>,
}

impl NewUser {
    /// Validate and normalize (email lowercased, username trimmed).
    pub fn normalized(self) -> DomainResult<Self> {
        let email = normalize_email(&self.email);
        validate_email(&email)?;
        require_non_blank("username", &self.username)?;
        Ok(Self {
            email,
            username: self.username.trim().to_string(),
            ..self
        })
    }
}

/// Partial update of a user record.
#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub email: Option<String>,
    pub username: Option<String>,
    pub hashed_password: Option<String>,
    pub is_active: Option<bool>,
    /// `Some(None)` clears the role.
    pub role: Option<Option<Role>>,
}

impl UserPatch {
    pub fn assign_role(role: Option<Role>) -> Self {
        Self {
            role: Some(role),
            ..Default::default()
        }
    }

    /// Apply to a copy of `user`; the original is untouched on error.
    pub fn apply_to(self, user: &User, now: DateTime<Utc>) -> DomainResult<User> {
        let mut next = user.clone();
        if let Some(email) = self.email {
            let email = normalize_email(&email);
            validate_email(&email)?;
            next.email = email;
        }
        if let Some(username) = self.username {
            require_non_blank("username", &username)?;
            next.username = username.trim().to_string();
        }
        if let Some(hash) = self.hashed_password {
            next.hashed_password = hash;
        }
        if let Some(active) = self.is_active {
            next.is_active = active;
        }
        if let Some(role) = self.role {
            next.role = role;
        }
        next.updated_at = now;
        Ok(next)
    }
}

/// Serializable user representation for API responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserView {
    pub id: UserId,
    pub email: String,
    pub username: String,
    pub is_active: bool,
    pub role: Option<Role>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
