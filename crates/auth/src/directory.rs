//! User directory seam: resolves identities by email.

use thiserror::Error;

use bazaar_core::{DomainError, Page, UserId};

use crate::user::{NewUser, User, UserPatch};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DirectoryError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// The backing store failed (connection, corruption, ...).
    #[error("user directory unavailable: {0}")]
    Unavailable(String),
}

/// User storage as seen by the authorization guard and the user handlers.
///
/// Lookups are synchronous and expected to be bounded; implementations must be
/// safe to share across concurrent requests.
pub trait UserDirectory: Send + Sync {
    /// Find a user by email (case-insensitive).
    fn find_by_email(&self, email: &str) -> Result<Option<User>, DirectoryError>;

    fn find_by_id(&self, id: UserId) -> Result<Option<User>, DirectoryError>;

    /// Insert a user. Fails with a conflict if the email or username is taken.
    fn create(&self, user: NewUser) -> Result<User, DirectoryError>;

    /// Returns `None` when the user does not exist.
    fn update(&self, id: UserId, patch: UserPatch) -> Result<Option<User>, DirectoryError>;

    fn delete(&self, id: UserId) -> Result<bool, DirectoryError>;

    /// Users in creation order.
    fn list(&self, page: Page) -> Result<Vec<User>, DirectoryError>;
}
