//! Errors raised by entities and repositories.

use thiserror::Error;

pub type DomainResult<T> = Result<T, DomainError>;

/// Failures caused by the caller's input, never by storage or transport.
///
/// The HTTP layer maps each variant to one status code.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Rejected field value (blank name, negative price, bad email).
    #[error("validation failed: {0}")]
    Validation(String),

    /// Path or body id that does not parse.
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// Lookup miss; carries the resource kind.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// A uniqueness constraint was violated.
    #[error("conflict: {0}")]
    Conflict(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn not_found(what: &'static str) -> Self {
        Self::NotFound(what)
    }
}

/// Reject blank strings for required text fields.
pub fn require_non_blank(field: &str, value: &str) -> DomainResult<()> {
    if value.trim().is_empty() {
        return Err(DomainError::validation(format!("{field} must not be empty")));
    }
    Ok(())
}
