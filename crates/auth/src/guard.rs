//! The authorization guard: bearer credential → identity → permissions → verdict.
//!
//! Transport-agnostic: callers hand in the raw `Authorization` header value and
//! the route's [`Requirement`], and get back either an [`AuthContext`] to attach
//! to the request or a [`GuardError`] to render as a rejection.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::authorize::{Requirement, authorize};
use crate::cache::{PermissionCache, TimeBucket};
use crate::catalog::PermissionCatalog;
use crate::codec::TokenCodec;
use crate::context::AuthContext;
use crate::directory::UserDirectory;
use crate::Permission;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GuardError {
    /// Missing/invalid/expired credential, or a subject that does not resolve.
    #[error("{0}")]
    Unauthenticated(String),

    /// Valid identity that lacks a role or the required permissions.
    #[error("{message}")]
    Forbidden {
        message: String,
        missing: Vec<Permission>,
    },

    /// A collaborator failed; details are logged, never returned.
    #[error("internal error")]
    Internal,
}

impl GuardError {
    fn unauthenticated(msg: impl Into<String>) -> Self {
        Self::Unauthenticated(msg.into())
    }

    pub fn kind(&self) -> &'static str {
        match self {
            GuardError::Unauthenticated(_) => "unauthenticated",
            GuardError::Forbidden { .. } => "forbidden",
            GuardError::Internal => "internal",
        }
    }
}

/// Extract the token from an `Authorization: Bearer <token>` header value.
pub fn parse_bearer(header: Option<&str>) -> Result<&str, GuardError> {
    let header = header.ok_or_else(|| GuardError::unauthenticated("missing bearer credential"))?;

    let (scheme, token) = header
        .trim()
        .split_once(' ')
        .ok_or_else(|| GuardError::unauthenticated("malformed authorization header"))?;

    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(GuardError::unauthenticated("unsupported authorization scheme"));
    }

    let token = token.trim();
    if token.is_empty() {
        return Err(GuardError::unauthenticated("malformed authorization header"));
    }

    Ok(token)
}

/// Shared, request-independent authorization state.
#[derive(Clone)]
pub struct AuthorizationGuard {
    codec: Arc<dyn TokenCodec>,
    directory: Arc<dyn UserDirectory>,
    catalog: Arc<dyn PermissionCatalog>,
    cache: Arc<PermissionCache>,
}

impl AuthorizationGuard {
    pub fn new(
        codec: Arc<dyn TokenCodec>,
        directory: Arc<dyn UserDirectory>,
        catalog: Arc<dyn PermissionCatalog>,
        cache: Arc<PermissionCache>,
    ) -> Self {
        Self {
            codec,
            directory,
            catalog,
            cache,
        }
    }

    pub fn cache(&self) -> &Arc<PermissionCache> {
        &self.cache
    }

    pub fn check(
        &self,
        authorization: Option<&str>,
        requirement: &Requirement,
    ) -> Result<AuthContext, GuardError> {
        self.check_at(authorization, requirement, Utc::now())
    }

    /// Run the full check against an explicit clock.
    ///
    /// Never mutates users or roles; may populate the permission cache.
    pub fn check_at(
        &self,
        authorization: Option<&str>,
        requirement: &Requirement,
        now: DateTime<Utc>,
    ) -> Result<AuthContext, GuardError> {
        let token = parse_bearer(authorization)?;

        let claims = self.codec.decode_at(token, now).map_err(|e| {
            tracing::debug!(error = %e, "rejected credential");
            GuardError::unauthenticated(format!("invalid token: {e}"))
        })?;

        let user = self
            .directory
            .find_by_email(&claims.sub)
            .map_err(|e| {
                tracing::error!(error = %e, "user directory lookup failed");
                GuardError::Internal
            })?
            .ok_or_else(|| GuardError::unauthenticated("user not found"))?;

        if !user.is_active {
            return Err(GuardError::unauthenticated("inactive user"));
        }

        let role = user.role.as_ref().ok_or_else(|| GuardError::Forbidden {
            message: "no role assigned".to_string(),
            missing: requirement.permissions().to_vec(),
        })?;

        let permissions = self
            .cache
            .get_or_load(user.id, role, TimeBucket::containing(now), || {
                self.catalog.permissions_for_role(role)
            })
            .map_err(|e| {
                tracing::error!(error = %e, user_id = %user.id, role = %role, "permission lookup failed");
                GuardError::Internal
            })?;

        authorize(&permissions, requirement).map_err(|e| {
            tracing::debug!(user_id = %user.id, error = %e, "authorization denied");
            GuardError::Forbidden {
                message: e.to_string(),
                missing: e.missing().to_vec(),
            }
        })?;

        Ok(AuthContext::new(user.id, user.email, permissions))
    }
}

impl core::fmt::Debug for AuthorizationGuard {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AuthorizationGuard")
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}
