//! `bazaar-auth`: authentication/authorization boundary.
//!
//! This crate is intentionally decoupled from HTTP and storage: the guard works
//! against the [`UserDirectory`] and [`PermissionCatalog`] seams and takes the
//! raw `Authorization` header value.

pub mod authorize;
pub mod cache;
pub mod catalog;
pub mod claims;
pub mod codec;
pub mod context;
pub mod directory;
pub mod guard;
pub mod password;
pub mod permissions;
pub mod roles;
pub mod user;

pub use authorize::{AuthzError, MatchMode, Requirement, authorize};
pub use cache::{CacheStats, PermissionCache, PermissionSet, TimeBucket};
pub use catalog::{CatalogError, PermissionCatalog};
pub use claims::{Claims, TokenValidationError, validate_claims};
pub use codec::{DecodeError, EncodeError, Hs256TokenCodec, TokenCodec};
pub use context::AuthContext;
pub use directory::{DirectoryError, UserDirectory};
pub use guard::{AuthorizationGuard, GuardError, parse_bearer};
pub use password::{Argon2Hasher, HashError, PasswordHasher};
pub use permissions::Permission;
pub use roles::{PermissionDefinition, Role, RoleDefinition};
pub use user::{NewUser, User, UserPatch, UserView};
