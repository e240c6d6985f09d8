//! Entity traits: identity + continuity across state changes.

use crate::error::DomainResult;
use crate::id::GeneratedId;

/// Entity marker + minimal interface.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}

/// A CRUD-managed entity.
///
/// Every resource exposed over the API (companies, products, items) goes
/// through the same create/get/list/update/delete lifecycle. The draft and
/// patch types carry the caller-supplied fields; validation lives here so
/// every storage backend enforces the same rules.
pub trait Resource: Entity<Id: GeneratedId> + Clone + Send + Sync + 'static {
    /// Fields supplied on creation.
    type Draft: Send;

    /// Partial update; `None` fields are left untouched.
    type Patch: Send;

    /// Human-readable resource name used in errors ("product", "company").
    const KIND: &'static str;

    /// Build a new entity from a validated draft.
    fn create(id: Self::Id, draft: Self::Draft, now: chrono::DateTime<chrono::Utc>) -> DomainResult<Self>;

    /// Apply a patch in place. Must leave `self` untouched on error.
    fn apply(&mut self, patch: Self::Patch, now: chrono::DateTime<chrono::Utc>) -> DomainResult<()>;
}
