//! `bazaar-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod entity;
pub mod error;
pub mod id;
pub mod page;

pub use entity::{Entity, Resource};
pub use error::{DomainError, DomainResult};
pub use id::{CompanyId, GeneratedId, ItemId, ProductId, UserId};
pub use page::Page;
