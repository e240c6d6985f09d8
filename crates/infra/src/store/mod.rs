//! In-memory storage backends for users, the permission catalog and CRUD resources.

pub mod catalog;
pub mod repository;
pub mod users;

pub use catalog::InMemoryCatalog;
pub use repository::{InMemoryRepository, Repository};
pub use users::InMemoryUserDirectory;
