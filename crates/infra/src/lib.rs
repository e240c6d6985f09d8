//! Infrastructure layer: storage backends behind the auth and resource seams.

pub mod store;

pub use store::{InMemoryCatalog, InMemoryRepository, InMemoryUserDirectory, Repository};
