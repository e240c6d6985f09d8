//! Products: the catalog entries sold by companies.

pub mod product;

pub use product::{Product, ProductDraft, ProductPatch};
