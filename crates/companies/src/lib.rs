//! Companies: the organisations products belong to.

pub mod company;

pub use company::{Company, CompanyDraft, CompanyPatch};
