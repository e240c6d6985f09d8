//! `bazaar-api`: HTTP surface: JSON CRUD endpoints behind the authorization guard.

pub mod app;
pub mod config;
pub mod middleware;
