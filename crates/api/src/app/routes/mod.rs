use std::sync::Arc;

use axum::{Router, routing::get};

use bazaar_auth::Requirement;

use crate::app::services::AppServices;
use crate::middleware::Guarded;

pub mod auth;
pub mod companies;
pub mod crud;
pub mod items;
pub mod products;
pub mod rbac;
pub mod system;
pub mod users;

/// Router for every endpoint behind the authorization guard.
///
/// Requirements are attached per method, so an unsupported method still
/// answers 405 without touching the guard.
pub fn router(services: &Arc<AppServices>) -> Router {
    let guard = &services.guard;

    Router::new()
        .route(
            "/whoami",
            get(system::whoami).require(guard, Requirement::authenticated()),
        )
        .nest("/users", users::router(guard))
        .nest("/companies", companies::router(guard, services.companies.clone()))
        .nest("/products", products::router(guard, services.products.clone()))
        .nest(
            "/items",
            items::router(guard, services.items.clone(), services.products.clone()),
        )
        .merge(rbac::router(guard))
}
