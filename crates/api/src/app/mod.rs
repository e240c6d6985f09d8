//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: storage backends, token codec, password hasher, guard
//! - `routes/`: HTTP routes + handlers (one file per resource)
//! - `dto.rs`: request/response DTOs
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{Extension, Router, routing::get};
use tower::ServiceBuilder;

use crate::config::Settings;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs` and the black-box tests).
pub fn build_app(settings: &Settings) -> anyhow::Result<Router> {
    let services = Arc::new(services::AppServices::in_memory(settings)?);

    if let Some(admin) = &settings.bootstrap_admin {
        services.ensure_admin(admin)?;
    }

    Ok(Router::new()
        .route("/health", get(routes::system::health))
        .nest("/auth", routes::auth::router())
        .merge(routes::router(&services))
        .layer(ServiceBuilder::new().layer(Extension(services))))
}
