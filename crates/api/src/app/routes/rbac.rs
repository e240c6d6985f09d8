//! Role and permission management, plus permission-cache visibility.

use std::sync::Arc;

use axum::{
    Extension, Json, Router,
    extract::{Path, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};

use bazaar_auth::permissions::{MANAGE_ROLES, READ_USER};
use bazaar_auth::{AuthorizationGuard, Permission, Requirement, Role};

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::middleware::Guarded;

pub fn router(guard: &Arc<AuthorizationGuard>) -> Router {
    let inspect = || Requirement::any([MANAGE_ROLES, READ_USER]);
    let manage = || Requirement::all([MANAGE_ROLES]);

    Router::new()
        .route(
            "/roles",
            get(list_roles)
                .require(guard, inspect())
                .merge(post(create_role).require(guard, manage())),
        )
        .route(
            "/roles/:name/permissions",
            post(grant_permission).require(guard, manage()),
        )
        .route(
            "/permissions",
            get(list_permissions)
                .require(guard, inspect())
                .merge(post(create_permission).require(guard, manage())),
        )
        .route("/admin/cache", get(cache_stats).require(guard, manage()))
}

/// GET /roles - every role with its granted permissions
pub async fn list_roles(Extension(services): Extension<Arc<AppServices>>) -> Response {
    match services.catalog.list_roles() {
        Ok(roles) => (StatusCode::OK, Json(roles)).into_response(),
        Err(e) => errors::catalog_error_to_response(e),
    }
}

/// POST /roles - create an empty role
pub async fn create_role(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::CreateRoleRequest>, JsonRejection>,
) -> Response {
    let body = match errors::json_body(body) {
        Ok(v) => v,
        Err(res) => return res,
    };
    if let Err(res) = non_blank("name", &body.name) {
        return res;
    }
    match services.catalog.create_role(Role::new(body.name.trim().to_string()), &body.description) {
        Ok(role) => (StatusCode::CREATED, Json(role)).into_response(),
        Err(e) => errors::catalog_error_to_response(e),
    }
}

/// GET /permissions - the permission vocabulary
pub async fn list_permissions(Extension(services): Extension<Arc<AppServices>>) -> Response {
    match services.catalog.list_permissions() {
        Ok(perms) => (StatusCode::OK, Json(perms)).into_response(),
        Err(e) => errors::catalog_error_to_response(e),
    }
}

/// POST /permissions - add a permission to the vocabulary
pub async fn create_permission(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::CreatePermissionRequest>, JsonRejection>,
) -> Response {
    let body = match errors::json_body(body) {
        Ok(v) => v,
        Err(res) => return res,
    };
    if let Err(res) = non_blank("name", &body.name) {
        return res;
    }
    let permission = Permission::new(body.name.trim().to_string());
    match services.catalog.create_permission(permission, &body.description) {
        Ok(def) => (StatusCode::CREATED, Json(def)).into_response(),
        Err(e) => errors::catalog_error_to_response(e),
    }
}

/// POST /roles/:name/permissions - grant a permission to a role
///
/// Any number of users may hold the role, so the whole cache is dropped.
pub async fn grant_permission(
    Extension(services): Extension<Arc<AppServices>>,
    Path(name): Path<String>,
    body: Result<Json<dto::GrantPermissionRequest>, JsonRejection>,
) -> Response {
    let body = match errors::json_body(body) {
        Ok(v) => v,
        Err(res) => return res,
    };
    let role = Role::new(name);
    let permission = Permission::new(body.permission);

    match services.catalog.grant(&role, &permission) {
        Ok(def) => {
            services.cache().clear();
            tracing::info!(role = %role, permission = %permission, "permission granted");
            (StatusCode::OK, Json(def)).into_response()
        }
        Err(e) => errors::catalog_error_to_response(e),
    }
}

/// GET /admin/cache - permission cache counters
pub async fn cache_stats(Extension(services): Extension<Arc<AppServices>>) -> Response {
    (StatusCode::OK, Json(services.cache().stats())).into_response()
}

fn non_blank(field: &str, value: &str) -> Result<(), Response> {
    bazaar_core::error::require_non_blank(field, value).map_err(errors::domain_error_to_response)
}
