use std::sync::Arc;

use axum::{
    Extension, Json, Router,
    extract::{Path, Query, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
};

use bazaar_auth::permissions::{CREATE_USER, DELETE_USER, MANAGE_ROLES, READ_USER, UPDATE_USER};
use bazaar_auth::{
    AuthorizationGuard, CatalogError, NewUser, Requirement, Role, UserPatch, UserView, roles,
};
use bazaar_core::{DomainError, Page, UserId};

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::middleware::Guarded;

pub fn router(guard: &Arc<AuthorizationGuard>) -> Router {
    Router::new()
        .route(
            "/",
            get(list_users)
                .require(guard, Requirement::all([READ_USER]))
                .merge(post(create_user).require(guard, Requirement::all([CREATE_USER]))),
        )
        .route(
            "/:id",
            get(get_user)
                .require(guard, Requirement::all([READ_USER]))
                .merge(put(update_user).require(guard, Requirement::all([UPDATE_USER])))
                .merge(delete(delete_user).require(guard, Requirement::all([DELETE_USER]))),
        )
        .route(
            "/:id/role",
            put(assign_role).require(guard, Requirement::all([MANAGE_ROLES])),
        )
}

async fn hash_password(services: &AppServices, password: String) -> Result<String, Response> {
    if password.is_empty() {
        return Err(errors::domain_error_to_response(DomainError::validation(
            "password must not be empty",
        )));
    }
    services.hash_password(password).await.map_err(|e| errors::internal(&e))
}

/// Resolve a role name against the catalog.
fn known_role(services: &AppServices, name: &str) -> Result<Role, Response> {
    match services.catalog.role_by_name(name) {
        Ok(Some(def)) => Ok(def.name),
        Ok(None) => Err(errors::catalog_error_to_response(CatalogError::UnknownRole(
            name.to_string(),
        ))),
        Err(e) => Err(errors::catalog_error_to_response(e)),
    }
}

fn user_view(services: &AppServices, id: UserId) -> Result<UserView, Response> {
    match services.directory.find_by_id(id) {
        Ok(Some(user)) => Ok(user.view()),
        Ok(None) => Err(errors::not_found("user")),
        Err(e) => Err(errors::directory_error_to_response(e)),
    }
}

pub async fn list_users(
    Extension(services): Extension<Arc<AppServices>>,
    Query(page): Query<Page>,
) -> Response {
    match services.directory.list(page) {
        Ok(users) => {
            let views: Vec<UserView> = users.iter().map(|u| u.view()).collect();
            (StatusCode::OK, Json(views)).into_response()
        }
        Err(e) => errors::directory_error_to_response(e),
    }
}

pub async fn get_user(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Response {
    let id: UserId = match errors::parse_id(&id) {
        Ok(v) => v,
        Err(res) => return res,
    };
    match user_view(&services, id) {
        Ok(view) => (StatusCode::OK, Json(view)).into_response(),
        Err(res) => res,
    }
}

pub async fn create_user(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::CreateUserRequest>, JsonRejection>,
) -> Response {
    let body = match errors::json_body(body) {
        Ok(v) => v,
        Err(res) => return res,
    };
    let role = match body.role.as_deref() {
        Some(name) => match known_role(&services, name) {
            Ok(role) => role,
            Err(res) => return res,
        },
        None => roles::DEFAULT_SIGNUP_ROLE,
    };
    let hashed_password = match hash_password(&services, body.password).await {
        Ok(v) => v,
        Err(res) => return res,
    };

    let created = services.directory.create(NewUser {
        email: body.email,
        username: body.username,
        hashed_password,
        role: Some(role),
    });
    match created {
        Ok(user) => (StatusCode::CREATED, Json(user.view())).into_response(),
        Err(e) => errors::directory_error_to_response(e),
    }
}

pub async fn update_user(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    body: Result<Json<dto::UpdateUserRequest>, JsonRejection>,
) -> Response {
    let id: UserId = match errors::parse_id(&id) {
        Ok(v) => v,
        Err(res) => return res,
    };
    let body = match errors::json_body(body) {
        Ok(v) => v,
        Err(res) => return res,
    };
    let hashed_password = match body.password {
        Some(password) => match hash_password(&services, password).await {
            Ok(hash) => Some(hash),
            Err(res) => return res,
        },
        None => None,
    };

    let patch = UserPatch {
        email: body.email,
        username: body.username,
        hashed_password,
        is_active: body.is_active,
        role: None,
    };
    match services.directory.update(id, patch) {
        Ok(Some(user)) => (StatusCode::OK, Json(user.view())).into_response(),
        Ok(None) => errors::not_found("user"),
        Err(e) => errors::directory_error_to_response(e),
    }
}

pub async fn delete_user(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Response {
    let id: UserId = match errors::parse_id(&id) {
        Ok(v) => v,
        Err(res) => return res,
    };
    match services.directory.delete(id) {
        Ok(true) => {
            services.cache().invalidate(id);
            StatusCode::NO_CONTENT.into_response()
        }
        Ok(false) => errors::not_found("user"),
        Err(e) => errors::directory_error_to_response(e),
    }
}

/// Assign (or clear) a user's role. Cached permissions for that user are dropped
/// so the change applies to the very next request.
pub async fn assign_role(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    body: Result<Json<dto::AssignRoleRequest>, JsonRejection>,
) -> Response {
    let id: UserId = match errors::parse_id(&id) {
        Ok(v) => v,
        Err(res) => return res,
    };
    let body = match errors::json_body(body) {
        Ok(v) => v,
        Err(res) => return res,
    };
    let role = match body.role.as_deref().map(|name| known_role(&services, name)) {
        Some(Ok(role)) => Some(role),
        Some(Err(res)) => return res,
        None => None,
    };

    match services.directory.update(id, UserPatch::assign_role(role)) {
        Ok(Some(user)) => {
            let dropped = services.cache().invalidate(id);
            tracing::info!(user_id = %id, role = ?user.role, dropped, "role assigned");
            (StatusCode::OK, Json(user.view())).into_response()
        }
        Ok(None) => errors::not_found("user"),
        Err(e) => errors::directory_error_to_response(e),
    }
}
