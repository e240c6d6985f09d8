//! Public registration and login; both answer with a bearer token.

use std::sync::Arc;

use axum::{
    Extension, Json, Router,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};

use bazaar_auth::{NewUser, roles};
use bazaar_core::DomainError;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}

pub async fn register(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::RegisterRequest>, JsonRejection>,
) -> Response {
    let body = match errors::json_body(body) {
        Ok(v) => v,
        Err(res) => return res,
    };
    if body.password.is_empty() {
        return errors::domain_error_to_response(DomainError::validation("password must not be empty"));
    }
    let hashed_password = match services.hash_password(body.password).await {
        Ok(v) => v,
        Err(e) => return errors::internal(&e),
    };

    let user = match services.directory.create(NewUser {
        email: body.email,
        username: body.username,
        hashed_password,
        role: Some(roles::DEFAULT_SIGNUP_ROLE),
    }) {
        Ok(u) => u,
        Err(e) => return errors::directory_error_to_response(e),
    };
    tracing::info!(user_id = %user.id, "user registered");

    match services.issue_token(&user.email) {
        Ok(token) => (StatusCode::CREATED, Json(token)).into_response(),
        Err(e) => errors::internal(&e),
    }
}

pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::LoginRequest>, JsonRejection>,
) -> Response {
    let body = match errors::json_body(body) {
        Ok(v) => v,
        Err(res) => return res,
    };
    let user = match services.directory.find_by_email(&body.email) {
        Ok(Some(u)) => u,
        Ok(None) => return errors::unauthorized("incorrect email or password"),
        Err(e) => return errors::directory_error_to_response(e),
    };
    let verified = match services
        .verify_password(body.password, user.hashed_password.clone())
        .await
    {
        Ok(v) => v,
        Err(e) => return errors::internal(&e),
    };
    if !verified {
        tracing::debug!(user_id = %user.id, "login rejected");
        return errors::unauthorized("incorrect email or password");
    }
    if !user.is_active {
        return errors::unauthorized("inactive user");
    }

    match services.issue_token(&user.email) {
        Ok(token) => (StatusCode::OK, Json(token)).into_response(),
        Err(e) => errors::internal(&e),
    }
}
