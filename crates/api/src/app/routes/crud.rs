//! Generic CRUD handlers over a [`Repository`](bazaar_infra::Repository).
//!
//! Each resource router installs its repository as an `Extension<Repo<E>>` and
//! mounts these handlers with the concrete entity type.

use axum::{
    Json,
    extract::{Extension, Path, Query, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Serialize, de::DeserializeOwned};

use bazaar_core::{DomainError, Page, Resource};

use crate::app::errors;
use crate::app::services::Repo;

pub async fn list<E>(Extension(repo): Extension<Repo<E>>, Query(page): Query<Page>) -> Response
where
    E: Resource + Serialize,
{
    (StatusCode::OK, Json(repo.list(page))).into_response()
}

pub async fn get_one<E>(Extension(repo): Extension<Repo<E>>, Path(id): Path<String>) -> Response
where
    E: Resource + Serialize,
    E::Id: core::str::FromStr<Err = DomainError>,
{
    let id: E::Id = match errors::parse_id(&id) {
        Ok(v) => v,
        Err(res) => return res,
    };
    match repo.get(&id) {
        Some(entity) => (StatusCode::OK, Json(entity)).into_response(),
        None => errors::not_found(E::KIND),
    }
}

pub async fn create<E>(
    Extension(repo): Extension<Repo<E>>,
    body: Result<Json<E::Draft>, JsonRejection>,
) -> Response
where
    E: Resource + Serialize,
    E::Draft: DeserializeOwned,
{
    let draft = match errors::json_body(body) {
        Ok(v) => v,
        Err(res) => return res,
    };
    created(repo.create(draft))
}

pub async fn update<E>(
    Extension(repo): Extension<Repo<E>>,
    Path(id): Path<String>,
    body: Result<Json<E::Patch>, JsonRejection>,
) -> Response
where
    E: Resource + Serialize,
    E::Id: core::str::FromStr<Err = DomainError>,
    E::Patch: DeserializeOwned,
{
    let id: E::Id = match errors::parse_id(&id) {
        Ok(v) => v,
        Err(res) => return res,
    };
    let patch = match errors::json_body(body) {
        Ok(v) => v,
        Err(res) => return res,
    };
    match repo.update(&id, patch) {
        Ok(Some(entity)) => (StatusCode::OK, Json(entity)).into_response(),
        Ok(None) => errors::not_found(E::KIND),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn delete<E>(Extension(repo): Extension<Repo<E>>, Path(id): Path<String>) -> Response
where
    E: Resource,
    E::Id: core::str::FromStr<Err = DomainError>,
{
    let id: E::Id = match errors::parse_id(&id) {
        Ok(v) => v,
        Err(res) => return res,
    };
    if repo.delete(&id) {
        StatusCode::NO_CONTENT.into_response()
    } else {
        errors::not_found(E::KIND)
    }
}

/// 201 with the stored entity, or the mapped domain error.
pub fn created<E: Serialize>(result: bazaar_core::DomainResult<E>) -> Response {
    match result {
        Ok(entity) => (StatusCode::CREATED, Json(entity)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}
