use std::sync::Arc;

use axum::{
    Extension, Router,
    routing::{delete, get, post, put},
};

use bazaar_auth::permissions::{CREATE_PRODUCT, DELETE_PRODUCT, READ_PRODUCT, UPDATE_PRODUCT};
use bazaar_auth::{AuthorizationGuard, Requirement};
use bazaar_companies::Company;

use crate::app::routes::crud;
use crate::app::services::Repo;
use crate::middleware::Guarded;

pub fn router(guard: &Arc<AuthorizationGuard>, repo: Repo<Company>) -> Router {
    Router::new()
        .route(
            "/",
            get(crud::list::<Company>)
                .require(guard, Requirement::all([READ_PRODUCT]))
                .merge(post(crud::create::<Company>).require(guard, Requirement::all([CREATE_PRODUCT]))),
        )
        .route(
            "/:id",
            get(crud::get_one::<Company>)
                .require(guard, Requirement::all([READ_PRODUCT]))
                .merge(put(crud::update::<Company>).require(guard, Requirement::all([UPDATE_PRODUCT])))
                .merge(delete(crud::delete::<Company>).require(guard, Requirement::all([DELETE_PRODUCT]))),
        )
        .layer(Extension(repo))
}
