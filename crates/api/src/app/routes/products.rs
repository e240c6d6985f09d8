use std::sync::Arc;

use axum::{
    Extension, Json, Router,
    extract::rejection::JsonRejection,
    response::Response,
    routing::{delete, get, post, put},
};

use bazaar_auth::permissions::{CREATE_PRODUCT, DELETE_PRODUCT, READ_PRODUCT, UPDATE_PRODUCT};
use bazaar_auth::{AuthContext, AuthorizationGuard, Requirement};
use bazaar_products::{Product, ProductDraft};

use crate::app::errors;
use crate::app::routes::crud;
use crate::app::services::Repo;
use crate::middleware::Guarded;

pub fn router(guard: &Arc<AuthorizationGuard>, repo: Repo<Product>) -> Router {
    Router::new()
        .route(
            "/",
            get(crud::list::<Product>)
                .require(guard, Requirement::all([READ_PRODUCT]))
                .merge(post(create_product).require(guard, Requirement::all([CREATE_PRODUCT]))),
        )
        .route(
            "/:id",
            get(crud::get_one::<Product>)
                .require(guard, Requirement::all([READ_PRODUCT]))
                .merge(put(crud::update::<Product>).require(guard, Requirement::all([UPDATE_PRODUCT])))
                .merge(delete(crud::delete::<Product>).require(guard, Requirement::all([DELETE_PRODUCT]))),
        )
        .layer(Extension(repo))
}

/// Like the generic create, but stamps the caller as `created_by`.
pub async fn create_product(
    Extension(repo): Extension<Repo<Product>>,
    Extension(ctx): Extension<AuthContext>,
    body: Result<Json<ProductDraft>, JsonRejection>,
) -> Response {
    let mut draft = match errors::json_body(body) {
        Ok(v) => v,
        Err(res) => return res,
    };
    draft.created_by = Some(ctx.user_id());

    crud::created(repo.create(draft))
}
