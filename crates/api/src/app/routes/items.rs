use std::sync::Arc;

use axum::{
    Extension, Json, Router,
    extract::{Query, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
};

use bazaar_auth::permissions::{CREATE_PRODUCT, DELETE_PRODUCT, READ_PRODUCT, UPDATE_PRODUCT};
use bazaar_auth::{AuthorizationGuard, Requirement};
use bazaar_core::{DomainError, ItemId, ProductId, Resource};
use bazaar_items::{Item, ItemDraft};
use bazaar_products::Product;

use crate::app::routes::crud;
use crate::app::services::Repo;
use crate::app::{dto, errors};
use crate::middleware::Guarded;

pub fn router(guard: &Arc<AuthorizationGuard>, repo: Repo<Item>, products: Repo<Product>) -> Router {
    Router::new()
        .route(
            "/",
            get(list_items)
                .require(guard, Requirement::all([READ_PRODUCT]))
                .merge(post(create_item).require(guard, Requirement::all([CREATE_PRODUCT]))),
        )
        .route(
            "/batch",
            post(create_items_batch).require(guard, Requirement::all([CREATE_PRODUCT])),
        )
        .route(
            "/:id",
            get(crud::get_one::<Item>)
                .require(guard, Requirement::all([READ_PRODUCT]))
                .merge(put(crud::update::<Item>).require(guard, Requirement::all([UPDATE_PRODUCT])))
                .merge(delete(crud::delete::<Item>).require(guard, Requirement::all([DELETE_PRODUCT]))),
        )
        .layer(Extension(repo))
        .layer(Extension(products))
}

fn ensure_product(products: &Repo<Product>, id: &ProductId) -> Result<(), Response> {
    match products.get(id) {
        Some(_) => Ok(()),
        None => Err(errors::not_found(Product::KIND)),
    }
}

pub async fn list_items(
    Extension(repo): Extension<Repo<Item>>,
    Extension(products): Extension<Repo<Product>>,
    Query(query): Query<dto::ItemListQuery>,
) -> Response {
    let items = match query.product_id.as_deref() {
        None => repo.list(query.page()),
        Some(raw) => {
            let product_id: ProductId = match errors::parse_id(raw) {
                Ok(v) => v,
                Err(res) => return res,
            };
            if let Err(res) = ensure_product(&products, &product_id) {
                return res;
            }
            repo.list_where(query.page(), &|item: &Item| item.product_id == product_id)
        }
    };
    (StatusCode::OK, Json(items)).into_response()
}

/// Items can only be attached to an existing product.
pub async fn create_item(
    Extension(repo): Extension<Repo<Item>>,
    Extension(products): Extension<Repo<Product>>,
    body: Result<Json<ItemDraft>, JsonRejection>,
) -> Response {
    let draft = match errors::json_body(body) {
        Ok(v) => v,
        Err(res) => return res,
    };
    if let Err(res) = ensure_product(&products, &draft.product_id) {
        return res;
    }
    crud::created(repo.create(draft))
}

/// Create several items for one product; nothing is stored if any entry is invalid.
pub async fn create_items_batch(
    Extension(repo): Extension<Repo<Item>>,
    Extension(products): Extension<Repo<Product>>,
    body: Result<Json<dto::BatchItemsRequest>, JsonRejection>,
) -> Response {
    let body = match errors::json_body(body) {
        Ok(v) => v,
        Err(res) => return res,
    };
    let product_id: ProductId = match errors::parse_id(&body.product_id) {
        Ok(v) => v,
        Err(res) => return res,
    };
    if let Err(res) = ensure_product(&products, &product_id) {
        return res;
    }
    if body.items.is_empty() {
        return errors::domain_error_to_response(DomainError::validation("items must not be empty"));
    }

    let drafts: Vec<ItemDraft> = body
        .items
        .into_iter()
        .map(|keys| ItemDraft {
            product_id,
            key: keys.key,
            box_key: keys.box_key,
        })
        .collect();

    // Validate everything up front so a bad entry doesn't leave a partial batch behind.
    let now = chrono::Utc::now();
    for draft in &drafts {
        if let Err(e) = Item::create(ItemId::new(), draft.clone(), now) {
            return errors::domain_error_to_response(e);
        }
    }

    let mut created = Vec::with_capacity(drafts.len());
    for draft in drafts {
        match repo.create(draft) {
            Ok(item) => created.push(item),
            Err(e) => return errors::domain_error_to_response(e),
        }
    }
    (StatusCode::CREATED, Json(created)).into_response()
}
