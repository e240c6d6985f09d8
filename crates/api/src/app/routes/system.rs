use axum::{
    Json,
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
};

use bazaar_auth::AuthContext;

use crate::app::dto::WhoAmI;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

pub async fn whoami(Extension(ctx): Extension<AuthContext>) -> impl IntoResponse {
    Json(WhoAmI::from(&ctx))
}
