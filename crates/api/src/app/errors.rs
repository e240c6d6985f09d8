//! Consistent JSON error responses: `{"kind": ..., "message": ...}`.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde_json::json;

use bazaar_auth::{CatalogError, DirectoryError, GuardError};
use bazaar_core::DomainError;

pub fn json_error(status: StatusCode, kind: &'static str, message: impl Into<String>) -> Response {
    (
        status,
        Json(json!({
            "kind": kind,
            "message": message.into(),
        })),
    )
        .into_response()
}

/// 401 with the `WWW-Authenticate: Bearer` challenge.
pub fn unauthorized(message: impl Into<String>) -> Response {
    let mut res = json_error(StatusCode::UNAUTHORIZED, "unauthenticated", message);
    res.headers_mut()
        .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
    res
}

/// Log the real cause and answer with a generic 500.
pub fn internal(err: &dyn std::fmt::Display) -> Response {
    tracing::error!(error = %err, "request failed");
    json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal", "internal error")
}

pub fn not_found(what: &str) -> Response {
    json_error(StatusCode::NOT_FOUND, "not_found", format!("{what} not found"))
}

pub fn guard_error_to_response(err: &GuardError) -> Response {
    match err {
        GuardError::Unauthenticated(msg) => unauthorized(msg.clone()),
        GuardError::Forbidden { message, missing } => (
            StatusCode::FORBIDDEN,
            Json(json!({
                "kind": err.kind(),
                "message": message,
                "missing": missing,
            })),
        )
            .into_response(),
        GuardError::Internal => {
            json_error(StatusCode::INTERNAL_SERVER_ERROR, err.kind(), "internal error")
        }
    }
}

pub fn domain_error_to_response(err: DomainError) -> Response {
    match err {
        DomainError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, "validation_error", msg),
        DomainError::InvalidId(msg) => json_error(StatusCode::BAD_REQUEST, "invalid_id", msg),
        DomainError::NotFound(what) => not_found(what),
        DomainError::Conflict(msg) => json_error(StatusCode::CONFLICT, "conflict", msg),
    }
}

pub fn directory_error_to_response(err: DirectoryError) -> Response {
    match err {
        DirectoryError::Domain(e) => domain_error_to_response(e),
        DirectoryError::Unavailable(_) => internal(&err),
    }
}

pub fn catalog_error_to_response(err: CatalogError) -> Response {
    match err {
        CatalogError::UnknownRole(_) | CatalogError::UnknownPermission(_) => {
            json_error(StatusCode::NOT_FOUND, "not_found", err.to_string())
        }
        CatalogError::Conflict(msg) => json_error(StatusCode::CONFLICT, "conflict", msg),
        CatalogError::Unavailable(_) => internal(&err),
    }
}

/// Unwrap a JSON body, turning extractor rejections into 400s in our error shape.
pub fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, Response> {
    body.map(|Json(v)| v)
        .map_err(|rejection| json_error(StatusCode::BAD_REQUEST, "invalid_body", rejection.body_text()))
}

/// Parse a path id, answering 400 when it is not a valid identifier.
pub fn parse_id<I>(raw: &str) -> Result<I, Response>
where
    I: core::str::FromStr<Err = DomainError>,
{
    raw.parse().map_err(domain_error_to_response)
}

#[cfg(test)]
mod tests {
    use super::*;

    use bazaar_auth::Permission;
    use bazaar_auth::permissions::DELETE_PRODUCT;

    #[test]
    fn unauthenticated_carries_bearer_challenge() {
        let res = guard_error_to_response(&GuardError::Unauthenticated("nope".into()));
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(res.headers()[header::WWW_AUTHENTICATE], "Bearer");
    }

    #[test]
    fn guard_errors_map_to_statuses() {
        let forbidden = GuardError::Forbidden {
            message: "missing permissions: delete_product".into(),
            missing: vec![DELETE_PRODUCT],
        };
        assert_eq!(guard_error_to_response(&forbidden).status(), StatusCode::FORBIDDEN);
        assert_eq!(
            guard_error_to_response(&GuardError::Internal).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn domain_errors_map_to_statuses() {
        let cases = [
            (DomainError::validation("x"), StatusCode::BAD_REQUEST),
            (DomainError::invalid_id("x"), StatusCode::BAD_REQUEST),
            (DomainError::not_found("product"), StatusCode::NOT_FOUND),
            (DomainError::conflict("x"), StatusCode::CONFLICT),
        ];
        for (err, status) in cases {
            assert_eq!(domain_error_to_response(err).status(), status);
        }
    }

    #[test]
    fn catalog_lookups_are_not_found_and_outages_are_internal() {
        let unknown = CatalogError::UnknownPermission(Permission::new("fly").to_string());
        assert_eq!(catalog_error_to_response(unknown).status(), StatusCode::NOT_FOUND);

        let down = CatalogError::Unavailable("db gone".into());
        assert_eq!(catalog_error_to_response(down).status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
