use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{Request, header},
    middleware::Next,
    response::Response,
    routing::MethodRouter,
};

use bazaar_auth::{AuthorizationGuard, Requirement};

use crate::app::errors;

/// Per-route authorization state: the shared guard plus this route's requirement.
#[derive(Clone)]
pub struct RouteGuard {
    pub guard: Arc<AuthorizationGuard>,
    pub requirement: Arc<Requirement>,
}

impl RouteGuard {
    pub fn new(guard: Arc<AuthorizationGuard>, requirement: Requirement) -> Self {
        Self {
            guard,
            requirement: Arc::new(requirement),
        }
    }
}

/// Run the guard; on success attach the `AuthContext` and call the handler unchanged.
pub async fn authorize(
    State(route): State<RouteGuard>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    // A header that is not valid UTF-8 is treated as present but malformed.
    let authorization = req
        .headers()
        .get(header::AUTHORIZATION)
        .map(|v| v.to_str().unwrap_or(""));

    let verdict = route.guard.check(authorization, &route.requirement);

    match verdict {
        Ok(ctx) => {
            req.extensions_mut().insert(ctx);
            next.run(req).await
        }
        Err(err) => {
            tracing::debug!(
                kind = err.kind(),
                error = %err,
                method = %req.method(),
                path = %req.uri().path(),
                "request rejected"
            );
            errors::guard_error_to_response(&err)
        }
    }
}

/// Declare a route's permission requirement next to its handler.
pub trait Guarded {
    fn require(self, guard: &Arc<AuthorizationGuard>, requirement: Requirement) -> Self;
}

impl Guarded for MethodRouter {
    fn require(self, guard: &Arc<AuthorizationGuard>, requirement: Requirement) -> Self {
        self.route_layer(axum::middleware::from_fn_with_state(
            RouteGuard::new(guard.clone(), requirement),
            authorize,
        ))
    }
}
