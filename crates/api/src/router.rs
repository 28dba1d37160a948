//! Router assembly

use crate::handlers;
use crate::request_id::request_context;
use crate::state::ApiState;
use axum::Router;
use axum::middleware;
use axum::routing::get;
use tower_http::trace::TraceLayer;

/// Build the introspection API router
///
/// The route table is deliberately small: the liveness probe and the
/// per-tenant key introspection path. Any other verb on a known path gets
/// the 405 envelope instead of axum's bare default.
pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/healthz", get(handlers::healthz))
        .route(
            "/{tenant}/internal/apim-keys",
            // Any verb but GET lands on the 405 envelope handler.
            get(handlers::tenant_keys).fallback(handlers::method_not_allowed),
        )
        .layer(middleware::from_fn(request_context))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
