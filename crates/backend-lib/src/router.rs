// ============================
// crates/backend-lib/src/router.rs
// ============================
//! HTTP router.
use std::sync::Arc;

use axum::{
    body::Body,
    http::Request,
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;
use tracing::Span;

use crate::handlers::{account, health::health};
use crate::middleware::require_session;
use crate::storage::UserStore;
use crate::AppState;

/// Create the HTTP router
pub fn create_router<S: UserStore + 'static>(state: Arc<AppState<S>>) -> Router {
    let protected = Router::new()
        .route("/api/admin/user", get(account::current_user::<S>))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_session::<S>));

    Router::new()
        .route("/health", get(health))
        .route("/api/register", post(account::register::<S>))
        .route("/api/login", post(account::login::<S>))
        .route("/api/check-username", post(account::request_reset::<S>))
        .route("/api/update-password", post(account::confirm_reset::<S>))
        .merge(protected)
        .layer(TraceLayer::new_for_http().make_span_with(request_span))
        .with_state(state)
}

/// Span for one request. Only the path is recorded: query strings may carry
/// session tokens.
fn request_span(request: &Request<Body>) -> Span {
    tracing::debug_span!(
        "request",
        method = %request.method(),
        path = %request.uri().path()
    )
}
