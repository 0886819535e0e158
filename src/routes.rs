//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `GET  /{code}`             - Short link redirect
//! - `GET  /health`             - Health check
//! - `POST /api/shorten`        - Create a short link
//! - `GET  /api/links/{code}`   - Link details
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **Rate limiting** - Per-IP token bucket on `/api`
//! - **Path normalization** - Trailing slash handling

use crate::api;
use crate::api::handlers::{health_handler, redirect_handler};
use crate::api::middleware::{rate_limit, tracing};
use crate::state::AppState;
use axum::Router;
use axum::routing::get;
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

/// Builds the router with every route and middleware except path
/// normalization.
///
/// `rate_limited` enables the per-IP limiter on `/api`; it requires peer
/// addresses, so it is off when the router is driven without a socket.
pub fn router(state: AppState, rate_limited: bool) -> Router {
    let mut api_router = api::routes::api_routes();
    if rate_limited {
        api_router = api_router.layer(rate_limit::layer());
    }

    Router::new()
        .route("/{code}", get(redirect_handler))
        .route("/health", get(health_handler))
        .nest("/api", api_router)
        .with_state(state)
        .layer(tracing::layer())
}

/// Constructs the application router served by [`crate::server::run`].
pub fn app_router(state: AppState) -> NormalizePath<Router> {
    NormalizePathLayer::trim_trailing_slash().layer(router(state, true))
}
