//! API route configuration.

use crate::api::handlers::{link_handler, shorten_handler};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};

/// Routes nested under `/api`.
///
/// # Endpoints
///
/// - `POST /shorten`      - Create a short link
/// - `GET  /links/{code}` - Link details and click count
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/shorten", post(shorten_handler))
        .route("/links/{code}", get(link_handler))
}
