//! Handler for short URL redirect.

use axum::{
    extract::{Path, State},
    response::{IntoResponse, Redirect},
};

use crate::error::AppError;
use crate::state::AppState;

/// Redirects a short code to its original URL.
///
/// # Endpoint
///
/// `GET /{code}`
///
/// # Request Flow
///
/// 1. Look up the code in the store
/// 2. Atomically increment its click counter
/// 3. Return 307 Temporary Redirect
///
/// # Errors
///
/// Returns 404 Not Found if the short code doesn't exist.
/// Returns 503 Service Unavailable if the store does not answer in time.
pub async fn redirect_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let original_url = state.redirect_service.resolve(&code).await?;

    Ok(Redirect::temporary(&original_url))
}
