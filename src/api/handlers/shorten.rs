//! Handler for link shortening endpoint.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use serde_json::json;
use validator::Validate;

use crate::api::dto::shorten::{ShortenRequest, ShortenResponse};
use crate::application::services::Allocation;
use crate::error::AppError;
use crate::state::AppState;

/// Creates a short link for a long URL.
///
/// # Endpoint
///
/// `POST /api/shorten`
///
/// # Request Body
///
/// ```json
/// {
///   "url": "https://example.com/path?q=1",
///   "customCode": "my-link"  // optional
/// }
/// ```
///
/// # Response
///
/// `201 Created`:
///
/// ```json
/// {
///   "success": true,
///   "data": {
///     "shortUrl": "https://s.example.com/my-link",
///     "shortCode": "my-link"
///   }
/// }
/// ```
///
/// On failure the envelope carries `success: false` and an `error` message,
/// with the status taken from the error: 400 validation, 409 code in use,
/// 503 store unavailable, 500 otherwise. Malformed JSON bodies use the same
/// envelope.
pub async fn shorten_handler(
    State(state): State<AppState>,
    payload: Result<Json<ShortenRequest>, JsonRejection>,
) -> (StatusCode, Json<ShortenResponse>) {
    match shorten(&state, payload).await {
        Ok(allocation) => (
            StatusCode::CREATED,
            Json(ShortenResponse::success(
                allocation.short_url,
                allocation.link.code,
            )),
        ),
        Err(err) => {
            match &err {
                AppError::Exhausted { message, details }
                | AppError::Internal { message, details } => {
                    tracing::error!(%message, %details, "shorten failed");
                }
                AppError::StoreUnavailable { message, details } => {
                    tracing::warn!(%message, %details, "shorten failed: store unavailable");
                }
                _ => {}
            }
            (err.status_code(), Json(ShortenResponse::failure(&err)))
        }
    }
}

async fn shorten(
    state: &AppState,
    payload: Result<Json<ShortenRequest>, JsonRejection>,
) -> Result<Allocation, AppError> {
    let Json(request) = payload.map_err(|rejection| {
        AppError::bad_request(
            "Request body must be a JSON object",
            json!({ "reason": rejection.body_text() }),
        )
    })?;

    request.validate()?;

    state
        .link_service
        .create_short_link(&request.url, request.custom_code)
        .await
}
