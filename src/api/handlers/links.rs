//! Handler for link details.

use axum::{
    Json,
    extract::{Path, State},
};

use crate::api::dto::link::LinkResponse;
use crate::error::AppError;
use crate::state::AppState;

/// Returns a stored link and its click count.
///
/// # Endpoint
///
/// `GET /api/links/{code}`
///
/// Reading the details does not count as a click.
///
/// # Errors
///
/// Returns 404 Not Found if the short code doesn't exist.
pub async fn link_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<LinkResponse>, AppError> {
    let link = state.link_service.get_link_by_code(&code).await?;
    let short_url = state.link_service.get_short_url(&link);

    Ok(Json(LinkResponse {
        code: link.code,
        original_url: link.original_url,
        short_url,
        clicks: link.clicks,
        created_at: link.created_at,
        updated_at: link.updated_at,
    }))
}
