//! Business logic services for the application layer.

pub mod link_service;
pub mod redirect_service;

pub use link_service::{Allocation, LinkService, LinkStats};
pub use redirect_service::RedirectService;

use crate::error::AppError;
use serde_json::json;
use std::future::Future;
use std::time::Duration;

/// Runs a store call with an upper bound on its duration.
///
/// An expired call becomes [`AppError::StoreUnavailable`]; the future is
/// dropped, which cancels the pending query.
pub(crate) async fn bounded<T>(
    timeout: Duration,
    operation: &'static str,
    fut: impl Future<Output = Result<T, AppError>>,
) -> Result<T, AppError> {
    match tokio::time::timeout(timeout, fut).await {
        Ok(result) => result,
        Err(_) => Err(AppError::store_unavailable(
            "Store did not respond in time",
            json!({ "operation": operation, "timeout_ms": timeout.as_millis() as u64 }),
        )),
    }
}
