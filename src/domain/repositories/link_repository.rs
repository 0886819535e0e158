//! Repository trait for short link data access.

use crate::domain::entities::{Link, NewLink};
use crate::error::AppError;
use async_trait::async_trait;

/// Store contract for short links.
///
/// Implementations own the persisted mappings and must enforce uniqueness of
/// `code` themselves, independently of any check made by callers.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgLinkRepository`] - PostgreSQL implementation
/// - [`crate::infrastructure::persistence::InMemoryLinkRepository`] - process-local map
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkRepository: Send + Sync {
    /// Persists a new mapping with `clicks = 0` and both timestamps set to now.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the short code is already taken.
    /// Returns [`AppError::StoreUnavailable`] or [`AppError::Internal`] on
    /// backend failures.
    async fn create(&self, new_link: NewLink) -> Result<Link, AppError>;

    /// Finds a link by its short code.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(Link))` if found
    /// - `Ok(None)` if not found
    async fn find_by_code(&self, code: &str) -> Result<Option<Link>, AppError>;

    /// Atomically adds one to `clicks` and refreshes `updated_at`.
    ///
    /// Returns `Ok(false)` when no mapping has this code.
    async fn increment_clicks(&self, code: &str) -> Result<bool, AppError>;

    /// Checks that the backend is reachable.
    async fn ping(&self) -> Result<(), AppError>;

    /// Number of stored mappings.
    async fn count_links(&self) -> Result<i64, AppError>;

    /// Sum of clicks across all mappings.
    async fn total_clicks(&self) -> Result<i64, AppError>;
}
