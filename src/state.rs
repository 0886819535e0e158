//! Shared application state injected into handlers.

use std::sync::Arc;
use std::time::Duration;

use crate::application::services::{LinkService, RedirectService};
use crate::domain::repositories::LinkRepository;

/// Services shared by all requests.
///
/// Cloning is cheap: only the `Arc`s are copied. Both services hold the same
/// store handle, which is the only state shared between requests.
#[derive(Clone)]
pub struct AppState {
    pub link_service: Arc<LinkService<dyn LinkRepository>>,
    pub redirect_service: Arc<RedirectService<dyn LinkRepository>>,
}

impl AppState {
    /// Wires both services on top of one store.
    pub fn new(
        repository: Arc<dyn LinkRepository>,
        base_url: impl Into<String>,
        code_length: usize,
        store_timeout: Duration,
    ) -> Self {
        let link_service = LinkService::new(
            repository.clone(),
            base_url,
            code_length,
            store_timeout,
        );
        let redirect_service = RedirectService::new(repository, store_timeout);

        Self {
            link_service: Arc::new(link_service),
            redirect_service: Arc::new(redirect_service),
        }
    }
}
