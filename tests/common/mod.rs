#![allow(dead_code)]

use async_trait::async_trait;
use axum_test::TestServer;
use linkdrop::AppError;
use linkdrop::domain::entities::{Link, NewLink};
use linkdrop::domain::repositories::LinkRepository;
use linkdrop::infrastructure::persistence::InMemoryLinkRepository;
use linkdrop::routes::router;
use linkdrop::state::AppState;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

pub const BASE_URL: &str = "https://sho.rt";
pub const CODE_LENGTH: usize = 8;

pub fn create_test_state() -> AppState {
    create_state_with(Arc::new(InMemoryLinkRepository::new()))
}

pub fn create_state_with(repository: Arc<dyn LinkRepository>) -> AppState {
    AppState::new(
        repository,
        BASE_URL,
        CODE_LENGTH,
        Duration::from_millis(500),
    )
}

pub fn test_server(state: AppState) -> TestServer {
    TestServer::new(router(state, false)).unwrap()
}

/// Creates a link through the allocator and returns its code.
pub async fn create_test_link(state: &AppState, url: &str, code: Option<&str>) -> String {
    state
        .link_service
        .create_short_link(url, code.map(str::to_string))
        .await
        .unwrap()
        .link
        .code
}

/// Store whose every call fails as if the database were down.
pub struct UnavailableRepository;

fn unavailable() -> AppError {
    AppError::store_unavailable("Store unavailable", json!({ "reason": "connection refused" }))
}

#[async_trait]
impl LinkRepository for UnavailableRepository {
    async fn create(&self, _new_link: NewLink) -> Result<Link, AppError> {
        Err(unavailable())
    }

    async fn find_by_code(&self, _code: &str) -> Result<Option<Link>, AppError> {
        Err(unavailable())
    }

    async fn increment_clicks(&self, _code: &str) -> Result<bool, AppError> {
        Err(unavailable())
    }

    async fn ping(&self) -> Result<(), AppError> {
        Err(unavailable())
    }

    async fn count_links(&self) -> Result<i64, AppError> {
        Err(unavailable())
    }

    async fn total_clicks(&self) -> Result<i64, AppError> {
        Err(unavailable())
    }
}
