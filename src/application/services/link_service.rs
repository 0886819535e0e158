//! Short code allocation service.

use std::sync::Arc;
use std::time::Duration;

use crate::application::services::bounded;
use crate::domain::entities::{Link, NewLink};
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;
use crate::utils::code_generator::{generate_code, is_reserved, validate_custom_code};
use crate::utils::url_validator::validate_url;
use serde_json::json;
use tracing::{info, warn};

/// Upper bound on random code generation attempts.
pub const MAX_GENERATION_ATTEMPTS: usize = 5;

/// A freshly created link together with its public short URL.
#[derive(Debug, Clone)]
pub struct Allocation {
    pub link: Link,
    pub short_url: String,
}

/// Link and click totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkStats {
    pub links: i64,
    pub clicks: i64,
}

/// Service that mints or validates short codes and persists new links.
///
/// Holds no mutable state: every call receives its inputs explicitly, so a
/// single instance is shared by all requests.
pub struct LinkService<L: LinkRepository + ?Sized> {
    link_repository: Arc<L>,
    base_url: String,
    code_length: usize,
    store_timeout: Duration,
}

impl<L: LinkRepository + ?Sized> LinkService<L> {
    /// Creates a new link service.
    ///
    /// - `base_url` - origin plus optional path prefix used for short URLs
    /// - `code_length` - length of generated codes
    /// - `store_timeout` - upper bound on each store call
    pub fn new(
        link_repository: Arc<L>,
        base_url: impl Into<String>,
        code_length: usize,
        store_timeout: Duration,
    ) -> Self {
        Self {
            link_repository,
            base_url: base_url.into(),
            code_length,
            store_timeout,
        }
    }

    /// Creates a short link.
    ///
    /// # Arguments
    ///
    /// - `original_url` - The URL to shorten
    /// - `custom_code` - Optional custom short code (validated if provided)
    ///
    /// # Code Selection
    ///
    /// - With `custom_code`: validated, checked against the store, then
    ///   inserted. A uniqueness violation at insert time is still a conflict.
    /// - Without: a random code is inserted directly; on collision a new code
    ///   is drawn, up to [`MAX_GENERATION_ATTEMPTS`] times.
    ///
    /// # Errors
    ///
    /// - [`AppError::Validation`] if the URL or custom code is malformed
    /// - [`AppError::Conflict`] if the custom code is taken
    /// - [`AppError::Exhausted`] if every generated code collided
    /// - [`AppError::StoreUnavailable`] if the store times out or is down
    pub async fn create_short_link(
        &self,
        original_url: &str,
        custom_code: Option<String>,
    ) -> Result<Allocation, AppError> {
        let original_url = validate_url(original_url).map_err(|e| {
            AppError::bad_request(e.to_string(), json!({ "field": "url" }))
        })?;

        let link = match custom_code {
            Some(code) => self.create_with_custom_code(code, original_url).await?,
            None => self.create_with_generated_code(original_url).await?,
        };

        metrics::counter!("links_created_total").increment(1);
        info!(code = %link.code, id = link.id, "short link created");

        let short_url = self.get_short_url(&link);
        Ok(Allocation { link, short_url })
    }

    /// Retrieves a link by its short code without counting a click.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no link matches the code.
    pub async fn get_link_by_code(&self, code: &str) -> Result<Link, AppError> {
        bounded(
            self.store_timeout,
            "find_by_code",
            self.link_repository.find_by_code(code),
        )
        .await?
        .ok_or_else(|| AppError::not_found("Short link not found", json!({ "code": code })))
    }

    /// Constructs the full short URL for a link.
    pub fn get_short_url(&self, link: &Link) -> String {
        link.short_url(&self.base_url)
    }

    /// Probes the store.
    pub async fn check_store(&self) -> Result<(), AppError> {
        bounded(self.store_timeout, "ping", self.link_repository.ping()).await
    }

    /// Totals across the whole store.
    pub async fn stats(&self) -> Result<LinkStats, AppError> {
        let links = bounded(
            self.store_timeout,
            "count_links",
            self.link_repository.count_links(),
        )
        .await?;
        let clicks = bounded(
            self.store_timeout,
            "total_clicks",
            self.link_repository.total_clicks(),
        )
        .await?;

        Ok(LinkStats { links, clicks })
    }

    async fn create_with_custom_code(
        &self,
        code: String,
        original_url: String,
    ) -> Result<Link, AppError> {
        validate_custom_code(&code)?;

        let existing = bounded(
            self.store_timeout,
            "find_by_code",
            self.link_repository.find_by_code(&code),
        )
        .await?;
        if existing.is_some() {
            warn!(code = %code, "custom code already in use");
            return Err(AppError::conflict(
                "Code already in use",
                json!({ "field": "customCode", "code": code }),
            ));
        }

        let new_link = NewLink {
            code: code.clone(),
            original_url,
        };

        match self.insert(new_link).await {
            Err(AppError::Conflict { .. }) => {
                warn!(code = %code, "custom code taken concurrently");
                Err(AppError::conflict(
                    "Code already in use",
                    json!({ "field": "customCode", "code": code }),
                ))
            }
            other => other,
        }
    }

    /// Generates a unique short code with bounded collision retry.
    async fn create_with_generated_code(&self, original_url: String) -> Result<Link, AppError> {
        for attempt in 1..=MAX_GENERATION_ATTEMPTS {
            let code = generate_code(self.code_length).map_err(|e| {
                AppError::internal(
                    "Failed to generate short code",
                    json!({ "reason": e.to_string() }),
                )
            })?;
            if is_reserved(&code) {
                continue;
            }

            let new_link = NewLink {
                code,
                original_url: original_url.clone(),
            };

            match self.insert(new_link).await {
                Err(AppError::Conflict { details, .. }) => {
                    warn!(attempt, %details, "generated code collided, retrying");
                }
                other => return other,
            }
        }

        Err(AppError::exhausted(
            "Failed to generate unique code",
            json!({ "attempts": MAX_GENERATION_ATTEMPTS, "code_length": self.code_length }),
        ))
    }

    async fn insert(&self, new_link: NewLink) -> Result<Link, AppError> {
        bounded(
            self.store_timeout,
            "create",
            self.link_repository.create(new_link),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::MockLinkRepository;
    use async_trait::async_trait;
    use chrono::Utc;

    const BASE_URL: &str = "https://s.example.com";

    fn test_link(id: i64, code: &str, url: &str) -> Link {
        let now = Utc::now();
        Link::new(id, code.to_string(), url.to_string(), 0, now, now)
    }

    fn service(repo: MockLinkRepository) -> LinkService<MockLinkRepository> {
        LinkService::new(Arc::new(repo), BASE_URL, 8, Duration::from_secs(1))
    }

    #[tokio::test]
    async fn test_create_short_link_generated_code() {
        let mut mock_repo = MockLinkRepository::new();
        mock_repo.expect_find_by_code().times(0);
        mock_repo
            .expect_create()
            .withf(|new_link| {
                new_link.code.len() == 8 && new_link.original_url == "https://example.com"
            })
            .times(1)
            .returning(|new_link| Ok(test_link(10, &new_link.code, &new_link.original_url)));

        let allocation = service(mock_repo)
            .create_short_link("https://example.com", None)
            .await
            .unwrap();

        assert_eq!(allocation.link.original_url, "https://example.com");
        assert_eq!(
            allocation.short_url,
            format!("{BASE_URL}/{}", allocation.link.code)
        );
    }

    #[tokio::test]
    async fn test_create_short_link_keeps_url_verbatim() {
        let mut mock_repo = MockLinkRepository::new();
        mock_repo
            .expect_create()
            .withf(|new_link| new_link.original_url == "https://example.com/path?q=1")
            .times(1)
            .returning(|new_link| Ok(test_link(1, &new_link.code, &new_link.original_url)));

        let result = service(mock_repo)
            .create_short_link(" https://example.com/path?q=1 ", None)
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_create_short_link_invalid_url() {
        let mut mock_repo = MockLinkRepository::new();
        mock_repo.expect_create().times(0);

        let result = service(mock_repo)
            .create_short_link("not-a-url", None)
            .await;

        assert!(matches!(result.unwrap_err(), AppError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_create_short_link_with_custom_code() {
        let mut mock_repo = MockLinkRepository::new();
        mock_repo
            .expect_find_by_code()
            .withf(|code| code == "my_code-1")
            .times(1)
            .returning(|_| Ok(None));
        mock_repo
            .expect_create()
            .withf(|new_link| new_link.code == "my_code-1")
            .times(1)
            .returning(|new_link| Ok(test_link(10, &new_link.code, &new_link.original_url)));

        let allocation = service(mock_repo)
            .create_short_link("https://example.com", Some("my_code-1".to_string()))
            .await
            .unwrap();

        assert_eq!(allocation.link.code, "my_code-1");
        assert_eq!(allocation.short_url, "https://s.example.com/my_code-1");
    }

    #[tokio::test]
    async fn test_create_short_link_invalid_custom_code_writes_nothing() {
        let too_long = "a".repeat(256);
        for bad in ["", "has space", "slash/es", too_long.as_str()] {
            let mut mock_repo = MockLinkRepository::new();
            mock_repo.expect_find_by_code().times(0);
            mock_repo.expect_create().times(0);

            let result = service(mock_repo)
                .create_short_link("https://example.com", Some(bad.to_string()))
                .await;

            assert!(
                matches!(result, Err(AppError::Validation { .. })),
                "'{bad}' should fail validation"
            );
        }
    }

    #[tokio::test]
    async fn test_create_short_link_custom_code_conflict() {
        let mut mock_repo = MockLinkRepository::new();
        let existing = test_link(5, "abc123", "https://other.com");
        mock_repo
            .expect_find_by_code()
            .withf(|code| code == "abc123")
            .times(1)
            .returning(move |_| Ok(Some(existing.clone())));
        mock_repo.expect_create().times(0);

        let result = service(mock_repo)
            .create_short_link("https://example.com", Some("abc123".to_string()))
            .await;

        let err = result.unwrap_err();
        assert!(matches!(err, AppError::Conflict { .. }));
        assert_eq!(err.to_string(), "Code already in use");
    }

    #[tokio::test]
    async fn test_custom_code_race_lost_at_insert_is_conflict() {
        let mut mock_repo = MockLinkRepository::new();
        mock_repo.expect_find_by_code().returning(|_| Ok(None));
        mock_repo
            .expect_create()
            .times(1)
            .returning(|_| Err(AppError::conflict("Short code already in use", json!({}))));

        let result = service(mock_repo)
            .create_short_link("https://example.com", Some("racy".to_string()))
            .await;

        assert!(matches!(result.unwrap_err(), AppError::Conflict { .. }));
    }

    #[tokio::test]
    async fn test_generated_code_collision_retries() {
        let mut mock_repo = MockLinkRepository::new();
        let mut seq = mockall::Sequence::new();
        mock_repo
            .expect_create()
            .times(2)
            .in_sequence(&mut seq)
            .returning(|_| Err(AppError::conflict("Short code already in use", json!({}))));
        mock_repo
            .expect_create()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|new_link| Ok(test_link(3, &new_link.code, &new_link.original_url)));

        let result = service(mock_repo)
            .create_short_link("https://example.com", None)
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_generated_code_exhausted_after_bounded_attempts() {
        let mut mock_repo = MockLinkRepository::new();
        mock_repo
            .expect_create()
            .times(MAX_GENERATION_ATTEMPTS)
            .returning(|_| Err(AppError::conflict("Short code already in use", json!({}))));

        let result = service(mock_repo)
            .create_short_link("https://example.com", None)
            .await;

        assert!(matches!(result.unwrap_err(), AppError::Exhausted { .. }));
    }

    #[tokio::test]
    async fn test_store_error_is_not_retried() {
        let mut mock_repo = MockLinkRepository::new();
        mock_repo
            .expect_create()
            .times(1)
            .returning(|_| Err(AppError::store_unavailable("Store unavailable", json!({}))));

        let result = service(mock_repo)
            .create_short_link("https://example.com", None)
            .await;

        assert!(matches!(
            result.unwrap_err(),
            AppError::StoreUnavailable { .. }
        ));
    }

    #[tokio::test]
    async fn test_get_link_by_code_not_found() {
        let mut mock_repo = MockLinkRepository::new();
        mock_repo.expect_find_by_code().returning(|_| Ok(None));

        let result = service(mock_repo).get_link_by_code("missing").await;

        assert!(matches!(result.unwrap_err(), AppError::NotFound { .. }));
    }

    /// Store whose calls never finish within any reasonable timeout.
    struct StalledRepository;

    #[async_trait]
    impl LinkRepository for StalledRepository {
        async fn create(&self, _new_link: NewLink) -> Result<Link, AppError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            unreachable!()
        }

        async fn find_by_code(&self, _code: &str) -> Result<Option<Link>, AppError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            unreachable!()
        }

        async fn increment_clicks(&self, _code: &str) -> Result<bool, AppError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            unreachable!()
        }

        async fn ping(&self) -> Result<(), AppError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            unreachable!()
        }

        async fn count_links(&self) -> Result<i64, AppError> {
            Ok(0)
        }

        async fn total_clicks(&self) -> Result<i64, AppError> {
            Ok(0)
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_store_timeout_is_store_unavailable() {
        let service = LinkService::new(
            Arc::new(StalledRepository),
            BASE_URL,
            8,
            Duration::from_millis(50),
        );

        let result = service
            .create_short_link("https://example.com", None)
            .await;
        assert!(matches!(
            result.unwrap_err(),
            AppError::StoreUnavailable { .. }
        ));

        let result = service.check_store().await;
        assert!(matches!(
            result.unwrap_err(),
            AppError::StoreUnavailable { .. }
        ));
    }

    #[tokio::test]
    async fn test_stats_reads_both_totals() {
        let mut mock_repo = MockLinkRepository::new();
        mock_repo.expect_count_links().times(1).returning(|| Ok(3));
        mock_repo.expect_total_clicks().times(1).returning(|| Ok(42));

        let stats = service(mock_repo).stats().await.unwrap();

        assert_eq!(stats, LinkStats { links: 3, clicks: 42 });
    }
}
