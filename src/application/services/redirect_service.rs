//! Redirect resolution and click accounting.

use std::sync::Arc;
use std::time::Duration;

use crate::application::services::bounded;
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;
use crate::utils::code_generator::is_valid_code;
use serde_json::json;
use tracing::debug;

/// Service that resolves short codes to their original URL.
///
/// Each successful resolution counts one click. The counter is bumped by a
/// single atomic store update, never read-modify-write here.
pub struct RedirectService<L: LinkRepository + ?Sized> {
    link_repository: Arc<L>,
    store_timeout: Duration,
}

impl<L: LinkRepository + ?Sized> RedirectService<L> {
    /// Creates a new redirect service.
    pub fn new(link_repository: Arc<L>, store_timeout: Duration) -> Self {
        Self {
            link_repository,
            store_timeout,
        }
    }

    /// Resolves `code` to its original URL and records a click.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the code is malformed or unknown; the
    /// store is left unchanged. Returns [`AppError::StoreUnavailable`] when the
    /// store times out.
    pub async fn resolve(&self, code: &str) -> Result<String, AppError> {
        if !is_valid_code(code) {
            return Err(not_found(code));
        }

        let link = bounded(
            self.store_timeout,
            "find_by_code",
            self.link_repository.find_by_code(code),
        )
        .await?
        .ok_or_else(|| not_found(code))?;

        let counted = bounded(
            self.store_timeout,
            "increment_clicks",
            self.link_repository.increment_clicks(code),
        )
        .await?;
        if !counted {
            return Err(not_found(code));
        }

        metrics::counter!("redirects_total").increment(1);
        debug!(code, target = %link.original_url, "redirect resolved");

        Ok(link.original_url)
    }
}

fn not_found(code: &str) -> AppError {
    metrics::counter!("redirects_not_found_total").increment(1);
    AppError::not_found("Short link not found", json!({ "code": code }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::Link;
    use crate::domain::repositories::MockLinkRepository;
    use chrono::Utc;

    fn service(repo: MockLinkRepository) -> RedirectService<MockLinkRepository> {
        RedirectService::new(Arc::new(repo), Duration::from_secs(1))
    }

    #[tokio::test]
    async fn test_resolve_known_code_counts_click() {
        let mut mock_repo = MockLinkRepository::new();
        mock_repo
            .expect_find_by_code()
            .withf(|code| code == "abc123")
            .times(1)
            .returning(|code| {
                let now = Utc::now();
                Ok(Some(Link::new(
                    1,
                    code.to_string(),
                    "https://example.com/path?q=1".to_string(),
                    3,
                    now,
                    now,
                )))
            });
        mock_repo
            .expect_increment_clicks()
            .withf(|code| code == "abc123")
            .times(1)
            .returning(|_| Ok(true));

        let url = service(mock_repo).resolve("abc123").await.unwrap();

        assert_eq!(url, "https://example.com/path?q=1");
    }

    #[tokio::test]
    async fn test_resolve_unknown_code_does_not_increment() {
        let mut mock_repo = MockLinkRepository::new();
        mock_repo.expect_find_by_code().returning(|_| Ok(None));
        mock_repo.expect_increment_clicks().times(0);

        let result = service(mock_repo).resolve("missing").await;

        assert!(matches!(result.unwrap_err(), AppError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_resolve_malformed_code_skips_store() {
        let mut mock_repo = MockLinkRepository::new();
        mock_repo.expect_find_by_code().times(0);
        mock_repo.expect_increment_clicks().times(0);

        let result = service(mock_repo).resolve("bad.code").await;

        assert!(matches!(result.unwrap_err(), AppError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_resolve_row_vanished_before_increment() {
        let mut mock_repo = MockLinkRepository::new();
        mock_repo.expect_find_by_code().returning(|code| {
            let now = Utc::now();
            Ok(Some(Link::new(
                1,
                code.to_string(),
                "https://example.com".to_string(),
                0,
                now,
                now,
            )))
        });
        mock_repo.expect_increment_clicks().returning(|_| Ok(false));

        let result = service(mock_repo).resolve("gone").await;

        assert!(matches!(result.unwrap_err(), AppError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_resolve_store_failure_propagates() {
        let mut mock_repo = MockLinkRepository::new();
        mock_repo
            .expect_find_by_code()
            .returning(|_| Err(AppError::store_unavailable("Store unavailable", json!({}))));

        let result = service(mock_repo).resolve("abc123").await;

        assert!(matches!(
            result.unwrap_err(),
            AppError::StoreUnavailable { .. }
        ));
    }

    mod not_found_metric {
        use super::*;
        use metrics::{
            Counter, CounterFn, Gauge, Histogram, Key, KeyName, Metadata, Recorder,
            SharedString, Unit,
        };
        use std::sync::atomic::{AtomicU64, Ordering};

        struct Total(Arc<AtomicU64>);

        impl CounterFn for Total {
            fn increment(&self, value: u64) {
                self.0.fetch_add(value, Ordering::SeqCst);
            }

            fn absolute(&self, value: u64) {
                self.0.store(value, Ordering::SeqCst);
            }
        }

        /// Counts `redirects_not_found_total` and ignores every other metric.
        #[derive(Default)]
        struct NotFoundRecorder(Arc<AtomicU64>);

        impl Recorder for NotFoundRecorder {
            fn describe_counter(&self, _: KeyName, _: Option<Unit>, _: SharedString) {}
            fn describe_gauge(&self, _: KeyName, _: Option<Unit>, _: SharedString) {}
            fn describe_histogram(&self, _: KeyName, _: Option<Unit>, _: SharedString) {}

            fn register_counter(&self, key: &Key, _: &Metadata<'_>) -> Counter {
                if key.name() == "redirects_not_found_total" {
                    Counter::from_arc(Arc::new(Total(self.0.clone())))
                } else {
                    Counter::noop()
                }
            }

            fn register_gauge(&self, _: &Key, _: &Metadata<'_>) -> Gauge {
                Gauge::noop()
            }

            fn register_histogram(&self, _: &Key, _: &Metadata<'_>) -> Histogram {
                Histogram::noop()
            }
        }

        fn count_not_found(repo: MockLinkRepository, code: &str) -> u64 {
            let recorder = NotFoundRecorder::default();
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();

            metrics::with_local_recorder(&recorder, || {
                let result = runtime.block_on(service(repo).resolve(code));
                assert!(matches!(result.unwrap_err(), AppError::NotFound { .. }));
            });

            recorder.0.load(Ordering::SeqCst)
        }

        #[test]
        fn test_malformed_code_is_counted() {
            assert_eq!(count_not_found(MockLinkRepository::new(), "bad.code"), 1);
        }

        #[test]
        fn test_unknown_code_is_counted_once() {
            let mut mock_repo = MockLinkRepository::new();
            mock_repo.expect_find_by_code().returning(|_| Ok(None));

            assert_eq!(count_not_found(mock_repo, "missing"), 1);
        }

        #[test]
        fn test_vanished_row_is_counted() {
            let mut mock_repo = MockLinkRepository::new();
            mock_repo.expect_find_by_code().returning(|code| {
                let now = Utc::now();
                Ok(Some(Link::new(
                    1,
                    code.to_string(),
                    "https://example.com".to_string(),
                    0,
                    now,
                    now,
                )))
            });
            mock_repo.expect_increment_clicks().returning(|_| Ok(false));

            assert_eq!(count_not_found(mock_repo, "gone"), 1);
        }
    }
}
