//! In-memory implementation of link repository.

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use serde_json::json;
use std::sync::atomic::{AtomicI64, Ordering};

use crate::domain::entities::{Link, NewLink};
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;

/// Process-local store backed by a [`DashMap`].
///
/// Used when no database is configured and by the HTTP tests. Uniqueness is
/// enforced through the map's entry API, and click increments happen under the
/// shard write lock of the entry, so concurrent redirects never lose a count.
/// Contents are lost on restart.
#[derive(Debug)]
pub struct InMemoryLinkRepository {
    storage: DashMap<String, Link>,
    next_id: AtomicI64,
}

impl InMemoryLinkRepository {
    pub fn new() -> Self {
        Self {
            storage: DashMap::new(),
            next_id: AtomicI64::new(1),
        }
    }
}

impl Default for InMemoryLinkRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LinkRepository for InMemoryLinkRepository {
    async fn create(&self, new_link: NewLink) -> Result<Link, AppError> {
        match self.storage.entry(new_link.code) {
            Entry::Occupied(occupied) => Err(AppError::conflict(
                "Short code already in use",
                json!({ "code": occupied.key() }),
            )),
            Entry::Vacant(vacant) => {
                let now = Utc::now();
                let link = Link::new(
                    self.next_id.fetch_add(1, Ordering::Relaxed),
                    vacant.key().clone(),
                    new_link.original_url,
                    0,
                    now,
                    now,
                );
                vacant.insert(link.clone());
                Ok(link)
            }
        }
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<Link>, AppError> {
        Ok(self.storage.get(code).map(|entry| entry.value().clone()))
    }

    async fn increment_clicks(&self, code: &str) -> Result<bool, AppError> {
        let Some(mut entry) = self.storage.get_mut(code) else {
            return Ok(false);
        };

        entry.clicks += 1;
        entry.updated_at = Utc::now();
        Ok(true)
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }

    async fn count_links(&self) -> Result<i64, AppError> {
        Ok(self.storage.len() as i64)
    }

    async fn total_clicks(&self) -> Result<i64, AppError> {
        Ok(self.storage.iter().map(|entry| entry.clicks).sum())
    }
}
