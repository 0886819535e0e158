//! Link entity representing a shortened URL mapping.

use chrono::{DateTime, Utc};

/// A shortened URL mapping with its click counter.
///
/// Created exactly once by the allocator. Afterwards only `clicks` and
/// `updated_at` change, and only on redirect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub id: i64,
    pub code: String,
    pub original_url: String,
    pub clicks: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Link {
    /// Creates a new Link instance.
    pub fn new(
        id: i64,
        code: String,
        original_url: String,
        clicks: i64,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            code,
            original_url,
            clicks,
            created_at,
            updated_at,
        }
    }

    /// Full short URL for this link under `base_url`.
    pub fn short_url(&self, base_url: &str) -> String {
        format!("{}/{}", base_url.trim_end_matches('/'), self.code)
    }
}

/// Input data for creating a new link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLink {
    pub code: String,
    pub original_url: String,
}
