//! DTOs for link details.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// A stored link with its click count.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkResponse {
    pub code: String,
    pub original_url: String,
    pub short_url: String,
    pub clicks: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
