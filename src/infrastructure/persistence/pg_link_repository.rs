//! PostgreSQL implementation of link repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::{Link, NewLink};
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;

/// Row shape shared by every query returning a full link.
#[derive(sqlx::FromRow)]
struct LinkRow {
    id: i64,
    code: String,
    original_url: String,
    clicks: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<LinkRow> for Link {
    fn from(r: LinkRow) -> Self {
        Link::new(
            r.id,
            r.code,
            r.original_url,
            r.clicks,
            r.created_at,
            r.updated_at,
        )
    }
}

/// PostgreSQL repository for link storage and click accounting.
///
/// Code uniqueness is enforced by the `links_code_key` constraint; a
/// violation surfaces as [`AppError::Conflict`] through `From<sqlx::Error>`.
pub struct PgLinkRepository {
    pool: Arc<PgPool>,
}

impl PgLinkRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LinkRepository for PgLinkRepository {
    async fn create(&self, new_link: NewLink) -> Result<Link, AppError> {
        let row = sqlx::query_as::<_, LinkRow>(
            r#"
            INSERT INTO links (code, original_url)
            VALUES ($1, $2)
            RETURNING id, code, original_url, clicks, created_at, updated_at
            "#,
        )
        .bind(&new_link.code)
        .bind(&new_link.original_url)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(row.into())
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<Link>, AppError> {
        let row = sqlx::query_as::<_, LinkRow>(
            r#"
            SELECT id, code, original_url, clicks, created_at, updated_at
            FROM links
            WHERE code = $1
            "#,
        )
        .bind(code)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(Link::from))
    }

    async fn increment_clicks(&self, code: &str) -> Result<bool, AppError> {
        // Single statement: concurrent redirects never lose an increment.
        let result = sqlx::query(
            r#"
            UPDATE links
            SET clicks = clicks + 1, updated_at = NOW()
            WHERE code = $1
            "#,
        )
        .bind(code)
        .execute(self.pool.as_ref())
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(self.pool.as_ref()).await?;
        Ok(())
    }

    async fn count_links(&self) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM links")
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(count)
    }

    async fn total_clicks(&self) -> Result<i64, AppError> {
        let total =
            sqlx::query_scalar::<_, i64>("SELECT COALESCE(SUM(clicks), 0)::BIGINT FROM links")
                .fetch_one(self.pool.as_ref())
                .await?;

        Ok(total)
    }
}
