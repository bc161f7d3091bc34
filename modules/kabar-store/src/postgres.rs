use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use kabar_common::{Issue, NewsItem, NewsLabel};

use crate::store::NewsStore;

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

type NewsRow = (
    i64,                        // id
    String,                     // title
    String,                     // content
    String,                     // link_article
    Option<String>,             // img_url
    String,                     // source
    DateTime<Utc>,              // published_at
    Option<String>,             // label
    Option<serde_json::Value>,  // embedding
    DateTime<Utc>,              // created_at
);

type IssueRow = (
    i64,                        // id
    String,                     // title
    Option<serde_json::Value>,  // centroid_embedding
    i32,                        // news_count
    i32,                        // view_count
    DateTime<Utc>,              // timemodified
);

fn news_from_row(row: NewsRow) -> NewsItem {
    let (id, title, content, link_article, img_url, source, published_at, label, embedding, created_at) = row;
    NewsItem {
        id,
        title,
        content,
        link_article,
        img_url,
        source,
        published_at,
        label: label.as_deref().and_then(NewsLabel::parse),
        embedding,
        created_at,
    }
}

fn issue_from_row(row: IssueRow) -> Issue {
    let (id, title, centroid_embedding, news_count, view_count, timemodified) = row;
    Issue {
        id,
        title,
        centroid_embedding,
        news_count,
        view_count,
        timemodified,
    }
}

// ---------------------------------------------------------------------------
// PgNewsStore
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct PgNewsStore {
    pool: PgPool,
}

impl PgNewsStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NewsStore for PgNewsStore {
    async fn news_by_ids(&self, ids: &[i64]) -> Result<Vec<NewsItem>> {
        let rows = sqlx::query_as::<_, NewsRow>(
            "SELECT id, title, content, link_article, img_url, source,
                    published_at, label, embedding, created_at
             FROM news
             WHERE id = ANY($1)
             ORDER BY array_position($1, id)",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(news_from_row).collect())
    }

    async fn save_embedding(&self, news_id: i64, embedding: &[f32]) -> Result<()> {
        sqlx::query("UPDATE news SET embedding = $2 WHERE id = $1")
            .bind(news_id)
            .bind(serde_json::to_value(embedding)?)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn all_issues(&self) -> Result<Vec<Issue>> {
        let rows = sqlx::query_as::<_, IssueRow>(
            "SELECT id, title, centroid_embedding, news_count, view_count, timemodified
             FROM issues
             ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(issue_from_row).collect())
    }

    async fn insert_issue(&self, title: &str, centroid: &[f32]) -> Result<Issue> {
        let row = sqlx::query_as::<_, IssueRow>(
            "INSERT INTO issues (title, centroid_embedding, news_count, timemodified)
             VALUES ($1, $2, 1, now())
             RETURNING id, title, centroid_embedding, news_count, view_count, timemodified",
        )
        .bind(title)
        .bind(serde_json::to_value(centroid)?)
        .fetch_one(&self.pool)
        .await?;

        Ok(issue_from_row(row))
    }

    async fn update_centroid(&self, issue_id: i64, centroid: &[f32]) -> Result<()> {
        sqlx::query(
            "UPDATE issues SET centroid_embedding = $2, timemodified = now() WHERE id = $1",
        )
        .bind(issue_id)
        .bind(serde_json::to_value(centroid)?)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn insert_link(&self, news_id: i64, issue_id: i64, similarity: f64) -> Result<bool> {
        let result = sqlx::query(
            "INSERT INTO news_issues (news_id, issue_id, similarity)
             VALUES ($1, $2, $3)
             ON CONFLICT (news_id, issue_id) DO NOTHING",
        )
        .bind(news_id)
        .bind(issue_id)
        .bind(similarity)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn increment_news_count(&self, issue_id: i64) -> Result<()> {
        // Single-statement increment: concurrent batches cannot lose updates
        // the way a read-then-write from the client would.
        sqlx::query(
            "UPDATE issues SET news_count = news_count + 1, timemodified = now() WHERE id = $1",
        )
        .bind(issue_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
