// Trait abstraction for the document store behind the clustering engine.
//
// The engine only ever touches news rows, issue rows, and membership links
// through this seam, so tests run against MemoryNewsStore: no database,
// no Docker.

use anyhow::Result;
use async_trait::async_trait;

use kabar_common::{Issue, NewsItem};

#[async_trait]
pub trait NewsStore: Send + Sync {
    /// Load news rows for the given ids, preserving the input order.
    /// Unknown ids are silently absent from the result.
    async fn news_by_ids(&self, ids: &[i64]) -> Result<Vec<NewsItem>>;

    /// Persist a freshly computed embedding onto a news row so later
    /// passes skip recomputation.
    async fn save_embedding(&self, news_id: i64, embedding: &[f32]) -> Result<()>;

    /// Load the full issue set, ordered by creation (scan order is the
    /// tie-breaker during matching).
    async fn all_issues(&self) -> Result<Vec<Issue>>;

    /// Create an issue with the given centroid and `news_count = 1` baked
    /// into the initial row. Returns the stored row.
    async fn insert_issue(&self, title: &str, centroid: &[f32]) -> Result<Issue>;

    /// Replace an issue's centroid and refresh its modification timestamp.
    async fn update_centroid(&self, issue_id: i64, centroid: &[f32]) -> Result<()>;

    /// Idempotently insert a membership link. Returns true only if a new
    /// row was actually created.
    async fn insert_link(&self, news_id: i64, issue_id: i64, similarity: f64) -> Result<bool>;

    /// Atomically bump an issue's member counter and refresh its
    /// modification timestamp in one statement.
    async fn increment_news_count(&self, issue_id: i64) -> Result<()>;
}
