// In-memory NewsStore for engine tests: no database, no Docker.
//
// Clones share state, so a test can hold a handle for inspection while the
// engine owns another.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;

use kabar_common::{Issue, NewsItem, NewsIssueLink};

use crate::store::NewsStore;

#[derive(Default)]
struct Inner {
    news: HashMap<i64, NewsItem>,
    issues: Vec<Issue>,
    links: Vec<NewsIssueLink>,
    next_issue_id: i64,
}

#[derive(Clone, Default)]
pub struct MemoryNewsStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryNewsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a news row. Builder pattern, chain before handing to the engine.
    pub fn with_news(self, item: NewsItem) -> Self {
        self.inner
            .lock()
            .expect("store lock poisoned")
            .news
            .insert(item.id, item);
        self
    }

    /// Seed an existing issue.
    pub fn with_issue(self, issue: Issue) -> Self {
        {
            let mut inner = self.inner.lock().expect("store lock poisoned");
            inner.next_issue_id = inner.next_issue_id.max(issue.id);
            inner.issues.push(issue);
        }
        self
    }

    // --- Inspection helpers ---

    pub fn links(&self) -> Vec<NewsIssueLink> {
        self.inner.lock().expect("store lock poisoned").links.clone()
    }

    pub fn issue(&self, issue_id: i64) -> Option<Issue> {
        self.inner
            .lock()
            .expect("store lock poisoned")
            .issues
            .iter()
            .find(|i| i.id == issue_id)
            .cloned()
    }

    pub fn news(&self, news_id: i64) -> Option<NewsItem> {
        self.inner
            .lock()
            .expect("store lock poisoned")
            .news
            .get(&news_id)
            .cloned()
    }
}

#[async_trait]
impl NewsStore for MemoryNewsStore {
    async fn news_by_ids(&self, ids: &[i64]) -> Result<Vec<NewsItem>> {
        let inner = self.inner.lock().expect("store lock poisoned");
        Ok(ids
            .iter()
            .filter_map(|id| inner.news.get(id).cloned())
            .collect())
    }

    async fn save_embedding(&self, news_id: i64, embedding: &[f32]) -> Result<()> {
        let mut inner = self.inner.lock().expect("store lock poisoned");
        if let Some(item) = inner.news.get_mut(&news_id) {
            item.embedding = Some(serde_json::to_value(embedding)?);
        }
        Ok(())
    }

    async fn all_issues(&self) -> Result<Vec<Issue>> {
        Ok(self.inner.lock().expect("store lock poisoned").issues.clone())
    }

    async fn insert_issue(&self, title: &str, centroid: &[f32]) -> Result<Issue> {
        let mut inner = self.inner.lock().expect("store lock poisoned");
        inner.next_issue_id += 1;
        let issue = Issue {
            id: inner.next_issue_id,
            title: title.to_string(),
            centroid_embedding: Some(serde_json::to_value(centroid)?),
            news_count: 1,
            view_count: 0,
            timemodified: Utc::now(),
        };
        inner.issues.push(issue.clone());
        Ok(issue)
    }

    async fn update_centroid(&self, issue_id: i64, centroid: &[f32]) -> Result<()> {
        let mut inner = self.inner.lock().expect("store lock poisoned");
        if let Some(issue) = inner.issues.iter_mut().find(|i| i.id == issue_id) {
            issue.centroid_embedding = Some(serde_json::to_value(centroid)?);
            issue.timemodified = Utc::now();
        }
        Ok(())
    }

    async fn insert_link(&self, news_id: i64, issue_id: i64, similarity: f64) -> Result<bool> {
        let mut inner = self.inner.lock().expect("store lock poisoned");
        let exists = inner
            .links
            .iter()
            .any(|l| l.news_id == news_id && l.issue_id == issue_id);
        if exists {
            return Ok(false);
        }
        inner.links.push(NewsIssueLink {
            news_id,
            issue_id,
            similarity,
        });
        Ok(true)
    }

    async fn increment_news_count(&self, issue_id: i64) -> Result<()> {
        let mut inner = self.inner.lock().expect("store lock poisoned");
        if let Some(issue) = inner.issues.iter_mut().find(|i| i.id == issue_id) {
            issue.news_count += 1;
            issue.timemodified = Utc::now();
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Fixture constructors
// ---------------------------------------------------------------------------

/// News row with sensible defaults and no cached embedding.
pub fn news_item(id: i64, title: &str, content: &str) -> NewsItem {
    NewsItem {
        id,
        title: title.to_string(),
        content: content.to_string(),
        link_article: format!("https://example.com/berita/{id}"),
        img_url: None,
        source: "Kompas".to_string(),
        published_at: Utc::now(),
        label: None,
        embedding: None,
        created_at: Utc::now(),
    }
}

/// Issue row with the given raw centroid value.
pub fn issue(id: i64, title: &str, centroid: Option<serde_json::Value>) -> Issue {
    Issue {
        id,
        title: title.to_string(),
        centroid_embedding: centroid,
        news_count: 1,
        view_count: 0,
        timemodified: Utc::now(),
    }
}
