//! Batch orchestrator: drives each incoming article through embedding,
//! matching, and linking, growing the in-memory issue set as it goes so
//! later articles in the same batch see issues created by earlier ones.
//!
//! Articles are processed strictly in sequence. Two similar articles in one
//! batch must resolve one after the other, or both would miss the issue the
//! other is about to create and the topic would split in two.

use anyhow::Result;
use tracing::{debug, info, warn};
use uuid::Uuid;

use kabar_common::{parse_embedding, ClusterMode, ClusterOutcome, Issue, NewsItem};
use kabar_store::NewsStore;

use crate::centroid;
use crate::embedder::{embed_input, TextEmbedder};
use crate::similarity::{best_match, join_or_create, ClusterDecision};
use crate::title;

pub struct ClusterEngine<S, E> {
    store: S,
    embedder: E,
}

impl<S: NewsStore, E: TextEmbedder> ClusterEngine<S, E> {
    pub fn new(store: S, embedder: E) -> Self {
        Self { store, embedder }
    }

    /// Cluster a batch of news ids, in input order.
    ///
    /// Returns one outcome per successfully processed article; articles
    /// whose embedding cannot be obtained are skipped and absent from the
    /// result. Store failures abort the batch — already-committed links
    /// stay committed.
    pub async fn cluster(&self, news_ids: &[i64]) -> Result<Vec<ClusterOutcome>> {
        let run_id = Uuid::new_v4();
        let items = self.store.news_by_ids(news_ids).await?;
        let mut issues = self.store.all_issues().await?;

        info!(
            %run_id,
            requested = news_ids.len(),
            loaded = items.len(),
            issues = issues.len(),
            "Starting clustering batch"
        );

        let mut outcomes = Vec::new();
        for item in &items {
            if let Some(outcome) = self.process_item(item, &mut issues).await? {
                outcomes.push(outcome);
            }
        }

        info!(%run_id, outcomes = outcomes.len(), "Clustering batch complete");
        Ok(outcomes)
    }

    async fn process_item(
        &self,
        item: &NewsItem,
        issues: &mut Vec<Issue>,
    ) -> Result<Option<ClusterOutcome>> {
        let Some(embedding) = self.resolve_embedding(item).await? else {
            return Ok(None);
        };

        match join_or_create(best_match(&embedding, issues)) {
            ClusterDecision::Join {
                issue_id,
                similarity,
            } => {
                debug!(news_id = item.id, issue_id, similarity, "Joining existing issue");
                self.join_issue(item, issue_id, similarity, &embedding, issues)
                    .await?;
                Ok(Some(ClusterOutcome {
                    news_id: item.id,
                    issue_id,
                    mode: ClusterMode::Matched,
                    similarity,
                }))
            }
            ClusterDecision::Create => {
                let issue_title = title::provisional_title(&item.title);
                let issue = self.store.insert_issue(&issue_title, &embedding).await?;
                info!(
                    news_id = item.id,
                    issue_id = issue.id,
                    title = issue.title.as_str(),
                    "Created new issue"
                );
                // The article is the centroid; record the founding link at
                // full similarity without touching the already-seeded count.
                self.register_link(item.id, issue.id, 1.0, false).await?;
                let outcome = ClusterOutcome {
                    news_id: item.id,
                    issue_id: issue.id,
                    mode: ClusterMode::Created,
                    similarity: 1.0,
                };
                issues.push(issue);
                Ok(Some(outcome))
            }
        }
    }

    /// Fold the article into an issue: advance the centroid, persist it,
    /// refresh the in-memory copy, and register the membership link.
    async fn join_issue(
        &self,
        item: &NewsItem,
        issue_id: i64,
        similarity: f64,
        embedding: &[f32],
        issues: &mut [Issue],
    ) -> Result<()> {
        if let Some(issue) = issues.iter_mut().find(|i| i.id == issue_id) {
            let current = issue
                .centroid_embedding
                .as_ref()
                .and_then(parse_embedding);
            if let Some(current) = current {
                let updated = centroid::advance(&current, issue.news_count, embedding);
                self.store.update_centroid(issue_id, &updated).await?;
                // Keep the in-memory copy current so a third same-batch
                // member is weighted against the true contribution count.
                issue.centroid_embedding = Some(serde_json::to_value(&updated)?);
                issue.news_count += 1;
            } else {
                warn!(issue_id, "Centroid unparseable, linking without update");
            }
        }
        self.register_link(item.id, issue_id, similarity, true).await
    }

    /// Link Registrar: idempotent insert, counter bumped only when a row
    /// was actually created.
    async fn register_link(
        &self,
        news_id: i64,
        issue_id: i64,
        similarity: f64,
        increment_count: bool,
    ) -> Result<()> {
        let inserted = self.store.insert_link(news_id, issue_id, similarity).await?;
        if !inserted {
            debug!(news_id, issue_id, "Link already exists, skipping");
            return Ok(());
        }
        if increment_count {
            self.store.increment_news_count(issue_id).await?;
        }
        Ok(())
    }

    /// Obtain the article's embedding: a well-formed cached value wins,
    /// otherwise call the provider and persist the result. Returns `None`
    /// (article skipped) only when the provider fails.
    async fn resolve_embedding(&self, item: &NewsItem) -> Result<Option<Vec<f32>>> {
        if let Some(raw) = &item.embedding {
            if let Some(vector) = parse_embedding(raw) {
                return Ok(Some(vector));
            }
            warn!(news_id = item.id, "Cached embedding unparseable, regenerating");
        }

        let text = embed_input(&item.title, &item.content);
        match self.embedder.embed(&text).await {
            Ok(vector) => {
                self.store.save_embedding(item.id, &vector).await?;
                Ok(Some(vector))
            }
            Err(e) => {
                warn!(news_id = item.id, error = %e, "Embedding failed, skipping article");
                Ok(None)
            }
        }
    }
}
