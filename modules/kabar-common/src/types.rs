use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// --- News ---

/// Political leaning label assigned by the external classifier.
/// Carried through this system but never written by it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NewsLabel {
    Netral,
    Oposisi,
    ProPemerintah,
}

impl NewsLabel {
    /// Parse the label string as stored in the database. Unknown values
    /// are treated as unlabeled.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "netral" => Some(NewsLabel::Netral),
            "oposisi" => Some(NewsLabel::Oposisi),
            "pro_pemerintah" => Some(NewsLabel::ProPemerintah),
            _ => None,
        }
    }
}

impl std::fmt::Display for NewsLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NewsLabel::Netral => write!(f, "netral"),
            NewsLabel::Oposisi => write!(f, "oposisi"),
            NewsLabel::ProPemerintah => write!(f, "pro_pemerintah"),
        }
    }
}

/// A scraped or manually submitted news article.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsItem {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub link_article: String,
    pub img_url: Option<String>,
    pub source: String,
    pub published_at: DateTime<Utc>,
    pub label: Option<NewsLabel>,
    /// Raw embedding as persisted by the store. May be a JSON number array
    /// or a JSON-encoded string of one; parse with [`parse_embedding`].
    pub embedding: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

// --- Issues ---

/// A persistent topical cluster of news articles, represented by the
/// running mean of its members' embeddings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    pub id: i64,
    pub title: String,
    /// Raw centroid as persisted by the store; same tolerant representation
    /// as [`NewsItem::embedding`].
    pub centroid_embedding: Option<serde_json::Value>,
    pub news_count: i32,
    pub view_count: i32,
    pub timemodified: DateTime<Utc>,
}

/// Membership of one article in one issue. Unique per (news_id, issue_id).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsIssueLink {
    pub news_id: i64,
    pub issue_id: i64,
    pub similarity: f64,
}

// --- Clustering outcomes ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClusterMode {
    Matched,
    Created,
}

impl std::fmt::Display for ClusterMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClusterMode::Matched => write!(f, "matched"),
            ClusterMode::Created => write!(f, "created"),
        }
    }
}

/// Where one article landed after a clustering pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterOutcome {
    pub news_id: i64,
    pub issue_id: i64,
    pub mode: ClusterMode,
    pub similarity: f64,
}

// --- Embedding parsing ---

/// Parse an embedding from its stored representation.
///
/// The store may hand back a JSON number array or a JSON-encoded string of
/// one (older rows). Anything else, including an empty array or a
/// non-numeric element, counts as absent — never an error.
pub fn parse_embedding(value: &serde_json::Value) -> Option<Vec<f32>> {
    match value {
        serde_json::Value::Array(items) => {
            let mut vector = Vec::with_capacity(items.len());
            for item in items {
                vector.push(item.as_f64()? as f32);
            }
            if vector.is_empty() {
                None
            } else {
                Some(vector)
            }
        }
        serde_json::Value::String(raw) => {
            let parsed: serde_json::Value = serde_json::from_str(raw).ok()?;
            match parsed {
                serde_json::Value::Array(_) => parse_embedding(&parsed),
                _ => None,
            }
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_embedding_accepts_number_array() {
        assert_eq!(
            parse_embedding(&json!([0.1, 0.2, 0.3])),
            Some(vec![0.1, 0.2, 0.3])
        );
    }

    #[test]
    fn parse_embedding_accepts_stringified_array() {
        assert_eq!(
            parse_embedding(&json!("[1.0, 2.0]")),
            Some(vec![1.0, 2.0])
        );
    }

    #[test]
    fn parse_embedding_rejects_garbage_string() {
        assert_eq!(parse_embedding(&json!("not an embedding")), None);
    }

    #[test]
    fn parse_embedding_rejects_non_numeric_element() {
        assert_eq!(parse_embedding(&json!([0.1, "x", 0.3])), None);
    }

    #[test]
    fn parse_embedding_treats_empty_array_as_absent() {
        assert_eq!(parse_embedding(&json!([])), None);
    }

    #[test]
    fn parse_embedding_rejects_object() {
        assert_eq!(parse_embedding(&json!({"dim": 768})), None);
    }

    #[test]
    fn parse_embedding_rejects_stringified_scalar() {
        assert_eq!(parse_embedding(&json!("42")), None);
    }

    #[test]
    fn news_label_round_trips_db_strings() {
        for label in [NewsLabel::Netral, NewsLabel::Oposisi, NewsLabel::ProPemerintah] {
            assert_eq!(NewsLabel::parse(&label.to_string()), Some(label));
        }
        assert_eq!(NewsLabel::parse("sayap_kiri"), None);
    }
}
