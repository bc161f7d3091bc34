//! Similarity matching: pick the issue whose centroid is closest to a
//! candidate embedding, and decide whether that is close enough to join.

use kabar_common::{parse_embedding, Issue};

/// Minimum cosine similarity for attaching an article to an existing issue.
/// Tuned to the multilingual paraphrase embedding space; changing embedding
/// models requires re-tuning.
pub const SIMILARITY_THRESHOLD: f64 = 0.65;

/// The closest issue found for a candidate embedding.
#[derive(Debug, Clone, PartialEq)]
pub struct BestMatch {
    pub issue_id: i64,
    pub similarity: f64,
}

/// Join an existing issue or seed a new one.
#[derive(Debug, Clone, PartialEq)]
pub enum ClusterDecision {
    Join { issue_id: i64, similarity: f64 },
    Create,
}

/// Cosine similarity between two embedding vectors, computed in f64.
/// `None` when either norm is zero — undefined, not zero and not an error.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Option<f64> {
    let dot: f64 = a
        .iter()
        .zip(b.iter())
        .map(|(x, y)| (*x as f64) * (*y as f64))
        .sum();
    let norm_a: f64 = a.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();
    let norm_b: f64 = b.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return None;
    }
    Some(dot / (norm_a * norm_b))
}

/// Scan the issue set for the centroid closest to `query`.
///
/// Issues whose centroid is absent, unparseable, dimension-mismatched, or
/// zero-norm contribute no similarity at all. Strict `>` keeps the
/// first-seen issue on ties, so scan order is the deterministic tie-break.
pub fn best_match(query: &[f32], issues: &[Issue]) -> Option<BestMatch> {
    let mut best: Option<BestMatch> = None;
    for issue in issues {
        let Some(raw) = issue.centroid_embedding.as_ref() else {
            continue;
        };
        let Some(centroid) = parse_embedding(raw) else {
            continue;
        };
        if centroid.len() != query.len() {
            continue;
        }
        let Some(similarity) = cosine_similarity(query, &centroid) else {
            continue;
        };
        if best.as_ref().is_none_or(|b| similarity > b.similarity) {
            best = Some(BestMatch {
                issue_id: issue.id,
                similarity,
            });
        }
    }
    best
}

/// Pure gate: join iff a candidate exists at or above the threshold.
pub fn join_or_create(best: Option<BestMatch>) -> ClusterDecision {
    match best {
        Some(m) if m.similarity >= SIMILARITY_THRESHOLD => ClusterDecision::Join {
            issue_id: m.issue_id,
            similarity: m.similarity,
        },
        _ => ClusterDecision::Create,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    fn issue(id: i64, centroid: Option<serde_json::Value>) -> Issue {
        Issue {
            id,
            title: format!("Isu {id}"),
            centroid_embedding: centroid,
            news_count: 1,
            view_count: 0,
            timemodified: Utc::now(),
        }
    }

    // --- cosine_similarity ---

    #[test]
    fn cosine_is_symmetric() {
        let a = [0.3, -0.7, 0.2];
        let b = [0.1, 0.9, -0.4];
        assert_eq!(cosine_similarity(&a, &b), cosine_similarity(&b, &a));
    }

    #[test]
    fn cosine_of_vector_with_itself_is_one() {
        let v = [0.25, -0.5, 1.5, 0.0];
        let sim = cosine_similarity(&v, &v).unwrap();
        assert!((sim - 1.0).abs() < 1e-9);
    }

    #[test]
    fn cosine_of_orthogonal_vectors_is_zero() {
        let sim = cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).unwrap();
        assert!(sim.abs() < 1e-9);
    }

    #[test]
    fn cosine_undefined_for_zero_norm() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), None);
        assert_eq!(cosine_similarity(&[1.0, 1.0], &[0.0, 0.0]), None);
    }

    // --- best_match ---

    #[test]
    fn best_match_empty_issue_set_is_none() {
        assert_eq!(best_match(&[1.0, 0.0], &[]), None);
    }

    #[test]
    fn best_match_picks_highest_similarity() {
        let issues = vec![
            issue(1, Some(json!([0.0, 1.0]))),
            issue(2, Some(json!([1.0, 0.1]))),
            issue(3, Some(json!([-1.0, 0.0]))),
        ];
        let best = best_match(&[1.0, 0.0], &issues).unwrap();
        assert_eq!(best.issue_id, 2);
    }

    #[test]
    fn best_match_skips_dimension_mismatch_regardless_of_values() {
        // Identical direction but wrong dimensionality: never a candidate.
        let issues = vec![
            issue(1, Some(json!([1.0, 0.0, 0.0]))),
            issue(2, Some(json!([0.5, 0.5, 0.5, 0.5]))),
        ];
        let best = best_match(&[1.0, 0.0, 0.0, 0.0], &issues).unwrap();
        assert_eq!(best.issue_id, 2);
    }

    #[test]
    fn best_match_skips_absent_and_malformed_centroids() {
        let issues = vec![
            issue(1, None),
            issue(2, Some(json!("kacau"))),
            issue(3, Some(json!({"dim": 2}))),
            issue(4, Some(json!([0.9, 0.1]))),
        ];
        let best = best_match(&[1.0, 0.0], &issues).unwrap();
        assert_eq!(best.issue_id, 4);
    }

    #[test]
    fn best_match_skips_zero_norm_centroid() {
        let issues = vec![issue(1, Some(json!([0.0, 0.0])))];
        assert_eq!(best_match(&[1.0, 0.0], &issues), None);
    }

    #[test]
    fn best_match_tie_goes_to_first_seen() {
        let issues = vec![
            issue(7, Some(json!([2.0, 0.0]))),
            issue(8, Some(json!([1.0, 0.0]))),
        ];
        // Both centroids point the same way: similarity 1.0 each.
        let best = best_match(&[3.0, 0.0], &issues).unwrap();
        assert_eq!(best.issue_id, 7);
    }

    #[test]
    fn best_match_parses_stringified_centroid() {
        let issues = vec![issue(1, Some(json!("[1.0, 0.0]")))];
        let best = best_match(&[1.0, 0.0], &issues).unwrap();
        assert_eq!(best.issue_id, 1);
        assert!((best.similarity - 1.0).abs() < 1e-9);
    }

    // --- join_or_create ---

    #[test]
    fn gate_joins_at_exact_threshold() {
        let decision = join_or_create(Some(BestMatch {
            issue_id: 5,
            similarity: SIMILARITY_THRESHOLD,
        }));
        assert_eq!(
            decision,
            ClusterDecision::Join {
                issue_id: 5,
                similarity: SIMILARITY_THRESHOLD
            }
        );
    }

    #[test]
    fn gate_creates_just_below_threshold() {
        let decision = join_or_create(Some(BestMatch {
            issue_id: 5,
            similarity: SIMILARITY_THRESHOLD - 1e-9,
        }));
        assert_eq!(decision, ClusterDecision::Create);
    }

    #[test]
    fn gate_creates_without_candidate() {
        assert_eq!(join_or_create(None), ClusterDecision::Create);
    }
}
