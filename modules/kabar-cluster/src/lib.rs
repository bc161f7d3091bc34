pub mod centroid;
pub mod embedder;
pub mod engine;
pub mod similarity;
pub mod title;

pub use engine::ClusterEngine;
pub use similarity::{BestMatch, ClusterDecision, SIMILARITY_THRESHOLD};
