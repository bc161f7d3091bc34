use std::env;

use tracing::info;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // Postgres
    pub database_url: String,

    // Embeddings
    pub embedding_api_url: String,
    pub embedding_api_key: String,
    pub embedding_model: String,
}

/// The model the similarity threshold was tuned against. Changing models
/// requires re-tuning the threshold.
const DEFAULT_EMBEDDING_MODEL: &str = "paraphrase-multilingual-mpnet-base-v2";

impl Config {
    /// Load configuration from environment variables.
    /// Panics with a clear message if required vars are missing.
    pub fn from_env() -> Self {
        Self {
            database_url: required_env("DATABASE_URL"),
            embedding_api_url: required_env("EMBEDDING_API_URL"),
            // Self-hosted embedding servers often run without auth.
            embedding_api_key: env::var("EMBEDDING_API_KEY").unwrap_or_default(),
            embedding_model: env::var("EMBEDDING_MODEL")
                .unwrap_or_else(|_| DEFAULT_EMBEDDING_MODEL.to_string()),
        }
    }

    /// Log the non-secret parts of the config at startup.
    pub fn log_redacted(&self) {
        info!(
            embedding_api_url = self.embedding_api_url.as_str(),
            embedding_model = self.embedding_model.as_str(),
            "Config loaded"
        );
    }
}

fn required_env(key: &str) -> String {
    env::var(key).unwrap_or_else(|_| panic!("{key} environment variable is required"))
}
