use anyhow::Result;

use embed_client::EmbedClient;
use kabar_common::Config;

/// Content characters appended to the title when building embedding input.
const CONTENT_CHARS: usize = 450;

// --- TextEmbedder trait ---

#[async_trait::async_trait]
pub trait TextEmbedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;
}

#[async_trait::async_trait]
impl<T: TextEmbedder> TextEmbedder for std::sync::Arc<T> {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        (**self).embed(text).await
    }
}

/// Wrapper around an OpenAI-compatible embeddings endpoint.
pub struct Embedder {
    client: EmbedClient,
}

impl Embedder {
    pub fn new(config: &Config) -> Self {
        let client = EmbedClient::new(&config.embedding_api_key, &config.embedding_model)
            .with_base_url(&config.embedding_api_url);
        Self { client }
    }
}

#[async_trait::async_trait]
impl TextEmbedder for Embedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.client.embed(text).await
    }
}

/// Text fed to the embedding model: headline plus the opening of the body.
pub fn embed_input(title: &str, content: &str) -> String {
    let lead: String = content.chars().take(CONTENT_CHARS).collect();
    format!("{title} {lead}")
}
