use std::time::Duration;

use anyhow::{anyhow, Result};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use tracing::debug;

use crate::types::{EmbeddingRequest, EmbeddingResponse};

/// Hard cap on a single embedding call; a hung provider must not stall
/// the batch indefinitely.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub struct EmbedClient {
    api_key: String,
    model: String,
    http: reqwest::Client,
    base_url: String,
}

impl EmbedClient {
    pub fn new(api_key: &str, model: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            model: model.to_string(),
            http: reqwest::Client::new(),
            base_url: "https://api.openai.com/v1".to_string(),
        }
    }

    /// Point the client at a different OpenAI-compatible server.
    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        // Self-hosted servers commonly run without auth.
        if !self.api_key.is_empty() {
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&format!("Bearer {}", self.api_key))?,
            );
        }
        Ok(headers)
    }

    pub async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let request = EmbeddingRequest {
            model: self.model.clone(),
            input: serde_json::Value::String(text.to_string()),
        };

        let response = self.send(&request).await?;

        response
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| anyhow!("No embedding in response"))
    }

    pub async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let request = EmbeddingRequest {
            model: self.model.clone(),
            input: serde_json::Value::Array(
                texts
                    .iter()
                    .map(|t| serde_json::Value::String(t.clone()))
                    .collect(),
            ),
        };

        let response = self.send(&request).await?;

        Ok(response.data.into_iter().map(|d| d.embedding).collect())
    }

    async fn send(&self, request: &EmbeddingRequest) -> Result<EmbeddingResponse> {
        let url = format!("{}/embeddings", self.base_url);

        debug!(model = %request.model, "Embedding request");

        let response = self
            .http
            .post(&url)
            .timeout(REQUEST_TIMEOUT)
            .headers(self.headers()?)
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;
            return Err(anyhow!("Embedding API error ({}): {}", status, error_text));
        }

        Ok(response.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_request_serializes_string_input() {
        let request = EmbeddingRequest {
            model: "m".to_string(),
            input: serde_json::Value::String("halo dunia".to_string()),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "m");
        assert_eq!(json["input"], "halo dunia");
    }

    #[test]
    fn response_deserializes_embedding_vectors() {
        let raw = r#"{"data":[{"embedding":[0.25,-0.5]},{"embedding":[1.0,2.0]}]}"#;
        let response: EmbeddingResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(response.data.len(), 2);
        assert_eq!(response.data[0].embedding, vec![0.25, -0.5]);
    }

    #[test]
    fn with_base_url_strips_trailing_slash() {
        let client = EmbedClient::new("", "m").with_base_url("http://localhost:8080/v1/");
        assert_eq!(client.base_url, "http://localhost:8080/v1");
    }
}
