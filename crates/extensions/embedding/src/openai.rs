//! OpenAI embedding provider.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use kbsearch_protocols::{Embedding, EmbeddingError, EmbeddingProvider};

/// Configuration for OpenAI embeddings.
#[derive(Debug, Clone)]
pub struct OpenAIEmbeddingConfig {
    /// API key for OpenAI.
    pub api_key: String,
    /// Model to use (default: text-embedding-3-small).
    pub model: String,
    /// Base URL for API (default: https://api.openai.com/v1).
    pub base_url: String,
    /// Embedding dimension (default: 1536 for text-embedding-3-small).
    pub dimension: usize,
    /// Whole-request timeout.
    pub timeout: Duration,
}

impl OpenAIEmbeddingConfig {
    /// Create config with API key using defaults.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: "text-embedding-3-small".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            dimension: 1536,
            timeout: Duration::from_secs(30),
        }
    }

    /// Use a different model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set custom base URL (for Azure OpenAI or compatible APIs).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set embedding dimension.
    pub fn with_dimension(mut self, dim: usize) -> Self {
        self.dimension = dim;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// OpenAI embedding provider.
pub struct OpenAIEmbedding {
    client: reqwest::Client,
    config: OpenAIEmbeddingConfig,
}

impl OpenAIEmbedding {
    /// Create a new OpenAI embedding provider.
    pub fn new(config: OpenAIEmbeddingConfig) -> Result<Self, EmbeddingError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| EmbeddingError::Network(format!("Client setup failed: {}", e)))?;
        Ok(Self { client, config })
    }

    fn endpoint(&self) -> String {
        format!("{}/embeddings", self.config.base_url.trim_end_matches('/'))
    }
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest {
    input: Vec<String>,
    model: String,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    #[serde(default)]
    index: usize,
    embedding: Vec<f32>,
}

/// Map a transport failure onto the classified error kinds.
fn transport_error(e: reqwest::Error) -> EmbeddingError {
    if e.is_timeout() {
        EmbeddingError::Timeout(e.to_string())
    } else if e.is_decode() {
        EmbeddingError::MalformedResponse(e.to_string())
    } else {
        EmbeddingError::Network(e.to_string())
    }
}

/// Map a non-success HTTP status onto the classified error kinds.
fn status_error(status: u16, body: String) -> EmbeddingError {
    match status {
        401 | 403 => EmbeddingError::Auth(body),
        429 => EmbeddingError::RateLimited(body),
        408 | 504 => EmbeddingError::Timeout(format!("HTTP {}: {}", status, body)),
        _ => EmbeddingError::Api {
            status,
            message: body,
        },
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAIEmbedding {
    async fn embed(&self, text: &str) -> Result<Embedding, EmbeddingError> {
        if text.trim().is_empty() {
            return Err(EmbeddingError::InvalidInput("Cannot embed empty text".to_string()));
        }
        let embeddings = self.embed_batch(&[text]).await?;
        embeddings
            .into_iter()
            .next()
            .ok_or_else(|| EmbeddingError::MalformedResponse("Empty response".to_string()))
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        let request = EmbeddingRequest {
            input: texts.iter().map(|t| t.to_string()).collect(),
            model: self.config.model.clone(),
        };

        let response = self
            .client
            .post(self.endpoint())
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(transport_error)?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status, body));
        }

        let body = response.text().await.map_err(transport_error)?;
        let mut embedding_response: EmbeddingResponse = serde_json::from_str(&body)
            .map_err(|e| EmbeddingError::MalformedResponse(format!("Parse error: {}", e)))?;

        if embedding_response.data.len() != texts.len() {
            return Err(EmbeddingError::MalformedResponse(format!(
                "Expected {} embeddings, got {}",
                texts.len(),
                embedding_response.data.len()
            )));
        }

        embedding_response.data.sort_by_key(|d| d.index);

        debug!("Generated {} embeddings", embedding_response.data.len());

        Ok(embedding_response
            .data
            .into_iter()
            .map(|d| Embedding::new(d.embedding))
            .collect())
    }

    fn dimension(&self) -> usize {
        self.config.dimension
    }
}

#[cfg(test)]
#[path = "openai_tests.rs"]
mod tests;
