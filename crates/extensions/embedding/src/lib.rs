//! Embedding providers for kbsearch.
//!
//! - [`OpenAIEmbedding`]: any OpenAI-compatible `/embeddings` endpoint, with
//!   transport and HTTP failures classified into [`EmbeddingError`] kinds
//! - [`HashingEmbedding`]: deterministic bag-of-words hashing, for offline
//!   runs and tests (not semantic)

mod hashing;
mod openai;

use std::sync::Arc;
use std::time::Duration;

use kbsearch_config::EmbeddingConfig;
use kbsearch_protocols::{EmbeddingError, EmbeddingProvider};

pub use hashing::HashingEmbedding;
pub use openai::{OpenAIEmbedding, OpenAIEmbeddingConfig};

/// Build the provider named by the configuration.
pub fn build_embedder(
    config: &EmbeddingConfig,
) -> Result<Arc<dyn EmbeddingProvider>, EmbeddingError> {
    match config.provider.as_str() {
        "openai" => {
            let openai = OpenAIEmbeddingConfig::new(&config.api_key)
                .with_model(&config.model)
                .with_base_url(&config.base_url)
                .with_dimension(config.dimension)
                .with_timeout(Duration::from_secs(config.timeout_seconds));
            Ok(Arc::new(OpenAIEmbedding::new(openai)?))
        }
        "hashing" => Ok(Arc::new(HashingEmbedding::new(config.dimension))),
        other => Err(EmbeddingError::InvalidInput(format!(
            "Unknown embedding provider: {}",
            other
        ))),
    }
}
