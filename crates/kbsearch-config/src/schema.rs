//! Configuration schema definitions.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use kbsearch_protocols::SearchMode;

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub search: SearchConfig,

    #[serde(default)]
    pub embedding: EmbeddingConfig,

    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Search façade and branch sizing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Result count used when a request does not name one.
    #[serde(default = "default_match_count")]
    pub default_match_count: usize,

    /// Largest accepted `match_count`.
    #[serde(default = "default_max_match_count")]
    pub max_match_count: usize,

    /// Minimum neighbour pool handed to the vector index.
    #[serde(default = "default_num_candidates")]
    pub num_candidates: usize,

    /// Mode used when a request does not name one.
    #[serde(default)]
    pub default_mode: SearchMode,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_match_count: default_match_count(),
            max_match_count: default_max_match_count(),
            num_candidates: default_num_candidates(),
            default_mode: SearchMode::default(),
        }
    }
}

fn default_match_count() -> usize {
    5
}

fn default_max_match_count() -> usize {
    50
}

fn default_num_candidates() -> usize {
    100
}

/// Embedding provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Provider type ("openai" or "hashing").
    #[serde(default = "default_embedding_provider")]
    pub provider: String,

    /// API key, usually `${OPENAI_API_KEY}`.
    #[serde(default)]
    pub api_key: String,

    #[serde(default = "default_embedding_model")]
    pub model: String,

    /// Base URL for OpenAI-compatible APIs.
    #[serde(default = "default_embedding_base_url")]
    pub base_url: String,

    #[serde(default = "default_embedding_dimension")]
    pub dimension: usize,

    /// Per-request timeout.
    #[serde(default = "default_embedding_timeout")]
    pub timeout_seconds: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: default_embedding_provider(),
            api_key: String::new(),
            model: default_embedding_model(),
            base_url: default_embedding_base_url(),
            dimension: default_embedding_dimension(),
            timeout_seconds: default_embedding_timeout(),
        }
    }
}

fn default_embedding_provider() -> String {
    "openai".to_string()
}

fn default_embedding_model() -> String {
    "text-embedding-3-small".to_string()
}

fn default_embedding_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_embedding_dimension() -> usize {
    1536
}

fn default_embedding_timeout() -> u64 {
    30
}

/// Knowledge store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// SQLite database file.
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
        }
    }
}

fn default_store_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".kbsearch")
        .join("knowledge.db")
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Directory for daily rolling log files; console only when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            dir: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

#[cfg(test)]
#[path = "schema_tests.rs"]
mod tests;
