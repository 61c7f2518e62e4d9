//! Embedding provider errors.

use thiserror::Error;

use super::FailureKind;

#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl EmbeddingError {
    /// Failure kind used when a branch absorbs this error.
    pub fn classify(&self) -> FailureKind {
        match self {
            Self::Auth(_) => FailureKind::Auth,
            Self::RateLimited(_) => FailureKind::RateLimit,
            Self::Timeout(_) => FailureKind::Timeout,
            Self::Network(_) => FailureKind::Network,
            Self::MalformedResponse(_) => FailureKind::MalformedResponse,
            Self::Api { .. } | Self::InvalidInput(_) => FailureKind::Backend,
        }
    }
}
