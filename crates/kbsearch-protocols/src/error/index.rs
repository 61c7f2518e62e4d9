//! Index and document store errors.

use thiserror::Error;

use super::FailureKind;

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Query error: {0}")]
    Query(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Malformed hit: {0}")]
    Malformed(String),
}

impl IndexError {
    /// Failure kind used when a branch absorbs this error.
    pub fn classify(&self) -> FailureKind {
        match self {
            Self::Connection(_) => FailureKind::Network,
            Self::Query(_) => FailureKind::Backend,
            Self::Timeout(_) => FailureKind::Timeout,
            Self::Malformed(_) => FailureKind::MalformedResponse,
        }
    }
}
