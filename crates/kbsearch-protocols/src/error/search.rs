//! Search façade errors and branch failure classification.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Classified reason a branch degraded to an empty contribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Auth,
    RateLimit,
    Timeout,
    Network,
    MalformedResponse,
    /// The backend rejected or failed the request for any other reason.
    Backend,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Auth => "auth",
            Self::RateLimit => "rate_limit",
            Self::Timeout => "timeout",
            Self::Network => "network",
            Self::MalformedResponse => "malformed_response",
            Self::Backend => "backend",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rejected search input. Raised before any collaborator is called.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Query must not be empty")]
    EmptyQuery,

    #[error("match_count must be between 1 and {max}, got {value}")]
    InvalidMatchCount { value: i64, max: usize },

    #[error("Unknown search_type: {0}")]
    UnknownSearchType(String),
}

impl ValidationError {
    /// Remediation hint phrased for the calling agent.
    pub fn guidance(&self) -> String {
        match self {
            Self::EmptyQuery => "Knowledge base search requires a non-empty query. \
                 Ask the user to clarify their question."
                .to_string(),
            Self::InvalidMatchCount { max, .. } => format!(
                "Knowledge base search requires a positive match_count. \
                 Use a value between 1 and {}.",
                max
            ),
            Self::UnknownSearchType(_) => {
                "Unknown search_type. Use 'hybrid', 'semantic', or 'text'.".to_string()
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}
