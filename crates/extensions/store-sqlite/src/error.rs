//! Store errors.

use thiserror::Error;

use kbsearch_protocols::IndexError;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Query error: {0}")]
    Query(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Document not found: {0}")]
    DocumentNotFound(String),
}

impl From<tokio_rusqlite::Error> for StoreError {
    fn from(e: tokio_rusqlite::Error) -> Self {
        match e {
            tokio_rusqlite::Error::ConnectionClosed => Self::Connection(e.to_string()),
            other => Self::Query(other.to_string()),
        }
    }
}

impl From<StoreError> for IndexError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Connection(msg) => IndexError::Connection(msg),
            StoreError::Serialization(msg) => IndexError::Malformed(msg),
            StoreError::Query(msg) => IndexError::Query(msg),
            StoreError::DocumentNotFound(id) => IndexError::Query(format!("Document not found: {}", id)),
        }
    }
}
