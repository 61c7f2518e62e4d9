//! Index and document store protocols.
//!
//! Index queries return a [`HitStream`]: a finite cursor that yields hits in
//! rank order and cannot be restarted. Callers drain it once.

use std::collections::HashMap;
use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;
use serde::{Deserialize, Serialize};

use crate::error::IndexError;
use crate::search::{DocumentInfo, RawHit};

/// Lazily produced, rank-ordered index hits.
pub type HitStream = Pin<Box<dyn Stream<Item = Result<RawHit, IndexError>> + Send>>;

/// Fuzzy matching tolerance for full-text queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FuzzyOptions {
    /// Maximum edit distance between a query term and an indexed term.
    pub max_edits: u8,
    /// Number of leading characters that must match exactly.
    pub prefix_length: usize,
}

impl Default for FuzzyOptions {
    fn default() -> Self {
        Self {
            max_edits: 2,
            prefix_length: 3,
        }
    }
}

/// Nearest-neighbour index over chunk embeddings.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Query for the chunks closest to `vector`.
    ///
    /// `candidate_pool` is how many neighbours an approximate index should
    /// consider; at most `limit` hits are yielded, ordered by descending
    /// cosine similarity.
    async fn query(
        &self,
        vector: &[f32],
        candidate_pool: usize,
        limit: usize,
    ) -> Result<HitStream, IndexError>;
}

/// Full-text index over chunk content.
#[async_trait]
pub trait TextIndex: Send + Sync {
    /// Fuzzy keyword query; at most `limit` hits ordered by descending relevance.
    async fn query(
        &self,
        text: &str,
        fuzzy: FuzzyOptions,
        limit: usize,
    ) -> Result<HitStream, IndexError>;
}

/// Parent-document lookup.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Resolve document ids to their labels. Unknown ids are absent from the map.
    async fn resolve(
        &self,
        document_ids: &[String],
    ) -> Result<HashMap<String, DocumentInfo>, IndexError>;
}
