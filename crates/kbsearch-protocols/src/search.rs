//! Search data model.
//!
//! A [`SearchResult`] is one retrieved chunk. Its `score` is branch-native
//! (cosine similarity, text relevance) until fusion replaces it with the
//! fused RRF score.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Metadata map type.
pub type Metadata = HashMap<String, serde_json::Value>;

/// One retrieved content chunk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Identity key for deduplication across branches.
    pub chunk_id: String,
    /// Parent document identifier.
    pub document_id: String,
    /// Chunk text.
    pub content: String,
    /// Relevance score; see module docs for units.
    pub score: f64,
    /// Auxiliary attributes, opaque to the engine.
    #[serde(default)]
    pub metadata: Metadata,
    /// Parent document title.
    #[serde(default)]
    pub document_title: String,
    /// Parent document source label.
    #[serde(default)]
    pub document_source: String,
}

impl SearchResult {
    /// Attach resolved document labels to a raw index hit.
    pub fn from_hit(hit: RawHit, document: DocumentInfo) -> Self {
        Self {
            chunk_id: hit.chunk_id,
            document_id: hit.document_id,
            content: hit.content,
            score: hit.score,
            metadata: hit.metadata,
            document_title: document.title,
            document_source: document.source,
        }
    }

    /// Replace the score, keeping everything else.
    pub fn with_score(mut self, score: f64) -> Self {
        self.score = score;
        self
    }
}

/// A hit as returned by an index, before parent-document resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawHit {
    pub chunk_id: String,
    pub document_id: String,
    pub content: String,
    pub score: f64,
    #[serde(default)]
    pub metadata: Metadata,
}

/// Denormalized labels of a parent document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentInfo {
    pub title: String,
    #[serde(default)]
    pub source: String,
}

impl DocumentInfo {
    pub fn new(title: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            source: source.into(),
        }
    }
}

/// Which branch(es) a search runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    /// Vector and text branches, fused with RRF.
    #[default]
    Hybrid,
    /// Vector branch only.
    Semantic,
    /// Text branch only.
    Text,
}

impl SearchMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hybrid => "hybrid",
            Self::Semantic => "semantic",
            Self::Text => "text",
        }
    }

    /// Branches dispatched for this mode, in dispatch order.
    pub fn branches(&self) -> &'static [Branch] {
        match self {
            Self::Hybrid => &[Branch::Vector, Branch::Text],
            Self::Semantic => &[Branch::Vector],
            Self::Text => &[Branch::Text],
        }
    }
}

impl FromStr for SearchMode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hybrid" => Ok(Self::Hybrid),
            "semantic" => Ok(Self::Semantic),
            "text" => Ok(Self::Text),
            other => Err(ValidationError::UnknownSearchType(other.to_string())),
        }
    }
}

impl fmt::Display for SearchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A retrieval branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Branch {
    Vector,
    Text,
}

impl Branch {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Vector => "vector",
            Self::Text => "text",
        }
    }
}

impl fmt::Display for Branch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
#[path = "search_tests.rs"]
mod tests;
