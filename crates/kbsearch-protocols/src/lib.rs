//! # kbsearch Protocols
//!
//! Core data model and collaborator traits for hybrid knowledge-base retrieval.
//! Contains only interface definitions - no implementations.
//!
//! ## Core Traits
//!
//! - [`EmbeddingProvider`] - Turns query text into a vector
//! - [`VectorIndex`] - Nearest-neighbour lookup over chunk embeddings
//! - [`TextIndex`] - Fuzzy full-text lookup over chunk content
//! - [`DocumentStore`] - Resolves parent documents to title/source labels

pub mod embedding;
pub mod error;
pub mod index;
pub mod search;

pub use embedding::{cosine_similarity, Embedding, EmbeddingProvider};
pub use error::{EmbeddingError, FailureKind, IndexError, SearchError, ValidationError};
pub use index::{DocumentStore, FuzzyOptions, HitStream, TextIndex, VectorIndex};
pub use search::{Branch, DocumentInfo, Metadata, RawHit, SearchMode, SearchResult};
