//! SQLite knowledge store for kbsearch.
//!
//! One database holds documents, chunks, chunk embeddings and an FTS5 index,
//! and serves all three retrieval collaborators:
//!
//! - **Vector index**: exhaustive cosine similarity over stored embeddings
//! - **Text index**: FTS5 `bm25` ranking with fuzzy term expansion
//! - **Document store**: batched title/source lookup

mod error;
mod fuzzy;
mod schema;
mod search;
mod store;

pub use error::StoreError;
pub use store::{NewChunk, SqliteKnowledgeStore};
