//! SQLite knowledge store: ingestion and shared helpers.

use std::path::Path;
use std::sync::Arc;

use chrono::Utc;
use rusqlite::params;
use tokio_rusqlite::Connection;
use tracing::debug;

use kbsearch_protocols::Metadata;

use crate::error::StoreError;
use crate::schema::init_schema;

/// A chunk to ingest.
#[derive(Debug, Clone)]
pub struct NewChunk {
    pub document_id: String,
    /// Position of the chunk inside its document.
    pub chunk_index: usize,
    pub content: String,
    pub metadata: Metadata,
    /// Chunks without an embedding are only reachable through text search.
    pub embedding: Option<Vec<f32>>,
}

impl NewChunk {
    pub fn new(document_id: impl Into<String>, chunk_index: usize, content: impl Into<String>) -> Self {
        Self {
            document_id: document_id.into(),
            chunk_index,
            content: content.into(),
            metadata: Metadata::new(),
            embedding: None,
        }
    }

    pub fn with_embedding(mut self, embedding: Vec<f32>) -> Self {
        self.embedding = Some(embedding);
        self
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }
}

/// Knowledge store backed by one SQLite database.
///
/// Implements [`kbsearch_protocols::VectorIndex`],
/// [`kbsearch_protocols::TextIndex`] and [`kbsearch_protocols::DocumentStore`].
#[derive(Clone)]
pub struct SqliteKnowledgeStore {
    pub(crate) conn: Arc<Connection>,
}

impl SqliteKnowledgeStore {
    /// Create a new in-memory database.
    pub async fn in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;
        Self::init(conn).await
    }

    /// Open (or create) a file-backed database.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| StoreError::Connection(e.to_string()))?;
            }
        }
        let conn = Connection::open(path)
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;
        Self::init(conn).await
    }

    async fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.call(|conn| Ok(init_schema(conn)?)).await?;
        Ok(Self {
            conn: Arc::new(conn),
        })
    }

    /// Add a parent document, returning its id.
    pub async fn add_document(
        &self,
        title: impl Into<String>,
        source: impl Into<String>,
    ) -> Result<String, StoreError> {
        let id = uuid::Uuid::new_v4().to_string();
        let title = title.into();
        let source = source.into();
        let now = Utc::now().to_rfc3339();

        let id_clone = id.clone();
        self.conn
            .call(move |conn| {
                conn.execute(
                    "INSERT INTO documents (id, title, source, created_at) VALUES (?1, ?2, ?3, ?4)",
                    params![id_clone, title, source, now],
                )?;
                Ok(())
            })
            .await?;

        debug!("Added document: {}", id);
        Ok(id)
    }

    /// Add a chunk to an existing document, returning the chunk id.
    pub async fn add_chunk(&self, chunk: NewChunk) -> Result<String, StoreError> {
        let id = uuid::Uuid::new_v4().to_string();
        let metadata = serde_json::to_string(&chunk.metadata)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        let dimension = chunk.embedding.as_ref().map(|v| v.len() as i64);
        let blob = chunk.embedding.as_deref().map(encode_vector);

        let id_clone = id.clone();
        let document_id = chunk.document_id.clone();
        let inserted = self
            .conn
            .call(move |conn| {
                let exists: bool = conn
                    .prepare("SELECT 1 FROM documents WHERE id = ?1")?
                    .exists([&chunk.document_id])?;
                if !exists {
                    return Ok(false);
                }
                conn.execute(
                    "INSERT INTO chunks (id, document_id, chunk_index, content, metadata, embedding, dimension)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                    params![
                        id_clone,
                        chunk.document_id,
                        chunk.chunk_index as i64,
                        chunk.content,
                        metadata,
                        blob,
                        dimension
                    ],
                )?;
                Ok(true)
            })
            .await?;

        if !inserted {
            return Err(StoreError::DocumentNotFound(document_id));
        }

        debug!("Added chunk {} to document {}", id, document_id);
        Ok(id)
    }

    /// Remove a document and all of its chunks.
    pub async fn remove_document(&self, id: &str) -> Result<bool, StoreError> {
        let id = id.to_string();
        let removed = self
            .conn
            .call(move |conn| {
                let tx = conn.transaction()?;
                tx.execute("DELETE FROM chunks WHERE document_id = ?1", [&id])?;
                let removed = tx.execute("DELETE FROM documents WHERE id = ?1", [&id])?;
                tx.commit()?;
                Ok(removed > 0)
            })
            .await?;
        Ok(removed)
    }

    pub async fn document_count(&self) -> Result<usize, StoreError> {
        self.count("SELECT COUNT(*) FROM documents").await
    }

    pub async fn chunk_count(&self) -> Result<usize, StoreError> {
        self.count("SELECT COUNT(*) FROM chunks").await
    }

    async fn count(&self, sql: &'static str) -> Result<usize, StoreError> {
        let count = self
            .conn
            .call(move |conn| Ok(conn.query_row(sql, [], |row| row.get::<_, i64>(0))?))
            .await?;
        Ok(count.max(0) as usize)
    }
}

/// Little-endian f32 encoding for embedding blobs.
pub(crate) fn encode_vector(vector: &[f32]) -> Vec<u8> {
    vector.iter().flat_map(|v| v.to_le_bytes()).collect()
}

pub(crate) fn decode_vector(bytes: &[u8]) -> Result<Vec<f32>, StoreError> {
    if bytes.len() % 4 != 0 {
        return Err(StoreError::Serialization(format!(
            "Embedding blob length {} is not a multiple of 4",
            bytes.len()
        )));
    }
    Ok(bytes
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect())
}

pub(crate) fn decode_metadata(text: &str) -> Result<Metadata, StoreError> {
    serde_json::from_str(text).map_err(|e| StoreError::Serialization(e.to_string()))
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
