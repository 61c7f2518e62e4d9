//! Ingest subcommand handler.

use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use tracing::{debug, info, warn};

use kbsearch_protocols::{EmbeddingProvider, Metadata};
use kbsearch_store_sqlite::{NewChunk, SqliteKnowledgeStore};

/// One line of the ingest file.
#[derive(Debug, Deserialize)]
struct IngestDocument {
    title: String,
    #[serde(default)]
    source: String,
    chunks: Vec<IngestChunk>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum IngestChunk {
    Text(String),
    Detailed {
        content: String,
        #[serde(default)]
        metadata: Metadata,
    },
}

impl IngestChunk {
    fn into_parts(self) -> (String, Metadata) {
        match self {
            Self::Text(content) => (content, Metadata::new()),
            Self::Detailed { content, metadata } => (content, metadata),
        }
    }
}

fn parse_line(line: &str) -> Result<Option<IngestDocument>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    Ok(Some(serde_json::from_str(line)?))
}

/// Handle `kbsearch ingest`.
pub(crate) async fn handle_ingest(
    store: &SqliteKnowledgeStore,
    embedder: &dyn EmbeddingProvider,
    file: &Path,
    batch_size: usize,
) -> Result<()> {
    if batch_size == 0 {
        bail!("--batch-size must be at least 1");
    }

    let content = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?;

    let mut documents = 0;
    let mut chunks = 0;
    for (number, line) in content.lines().enumerate() {
        let Some(document) =
            parse_line(line).with_context(|| format!("Invalid document on line {}", number + 1))?
        else {
            continue;
        };

        chunks += ingest_document(store, embedder, document, batch_size).await?;
        documents += 1;
    }

    info!("Ingested {} documents ({} chunks) from {}", documents, chunks, file.display());
    println!("Ingested {} documents ({} chunks).", documents, chunks);
    Ok(())
}

async fn ingest_document(
    store: &SqliteKnowledgeStore,
    embedder: &dyn EmbeddingProvider,
    document: IngestDocument,
    batch_size: usize,
) -> Result<usize> {
    let document_id = store.add_document(&document.title, &document.source).await?;
    let parts: Vec<(String, Metadata)> = document
        .chunks
        .into_iter()
        .map(IngestChunk::into_parts)
        .filter(|(content, _)| !content.trim().is_empty())
        .collect();

    match store_chunks(store, embedder, &document_id, &parts, batch_size).await {
        Ok(stored) => {
            debug!("Stored document '{}' with {} chunks", document.title, stored);
            Ok(stored)
        }
        Err(e) => {
            // Drop the partial document.
            if let Err(cleanup) = store.remove_document(&document_id).await {
                warn!("Failed to remove partial document {}: {}", document_id, cleanup);
            }
            Err(e.context(format!("Failed to ingest '{}'", document.title)))
        }
    }
}

async fn store_chunks(
    store: &SqliteKnowledgeStore,
    embedder: &dyn EmbeddingProvider,
    document_id: &str,
    parts: &[(String, Metadata)],
    batch_size: usize,
) -> Result<usize> {
    let mut index = 0;
    for batch in parts.chunks(batch_size) {
        let texts: Vec<&str> = batch.iter().map(|(content, _)| content.as_str()).collect();
        let embeddings = embedder
            .embed_batch(&texts)
            .await
            .context("Failed to embed chunks")?;

        for ((content, metadata), embedding) in batch.iter().zip(embeddings) {
            let chunk = NewChunk::new(document_id, index, content.as_str())
                .with_metadata(metadata.clone())
                .with_embedding(embedding.vector);
            store.add_chunk(chunk).await?;
            index += 1;
        }
    }
    Ok(index)
}
