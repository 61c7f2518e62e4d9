//! Index implementations over the SQLite store.

use std::cmp::Ordering;
use std::collections::HashMap;

use async_trait::async_trait;
use rusqlite::params_from_iter;
use tracing::debug;

use kbsearch_protocols::{
    cosine_similarity, DocumentInfo, DocumentStore, FuzzyOptions, HitStream, IndexError, RawHit,
    TextIndex, VectorIndex,
};

use crate::error::StoreError;
use crate::fuzzy::{exact_prefix, match_expression, tokenize, within_edits};
use crate::store::{decode_metadata, decode_vector, SqliteKnowledgeStore};

/// Row shape shared by both indexes before metadata decoding.
struct ChunkRow {
    chunk_id: String,
    document_id: String,
    content: String,
    metadata: String,
    score: f64,
}

impl ChunkRow {
    fn into_hit(self) -> Result<RawHit, IndexError> {
        let metadata = decode_metadata(&self.metadata).map_err(IndexError::from)?;
        Ok(RawHit {
            chunk_id: self.chunk_id,
            document_id: self.document_id,
            content: self.content,
            score: self.score,
            metadata,
        })
    }
}

/// Rows become a cursor; a row with undecodable metadata surfaces as an error item.
fn into_stream(rows: Vec<ChunkRow>) -> HitStream {
    Box::pin(futures::stream::iter(rows.into_iter().map(ChunkRow::into_hit)))
}

#[async_trait]
impl VectorIndex for SqliteKnowledgeStore {
    async fn query(
        &self,
        vector: &[f32],
        candidate_pool: usize,
        limit: usize,
    ) -> Result<HitStream, IndexError> {
        let query = vector.to_vec();
        let dimension = query.len() as i64;

        let scored = self
            .conn
            .call(move |conn| {
                let mut stmt = conn.prepare(
                    "SELECT id, document_id, content, metadata, embedding
                     FROM chunks
                     WHERE embedding IS NOT NULL AND dimension = ?1
                     ORDER BY rowid",
                )?;
                let rows = stmt
                    .query_map([dimension], |row| {
                        Ok((
                            ChunkRow {
                                chunk_id: row.get(0)?,
                                document_id: row.get(1)?,
                                content: row.get(2)?,
                                metadata: row.get(3)?,
                                score: 0.0,
                            },
                            row.get::<_, Vec<u8>>(4)?,
                        ))
                    })?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(rows)
            })
            .await
            .map_err(|e| IndexError::from(StoreError::from(e)))?;

        let mut candidates = Vec::with_capacity(scored.len());
        for (mut row, blob) in scored {
            let embedding = decode_vector(&blob).map_err(IndexError::from)?;
            row.score = f64::from(cosine_similarity(&query, &embedding));
            candidates.push(row);
        }

        // Stable: equal similarity keeps insertion order. The scan is exhaustive,
        // so the candidate pool only caps how many neighbours are ranked.
        candidates.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        candidates.truncate(candidate_pool.min(limit));

        debug!("Vector query matched {} chunks", candidates.len());
        Ok(into_stream(candidates))
    }
}

#[async_trait]
impl TextIndex for SqliteKnowledgeStore {
    async fn query(
        &self,
        text: &str,
        fuzzy: FuzzyOptions,
        limit: usize,
    ) -> Result<HitStream, IndexError> {
        let tokens = tokenize(text);
        if tokens.is_empty() || limit == 0 {
            return Ok(into_stream(Vec::new()));
        }

        let rows = self
            .conn
            .call(move |conn| {
                let mut terms: Vec<String> = Vec::new();
                let mut vocab = conn.prepare(
                    "SELECT term FROM chunks_vocab WHERE substr(term, 1, ?2) = ?1",
                )?;

                for token in &tokens {
                    if token.chars().count() < fuzzy.prefix_length {
                        if !terms.contains(token) {
                            terms.push(token.clone());
                        }
                        continue;
                    }

                    let prefix = exact_prefix(token, fuzzy.prefix_length);
                    let prefix_len = prefix.chars().count() as i64;
                    let candidates = vocab
                        .query_map(rusqlite::params![prefix, prefix_len], |row| {
                            row.get::<_, String>(0)
                        })?
                        .collect::<Result<Vec<_>, _>>()?;

                    for term in candidates {
                        if within_edits(token, &term, usize::from(fuzzy.max_edits))
                            && !terms.contains(&term)
                        {
                            terms.push(term);
                        }
                    }
                }

                let Some(expression) = match_expression(&terms) else {
                    return Ok(Vec::new());
                };

                let mut stmt = conn.prepare(
                    "SELECT c.id, c.document_id, c.content, c.metadata, bm25(chunks_fts) AS rank
                     FROM chunks_fts
                     JOIN chunks c ON c.rowid = chunks_fts.rowid
                     WHERE chunks_fts MATCH ?1
                     ORDER BY rank, c.rowid
                     LIMIT ?2",
                )?;
                let rows = stmt
                    .query_map(rusqlite::params![expression, limit as i64], |row| {
                        Ok(ChunkRow {
                            chunk_id: row.get(0)?,
                            document_id: row.get(1)?,
                            content: row.get(2)?,
                            metadata: row.get(3)?,
                            // bm25() is lower-is-better; flip it into a relevance.
                            score: -row.get::<_, f64>(4)?,
                        })
                    })?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(rows)
            })
            .await
            .map_err(|e| IndexError::from(StoreError::from(e)))?;

        debug!("Text query matched {} chunks", rows.len());
        Ok(into_stream(rows))
    }
}

#[async_trait]
impl DocumentStore for SqliteKnowledgeStore {
    async fn resolve(
        &self,
        document_ids: &[String],
    ) -> Result<HashMap<String, DocumentInfo>, IndexError> {
        if document_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let ids = document_ids.to_vec();
        self.conn
            .call(move |conn| {
                let placeholders = vec!["?"; ids.len()].join(",");
                let sql = format!(
                    "SELECT id, title, source FROM documents WHERE id IN ({})",
                    placeholders
                );
                let mut stmt = conn.prepare(&sql)?;
                let documents = stmt
                    .query_map(params_from_iter(ids.iter()), |row| {
                        Ok((
                            row.get::<_, String>(0)?,
                            DocumentInfo {
                                title: row.get(1)?,
                                source: row.get(2)?,
                            },
                        ))
                    })?
                    .collect::<Result<HashMap<_, _>, _>>()?;
                Ok(documents)
            })
            .await
            .map_err(|e| IndexError::from(StoreError::from(e)))
    }
}

#[cfg(test)]
#[path = "search_tests.rs"]
mod tests;
