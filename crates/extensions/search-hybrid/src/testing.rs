//! Hand-written collaborators for search tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use kbsearch_protocols::{
    DocumentInfo, DocumentStore, Embedding, EmbeddingError, EmbeddingProvider, FuzzyOptions,
    HitStream, IndexError, Metadata, RawHit, TextIndex, VectorIndex,
};

use crate::orchestrator::SearchServices;

/// A hit whose document id is `doc-<chunk_id>`.
pub(crate) fn hit(chunk_id: &str, score: f64) -> RawHit {
    RawHit {
        chunk_id: chunk_id.to_string(),
        document_id: format!("doc-{}", chunk_id),
        content: format!("content of {}", chunk_id),
        score,
        metadata: Metadata::new(),
    }
}

/// Hits for `chunk_ids` with descending scores.
pub(crate) fn ranked(chunk_ids: &[&str]) -> Vec<RawHit> {
    chunk_ids
        .iter()
        .enumerate()
        .map(|(i, id)| hit(id, 1.0 - i as f64 * 0.1))
        .collect()
}

pub(crate) struct MockEmbedder {
    failure: Option<fn() -> EmbeddingError>,
    delay: Option<Duration>,
    pub calls: AtomicUsize,
}

impl MockEmbedder {
    pub fn new() -> Self {
        Self {
            failure: None,
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(failure: fn() -> EmbeddingError) -> Self {
        Self {
            failure: Some(failure),
            ..Self::new()
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

#[async_trait]
impl EmbeddingProvider for MockEmbedder {
    async fn embed(&self, _text: &str) -> Result<Embedding, EmbeddingError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match self.failure {
            Some(failure) => Err(failure()),
            None => Ok(Embedding::new(vec![1.0, 0.0])),
        }
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>, EmbeddingError> {
        let mut out = Vec::new();
        for text in texts {
            out.push(self.embed(text).await?);
        }
        Ok(out)
    }

    fn dimension(&self) -> usize {
        2
    }
}

/// Embedder that never answers; records when its future is dropped.
pub(crate) struct PendingEmbedder {
    pub started: Arc<AtomicBool>,
    pub dropped: Arc<AtomicBool>,
}

struct DropFlag(Arc<AtomicBool>);

impl Drop for DropFlag {
    fn drop(&mut self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl EmbeddingProvider for PendingEmbedder {
    async fn embed(&self, _text: &str) -> Result<Embedding, EmbeddingError> {
        self.started.store(true, Ordering::SeqCst);
        let _flag = DropFlag(self.dropped.clone());
        std::future::pending().await
    }

    async fn embed_batch(&self, _texts: &[&str]) -> Result<Vec<Embedding>, EmbeddingError> {
        std::future::pending().await
    }

    fn dimension(&self) -> usize {
        2
    }
}

/// Index returning its configured hits regardless of `limit`.
pub(crate) struct MockIndex {
    hits: Vec<RawHit>,
    failure: Option<fn() -> IndexError>,
    stream_failure_at: Option<usize>,
    pub calls: AtomicUsize,
    pub last_pool: Mutex<Option<usize>>,
    pub last_limit: Mutex<Option<usize>>,
    pub last_fuzzy: Mutex<Option<FuzzyOptions>>,
}

impl MockIndex {
    pub fn with_hits(hits: Vec<RawHit>) -> Self {
        Self {
            hits,
            failure: None,
            stream_failure_at: None,
            calls: AtomicUsize::new(0),
            last_pool: Mutex::new(None),
            last_limit: Mutex::new(None),
            last_fuzzy: Mutex::new(None),
        }
    }

    pub fn empty() -> Self {
        Self::with_hits(Vec::new())
    }

    pub fn failing(failure: fn() -> IndexError) -> Self {
        Self {
            failure: Some(failure),
            ..Self::empty()
        }
    }

    /// The cursor yields an error item at `position`.
    pub fn with_stream_failure_at(mut self, position: usize) -> Self {
        self.stream_failure_at = Some(position);
        self
    }

    fn respond(&self, limit: usize) -> Result<HitStream, IndexError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_limit.lock().unwrap() = Some(limit);
        if let Some(failure) = self.failure {
            return Err(failure());
        }

        let mut items: Vec<Result<RawHit, IndexError>> =
            self.hits.iter().cloned().map(Ok).collect();
        if let Some(position) = self.stream_failure_at {
            items.insert(
                position.min(items.len()),
                Err(IndexError::Malformed("truncated hit".to_string())),
            );
        }
        Ok(Box::pin(futures::stream::iter(items)))
    }
}

#[async_trait]
impl VectorIndex for MockIndex {
    async fn query(
        &self,
        _vector: &[f32],
        candidate_pool: usize,
        limit: usize,
    ) -> Result<HitStream, IndexError> {
        *self.last_pool.lock().unwrap() = Some(candidate_pool);
        self.respond(limit)
    }
}

#[async_trait]
impl TextIndex for MockIndex {
    async fn query(
        &self,
        _text: &str,
        fuzzy: FuzzyOptions,
        limit: usize,
    ) -> Result<HitStream, IndexError> {
        *self.last_fuzzy.lock().unwrap() = Some(fuzzy);
        self.respond(limit)
    }
}

/// Resolves `doc-<x>` to title `Title <x>`, source `<x>.md`, except ids listed as missing.
pub(crate) struct MockDocuments {
    missing: Vec<String>,
    failure: Option<fn() -> IndexError>,
    pub calls: AtomicUsize,
    pub last_ids: Mutex<Vec<String>>,
}

impl MockDocuments {
    pub fn new() -> Self {
        Self {
            missing: Vec::new(),
            failure: None,
            calls: AtomicUsize::new(0),
            last_ids: Mutex::new(Vec::new()),
        }
    }

    pub fn with_missing(mut self, document_id: &str) -> Self {
        self.missing.push(document_id.to_string());
        self
    }

    pub fn failing(failure: fn() -> IndexError) -> Self {
        Self {
            failure: Some(failure),
            ..Self::new()
        }
    }
}

#[async_trait]
impl DocumentStore for MockDocuments {
    async fn resolve(
        &self,
        document_ids: &[String],
    ) -> Result<HashMap<String, DocumentInfo>, IndexError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_ids.lock().unwrap() = document_ids.to_vec();
        if let Some(failure) = self.failure {
            return Err(failure());
        }

        Ok(document_ids
            .iter()
            .filter(|id| !self.missing.contains(*id))
            .map(|id| {
                let name = id.trim_start_matches("doc-");
                (
                    id.clone(),
                    DocumentInfo::new(format!("Title {}", name), format!("{}.md", name)),
                )
            })
            .collect())
    }
}

/// Mock collaborators kept reachable for assertions after a search.
pub(crate) struct Fixture {
    pub embedder: Arc<MockEmbedder>,
    pub vectors: Arc<MockIndex>,
    pub text: Arc<MockIndex>,
    pub documents: Arc<MockDocuments>,
}

impl Fixture {
    pub fn new(
        embedder: MockEmbedder,
        vectors: MockIndex,
        text: MockIndex,
        documents: MockDocuments,
    ) -> Self {
        Self {
            embedder: Arc::new(embedder),
            vectors: Arc::new(vectors),
            text: Arc::new(text),
            documents: Arc::new(documents),
        }
    }

    /// Healthy collaborators returning the given rankings.
    pub fn ranked(vector: &[&str], text: &[&str]) -> Self {
        Self::new(
            MockEmbedder::new(),
            MockIndex::with_hits(ranked(vector)),
            MockIndex::with_hits(ranked(text)),
            MockDocuments::new(),
        )
    }

    pub fn services(&self) -> SearchServices {
        SearchServices::new(
            self.embedder.clone(),
            self.vectors.clone(),
            self.text.clone(),
            self.documents.clone(),
        )
    }

    /// Calls made to any collaborator.
    pub fn total_calls(&self) -> usize {
        self.embedder.calls.load(Ordering::SeqCst)
            + self.vectors.calls.load(Ordering::SeqCst)
            + self.text.calls.load(Ordering::SeqCst)
            + self.documents.calls.load(Ordering::SeqCst)
    }
}
