//! Retrieval branches.
//!
//! A branch never returns an error: any embedding, index, cursor or
//! document lookup failure is logged with its [`FailureKind`] and turned
//! into [`BranchOutcome::Degraded`].

use std::collections::HashSet;

use futures::StreamExt;
use tracing::{debug, warn};

use kbsearch_protocols::{
    Branch, DocumentStore, FailureKind, FuzzyOptions, HitStream, IndexError, RawHit, SearchResult,
};

use crate::orchestrator::SearchServices;

/// Terminal state of one branch.
#[derive(Debug, Clone, PartialEq)]
pub enum BranchOutcome {
    /// Ranked results, best first. May be empty.
    Completed(Vec<SearchResult>),
    /// The branch failed and contributes nothing.
    Degraded(FailureKind),
}

impl BranchOutcome {
    /// Results contributed to fusion; empty when degraded.
    pub fn results(&self) -> &[SearchResult] {
        match self {
            Self::Completed(results) => results,
            Self::Degraded(_) => &[],
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded(_))
    }

    pub fn failure(&self) -> Option<FailureKind> {
        match self {
            Self::Completed(_) => None,
            Self::Degraded(kind) => Some(*kind),
        }
    }

    fn from_result(branch: Branch, result: Result<Vec<SearchResult>, FailureKind>) -> Self {
        match result {
            Ok(results) => {
                debug!("{} branch completed with {} results", branch, results.len());
                Self::Completed(results)
            }
            Err(kind) => Self::Degraded(kind),
        }
    }
}

/// Neighbour pool handed to the vector index for a given fetch count.
pub(crate) fn candidate_pool(num_candidates: usize, fetch_count: usize) -> usize {
    num_candidates.max(fetch_count.saturating_mul(10))
}

/// Embed the query, ask the vector index for its nearest chunks and attach
/// document labels. Results are ordered by cosine similarity.
pub(crate) async fn run_vector(
    services: &SearchServices,
    query: &str,
    fetch_count: usize,
    num_candidates: usize,
) -> BranchOutcome {
    BranchOutcome::from_result(
        Branch::Vector,
        vector_results(services, query, fetch_count, num_candidates).await,
    )
}

async fn vector_results(
    services: &SearchServices,
    query: &str,
    fetch_count: usize,
    num_candidates: usize,
) -> Result<Vec<SearchResult>, FailureKind> {
    let embedding = services.embedder.embed(query).await.map_err(|e| {
        let kind = e.classify();
        warn!("Vector branch degraded ({}): embedding failed: {}", kind, e);
        kind
    })?;

    let pool = candidate_pool(num_candidates, fetch_count);
    debug!(
        "Vector branch querying index: pool={}, limit={}",
        pool, fetch_count
    );

    let hits = async {
        let stream = services
            .vectors
            .query(&embedding.vector, pool, fetch_count)
            .await?;
        drain(stream, fetch_count).await
    }
    .await
    .map_err(|e| index_failure(Branch::Vector, &e))?;

    attach_documents(services.documents.as_ref(), Branch::Vector, hits).await
}

/// Fuzzy full-text query; results are ordered by the text engine's relevance.
pub(crate) async fn run_text(
    services: &SearchServices,
    query: &str,
    fetch_count: usize,
) -> BranchOutcome {
    BranchOutcome::from_result(Branch::Text, text_results(services, query, fetch_count).await)
}

async fn text_results(
    services: &SearchServices,
    query: &str,
    fetch_count: usize,
) -> Result<Vec<SearchResult>, FailureKind> {
    debug!("Text branch querying index: limit={}", fetch_count);

    let hits = async {
        let stream = services
            .text
            .query(query, FuzzyOptions::default(), fetch_count)
            .await?;
        drain(stream, fetch_count).await
    }
    .await
    .map_err(|e| index_failure(Branch::Text, &e))?;

    attach_documents(services.documents.as_ref(), Branch::Text, hits).await
}

fn index_failure(branch: Branch, error: &IndexError) -> FailureKind {
    let kind = error.classify();
    warn!("{} branch degraded ({}): index query failed: {}", branch, kind, error);
    kind
}

/// Read the cursor to its end, keeping the first `limit` hits.
async fn drain(mut stream: HitStream, limit: usize) -> Result<Vec<RawHit>, IndexError> {
    let mut hits = Vec::with_capacity(limit.min(256));
    while let Some(hit) = stream.next().await {
        let hit = hit?;
        if hits.len() < limit {
            hits.push(hit);
        }
    }
    Ok(hits)
}

/// Resolve parent documents in one batch. Hits whose document is gone are dropped.
async fn attach_documents(
    documents: &dyn DocumentStore,
    branch: Branch,
    hits: Vec<RawHit>,
) -> Result<Vec<SearchResult>, FailureKind> {
    if hits.is_empty() {
        return Ok(Vec::new());
    }

    let mut seen = HashSet::new();
    let ids: Vec<String> = hits
        .iter()
        .filter(|hit| seen.insert(hit.document_id.as_str()))
        .map(|hit| hit.document_id.clone())
        .collect();

    let resolved = documents.resolve(&ids).await.map_err(|e| {
        let kind = e.classify();
        warn!("{} branch degraded ({}): document lookup failed: {}", branch, kind, e);
        kind
    })?;

    let mut results = Vec::with_capacity(hits.len());
    for hit in hits {
        match resolved.get(&hit.document_id) {
            Some(document) => results.push(SearchResult::from_hit(hit, document.clone())),
            None => debug!(
                "{} branch dropped chunk {}: document {} not found",
                branch, hit.chunk_id, hit.document_id
            ),
        }
    }
    Ok(results)
}

#[cfg(test)]
#[path = "branch_tests.rs"]
mod tests;
