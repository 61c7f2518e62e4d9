//! Fan-out of a query to the branches selected by the search mode.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, error, info};

use kbsearch_protocols::{
    Branch, DocumentStore, EmbeddingProvider, SearchMode, SearchResult, TextIndex, VectorIndex,
};

use crate::branch::{run_text, run_vector, BranchOutcome};
use crate::fusion::rrf_fuse;

/// Collaborators shared by every search. Built once at startup.
#[derive(Clone)]
pub struct SearchServices {
    pub embedder: Arc<dyn EmbeddingProvider>,
    pub vectors: Arc<dyn VectorIndex>,
    pub text: Arc<dyn TextIndex>,
    pub documents: Arc<dyn DocumentStore>,
}

impl SearchServices {
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        vectors: Arc<dyn VectorIndex>,
        text: Arc<dyn TextIndex>,
        documents: Arc<dyn DocumentStore>,
    ) -> Self {
        Self {
            embedder,
            vectors,
            text,
            documents,
        }
    }

    /// Use one backend for the vector index, text index and document store.
    pub fn from_store<S>(embedder: Arc<dyn EmbeddingProvider>, store: Arc<S>) -> Self
    where
        S: VectorIndex + TextIndex + DocumentStore + 'static,
    {
        Self {
            embedder,
            vectors: store.clone(),
            text: store.clone(),
            documents: store,
        }
    }
}

/// Lifecycle of one search, as logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchPhase {
    Created,
    Dispatched,
    Running,
    Completed,
    Degraded,
    Fused,
    Truncated,
    Returned,
}

impl SearchPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Dispatched => "dispatched",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Degraded => "degraded",
            Self::Fused => "fused",
            Self::Truncated => "truncated",
            Self::Returned => "returned",
        }
    }
}

impl fmt::Display for SearchPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How one branch finished.
#[derive(Debug, Clone, PartialEq)]
pub struct BranchReport {
    pub branch: Branch,
    pub outcome: BranchOutcome,
    pub elapsed: Duration,
}

/// Final results together with per-branch reports, in dispatch order.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome {
    pub results: Vec<SearchResult>,
    pub branches: Vec<BranchReport>,
}

impl SearchOutcome {
    /// True when at least one branch failed.
    pub fn is_degraded(&self) -> bool {
        self.branches.iter().any(|r| r.outcome.is_degraded())
    }

    /// True when every dispatched branch failed.
    pub fn all_failed(&self) -> bool {
        !self.branches.is_empty() && self.branches.iter().all(|r| r.outcome.is_degraded())
    }
}

/// Dispatches branches and fuses their rankings.
#[derive(Clone)]
pub struct HybridSearcher {
    services: SearchServices,
    num_candidates: usize,
}

impl HybridSearcher {
    /// `num_candidates` is the minimum neighbour pool for the vector index.
    pub fn new(services: SearchServices, num_candidates: usize) -> Self {
        Self {
            services,
            num_candidates,
        }
    }

    /// Run `query` in `mode` and return at most `match_count` results.
    ///
    /// Never fails: a failing branch contributes nothing, and when every
    /// branch fails the result is empty. Hybrid mode runs both branches
    /// concurrently, each fetching `2 × match_count`, then fuses them.
    /// Single-branch modes fetch `match_count` and keep the branch's own
    /// scores. Dropping the returned future cancels in-flight branch calls.
    pub async fn run(&self, query: &str, match_count: usize, mode: SearchMode) -> SearchOutcome {
        let started = Instant::now();
        debug!("Search {}: mode={}, match_count={}", SearchPhase::Created, mode, match_count);

        let outcome = match mode.branches() {
            [branch] => self.run_single(*branch, query, match_count).await,
            _ => self.run_hybrid(query, match_count).await,
        };

        if outcome.all_failed() {
            error!("All {} search branches failed for query", outcome.branches.len());
        }
        debug!("Search {}: {} results", SearchPhase::Returned, outcome.results.len());
        info!(
            "Search completed: mode={}, results={}, degraded={}, elapsed={:?}",
            mode,
            outcome.results.len(),
            outcome.is_degraded(),
            started.elapsed()
        );
        outcome
    }

    async fn run_hybrid(&self, query: &str, match_count: usize) -> SearchOutcome {
        let fetch_count = match_count.saturating_mul(2);
        debug!(
            "Search {}: branches=[vector, text], fetch_count={}",
            SearchPhase::Dispatched,
            fetch_count
        );

        let (vector, text) = tokio::join!(
            timed(
                Branch::Vector,
                run_vector(&self.services, query, fetch_count, self.num_candidates)
            ),
            timed(Branch::Text, run_text(&self.services, query, fetch_count))
        );

        let fused = rrf_fuse(&[vector.outcome.results(), text.outcome.results()], None);
        debug!("Search {}: {} unique chunks", SearchPhase::Fused, fused.len());

        let mut results = fused;
        results.truncate(match_count);
        debug!("Search {}: kept {}", SearchPhase::Truncated, results.len());

        SearchOutcome {
            results,
            branches: vec![vector, text],
        }
    }

    async fn run_single(&self, branch: Branch, query: &str, match_count: usize) -> SearchOutcome {
        debug!(
            "Search {}: branches=[{}], fetch_count={}",
            SearchPhase::Dispatched,
            branch,
            match_count
        );

        let report = match branch {
            Branch::Vector => {
                timed(
                    branch,
                    run_vector(&self.services, query, match_count, self.num_candidates),
                )
                .await
            }
            Branch::Text => timed(branch, run_text(&self.services, query, match_count)).await,
        };

        let mut results = report.outcome.results().to_vec();
        results.truncate(match_count);
        debug!("Search {}: kept {}", SearchPhase::Truncated, results.len());

        SearchOutcome {
            results,
            branches: vec![report],
        }
    }
}

async fn timed<F>(branch: Branch, run: F) -> BranchReport
where
    F: Future<Output = BranchOutcome>,
{
    let started = Instant::now();
    debug!("{} branch {}", branch, SearchPhase::Running);

    let outcome = run.await;
    let elapsed = started.elapsed();

    let phase = if outcome.is_degraded() {
        SearchPhase::Degraded
    } else {
        SearchPhase::Completed
    };
    debug!("{} branch {} after {:?}", branch, phase, elapsed);

    BranchReport {
        branch,
        outcome,
        elapsed,
    }
}

#[cfg(test)]
#[path = "orchestrator_tests.rs"]
mod tests;
