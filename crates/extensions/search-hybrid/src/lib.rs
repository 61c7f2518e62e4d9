//! Hybrid knowledge base search for kbsearch.
//!
//! Runs a vector-similarity branch and a fuzzy full-text branch
//! concurrently and merges their rankings with Reciprocal Rank Fusion.
//!
//! ## How It Works
//!
//! 1. [`KnowledgeBase`] validates the query, count and mode
//! 2. [`HybridSearcher`] dispatches the branch(es) for the mode; in hybrid
//!    mode both run in parallel, each asking for twice the requested count
//! 3. A failing branch degrades to an empty contribution instead of an error
//! 4. [`rrf_fuse`] merges the rankings, deduplicating by chunk id
//! 5. The fused list is cut to the requested count

mod branch;
mod fusion;
mod knowledge_base;
mod orchestrator;

#[cfg(test)]
mod testing;

pub use branch::BranchOutcome;
pub use fusion::{rrf_fuse, RRF_K};
pub use knowledge_base::{format_transcript, KnowledgeBase, SearchRequest, NO_RESULTS_MESSAGE};
pub use orchestrator::{BranchReport, HybridSearcher, SearchOutcome, SearchPhase, SearchServices};
