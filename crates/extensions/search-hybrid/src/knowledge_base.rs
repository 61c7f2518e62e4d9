//! Query façade used by the agent tool and the CLI.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use kbsearch_config::SearchConfig;
use kbsearch_protocols::{SearchError, SearchMode, SearchResult, ValidationError};

use crate::orchestrator::{HybridSearcher, SearchOutcome, SearchServices};

/// Transcript returned when nothing matched or every branch failed.
pub const NO_RESULTS_MESSAGE: &str = "No relevant information found in the knowledge base.";

/// Raw search arguments as supplied by a calling agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    /// Defaults to `search.default_match_count`.
    #[serde(default)]
    pub match_count: Option<i64>,
    /// `hybrid`, `semantic` or `text`; defaults to `search.default_mode`.
    #[serde(default)]
    pub search_type: Option<String>,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            match_count: None,
            search_type: None,
        }
    }

    pub fn with_match_count(mut self, match_count: i64) -> Self {
        self.match_count = Some(match_count);
        self
    }

    pub fn with_search_type(mut self, search_type: impl Into<String>) -> Self {
        self.search_type = Some(search_type.into());
        self
    }
}

/// Validating entry point over [`HybridSearcher`].
#[derive(Clone)]
pub struct KnowledgeBase {
    searcher: HybridSearcher,
    config: SearchConfig,
}

impl KnowledgeBase {
    pub fn new(services: SearchServices, config: SearchConfig) -> Self {
        Self {
            searcher: HybridSearcher::new(services, config.num_candidates),
            config,
        }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Search and return at most `match_count` results, best first.
    pub async fn search(
        &self,
        query: &str,
        match_count: usize,
        mode: SearchMode,
    ) -> Result<Vec<SearchResult>, SearchError> {
        Ok(self.search_detailed(query, match_count, mode).await?.results)
    }

    /// Like [`search`](Self::search), also reporting how each branch finished.
    pub async fn search_detailed(
        &self,
        query: &str,
        match_count: usize,
        mode: SearchMode,
    ) -> Result<SearchOutcome, SearchError> {
        let count = i64::try_from(match_count).unwrap_or(i64::MAX);
        let (query, match_count) = self.validate(query, count)?;
        Ok(self.searcher.run(query, match_count, mode).await)
    }

    /// Validate raw agent arguments, search and render the transcript.
    pub async fn search_knowledge_base(
        &self,
        request: SearchRequest,
    ) -> Result<String, SearchError> {
        let count = match request.match_count {
            Some(count) => count,
            None => i64::try_from(self.config.default_match_count).unwrap_or(i64::MAX),
        };

        let validated = self.validate(&request.query, count).and_then(|(query, match_count)| {
            let mode = match request.search_type.as_deref() {
                Some(search_type) => search_type.parse::<SearchMode>()?,
                None => self.config.default_mode,
            };
            Ok((query, match_count, mode))
        });
        let (query, match_count, mode) = validated.inspect_err(|e| {
            warn!("Rejected knowledge base search: {}", e);
        })?;

        let outcome = self.searcher.run(query, match_count, mode).await;
        Ok(format_transcript(&outcome.results))
    }

    /// Check the query and count before anything is dispatched.
    fn validate<'q>(
        &self,
        query: &'q str,
        match_count: i64,
    ) -> Result<(&'q str, usize), ValidationError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(ValidationError::EmptyQuery);
        }

        let max = self.config.max_match_count;
        let invalid = ValidationError::InvalidMatchCount {
            value: match_count,
            max,
        };
        let count = usize::try_from(match_count).map_err(|_| invalid.clone())?;
        if count == 0 || count > max {
            return Err(invalid);
        }

        debug!("Validated search: match_count={}", count);
        Ok((query, count))
    }
}

/// Render results as the plain-text transcript handed back to the agent.
pub fn format_transcript(results: &[SearchResult]) -> String {
    if results.is_empty() {
        return NO_RESULTS_MESSAGE.to_string();
    }

    let mut lines = vec![format!("Found {} relevant documents:", results.len())];
    for (i, result) in results.iter().enumerate() {
        lines.push(String::new());
        lines.push(format!(
            "--- Document {}: {} (relevance: {:.2}) ---",
            i + 1,
            result.document_title,
            result.score
        ));
        lines.push(result.content.clone());
        if !result.document_source.is_empty() {
            lines.push(format!("Source: {}", result.document_source));
        }
    }
    lines.join("\n")
}

#[cfg(test)]
#[path = "knowledge_base_tests.rs"]
mod tests;
