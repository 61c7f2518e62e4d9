//! Reciprocal Rank Fusion.

use std::cmp::Ordering;
use std::collections::HashMap;

use kbsearch_protocols::SearchResult;

/// RRF smoothing constant. Fixed so fused scores are comparable between calls.
pub const RRF_K: f64 = 60.0;

/// Merge ranked lists with Reciprocal Rank Fusion.
///
/// Each list contributes `1 / (RRF_K + rank)` per result, with zero-based
/// ranks in the list's own order; contributions are summed per `chunk_id`.
/// The fused score replaces the branch score. Content and metadata come
/// from the first list (in the order given) that produced the chunk.
///
/// Output is sorted by fused score, descending. The sort is stable, so
/// exact ties keep the order in which chunks first appeared. `limit`
/// truncates the result; `None` keeps everything.
pub fn rrf_fuse<L>(lists: &[L], limit: Option<usize>) -> Vec<SearchResult>
where
    L: AsRef<[SearchResult]>,
{
    let mut fused: Vec<SearchResult> = Vec::new();
    let mut positions: HashMap<&str, usize> = HashMap::new();

    for list in lists {
        for (rank, result) in list.as_ref().iter().enumerate() {
            let contribution = 1.0 / (RRF_K + rank as f64);
            match positions.get(result.chunk_id.as_str()) {
                Some(&index) => fused[index].score += contribution,
                None => {
                    positions.insert(result.chunk_id.as_str(), fused.len());
                    fused.push(result.clone().with_score(contribution));
                }
            }
        }
    }

    fused.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));

    if let Some(limit) = limit {
        fused.truncate(limit);
    }
    fused
}

#[cfg(test)]
#[path = "fusion_tests.rs"]
mod tests;
