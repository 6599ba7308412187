//! Score fusion and re-ranking.

use contextdb_core::types::SearchResult;

/// One candidate chunk with its fused score breakdown.
#[derive(Debug, Clone)]
pub struct HybridResult {
    pub result: SearchResult,
    pub semantic_score: f32,
    pub keyword_score: f32,
    pub combined_score: f32,
    pub matched_keywords: Vec<String>,
}

/// Weighted sum of the semantic and keyword scores. Weights summing to
/// zero fall back to the 0.7/0.3 defaults instead of zeroing every result.
pub fn combine(
    semantic_score: f32,
    keyword_score: f32,
    semantic_weight: f32,
    keyword_weight: f32,
) -> f32 {
    let (ws, wk) = if (semantic_weight + keyword_weight).abs() < f32::EPSILON {
        (0.7, 0.3)
    } else {
        (semantic_weight, keyword_weight)
    };
    semantic_score * ws + keyword_score * wk
}

/// Re-ranks candidates: sorts by combined score, applies a linear positional
/// decay (1.0 at rank 0 down to 0.9 at the last rank) and a 0.8 length
/// penalty for chunks under 100 characters, then re-sorts and truncates to
/// the retained budget.
pub fn rerank(mut candidates: Vec<HybridResult>, budget: usize) -> Vec<HybridResult> {
    if candidates.is_empty() {
        return candidates;
    }
    candidates.sort_by(|a, b| b.combined_score.total_cmp(&a.combined_score));
    let last = candidates.len() - 1;
    for (rank, candidate) in candidates.iter_mut().enumerate() {
        let decay = if last == 0 {
            1.0
        } else {
            1.0 - 0.1 * rank as f32 / last as f32
        };
        let length_penalty = if candidate.result.payload.text.chars().count() < 100 {
            0.8
        } else {
            1.0
        };
        candidate.combined_score *= decay * length_penalty;
    }
    candidates.sort_by(|a, b| b.combined_score.total_cmp(&a.combined_score));
    candidates.truncate(budget);
    candidates
}
