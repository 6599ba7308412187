//! Dynamic candidate and retention limits.
//!
//! Both limits are tunable heuristics. The hard contracts: the candidate
//! limit is always >= 1, and the retained budget never exceeds the number
//! of candidates available.

use std::collections::BTreeSet;

use contextdb_core::config::RetrievalConfig;

use crate::scoring::HybridResult;

/// Scales retrieval limits with query complexity and the observed score
/// distribution.
#[derive(Debug, Clone)]
pub struct LimitPolicy {
    pub base_candidates: usize,
    pub max_candidates: usize,
}

impl Default for LimitPolicy {
    fn default() -> Self {
        Self {
            base_candidates: 10,
            max_candidates: 40,
        }
    }
}

impl LimitPolicy {
    pub fn from_config(config: &RetrievalConfig) -> Self {
        Self {
            base_candidates: config.base_candidates,
            max_candidates: config.max_candidates,
        }
    }

    /// How many candidates to request from the index for this query.
    /// Longer and multi-clause queries ask for more.
    pub fn candidate_limit(&self, query: &str) -> usize {
        let words = query.split_whitespace().count();
        let clauses = query.matches([',', ';', '?']).count();
        let scaled = self.base_candidates + (words / 4) * 2 + clauses * 5;
        scaled.clamp(1, self.max_candidates.max(1))
    }

    /// How many candidates to keep after re-ranking. Starts from the
    /// caller's requested limit and adjusts on score quality and the
    /// number of distinct documents represented.
    pub fn retained_budget(&self, requested: usize, candidates: &[HybridResult]) -> usize {
        if candidates.is_empty() {
            return 0;
        }
        let top = candidates
            .iter()
            .map(|c| c.combined_score)
            .fold(f32::MIN, f32::max);
        let mean = candidates.iter().map(|c| c.combined_score).sum::<f32>()
            / candidates.len() as f32;
        let distinct: BTreeSet<&str> = candidates
            .iter()
            .map(|c| c.result.payload.document_id.as_str())
            .collect();

        let mut budget = requested.max(1);
        if top > 0.85 {
            budget += 2;
        }
        if mean < 0.3 {
            budget = budget.saturating_sub(1);
        }
        budget += (distinct.len().saturating_sub(1)).min(3);
        budget.clamp(1, candidates.len())
    }
}
