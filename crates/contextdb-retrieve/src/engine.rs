//! Retrieval entry points: plain semantic and hybrid.
//!
//! Both paths share the contract that augmentation is a pure enhancement:
//! an empty scope, no candidates, or no candidate clearing the threshold
//! returns the original query unchanged. Backend unavailability is the one
//! exception and propagates as an error.

use std::sync::Arc;

use tracing::{debug, info};

use contextdb_core::config::RetrievalConfig;
use contextdb_core::filter::Filter;
use contextdb_core::settings::EmbeddingSettings;
use contextdb_core::traits::{BackendSelector, SettingsStore, VectorIndex};
use contextdb_core::types::{Document, DocumentId, DocumentStatus, SearchResult};
use contextdb_core::Result;

use crate::keywords::{extract_keywords, keyword_score};
use crate::limits::LimitPolicy;
use crate::prompt::{build_prompt, citation_titles};
use crate::scoring::{combine, rerank, HybridResult};

/// What a retrieval call hands back to the caller.
///
/// `augmented` is false when the prompt is the original query untouched;
/// the caller cannot otherwise distinguish "nothing relevant" from "no
/// augmentation available", and is not supposed to.
#[derive(Debug, Clone)]
pub struct RetrievedContext {
    pub prompt: String,
    pub augmented: bool,
    pub citations: Vec<String>,
}

impl RetrievedContext {
    fn passthrough(query: &str) -> Self {
        Self {
            prompt: query.to_string(),
            augmented: false,
            citations: Vec::new(),
        }
    }
}

/// Stateless between calls; every invocation re-resolves the embedding
/// settings so configuration changes take effect at query time.
pub struct RetrievalEngine {
    settings: Arc<dyn SettingsStore>,
    backends: Arc<dyn BackendSelector>,
    index: Arc<dyn VectorIndex>,
    config: RetrievalConfig,
    limits: LimitPolicy,
}

impl RetrievalEngine {
    pub fn new(
        settings: Arc<dyn SettingsStore>,
        backends: Arc<dyn BackendSelector>,
        index: Arc<dyn VectorIndex>,
        config: RetrievalConfig,
    ) -> Self {
        let limits = LimitPolicy::from_config(&config);
        Self {
            settings,
            backends,
            index,
            config,
            limits,
        }
    }

    /// Plain semantic retrieval with the fixed minimum relevance score.
    pub async fn retrieve(
        &self,
        query: &str,
        scope: &[Document],
        limit: usize,
    ) -> Result<RetrievedContext> {
        let Some(results) = self.search(query, scope, limit.max(1)).await? else {
            return Ok(RetrievedContext::passthrough(query));
        };
        let surviving: Vec<&SearchResult> = results
            .iter()
            .filter(|r| r.score >= self.config.min_score)
            .collect();
        if surviving.is_empty() {
            debug!(min_score = self.config.min_score, "no result cleared the cutoff");
            return Ok(RetrievedContext::passthrough(query));
        }
        let texts: Vec<&str> = surviving.iter().map(|r| r.payload.text.as_str()).collect();
        let citations = citation_titles(surviving.iter().map(|r| r.payload.title.as_str()));
        info!(chunks = texts.len(), citations = citations.len(), "assembled context");
        Ok(RetrievedContext {
            prompt: build_prompt(query, &texts),
            augmented: true,
            citations,
        })
    }

    /// Hybrid retrieval: keyword fusion, adaptive threshold, re-ranking.
    pub async fn retrieve_hybrid(
        &self,
        query: &str,
        scope: &[Document],
        limit: usize,
    ) -> Result<RetrievedContext> {
        let candidate_limit = self.limits.candidate_limit(query);
        let Some(results) = self.search(query, scope, candidate_limit).await? else {
            return Ok(RetrievedContext::passthrough(query));
        };

        let keywords = extract_keywords(query);
        let candidates: Vec<HybridResult> = results
            .into_iter()
            .map(|result| {
                let keyword = keyword_score(&result.payload.text, &keywords);
                let combined = combine(
                    result.score,
                    keyword.score,
                    self.config.semantic_weight,
                    self.config.keyword_weight,
                );
                HybridResult {
                    semantic_score: result.score,
                    keyword_score: keyword.score,
                    combined_score: combined,
                    matched_keywords: keyword.matched,
                    result,
                }
            })
            .collect();

        let top = candidates
            .iter()
            .map(|c| c.combined_score)
            .fold(f32::MIN, f32::max);
        let threshold = self.config.adaptive_floor.max(self.config.adaptive_ratio * top);
        let surviving: Vec<HybridResult> = candidates
            .into_iter()
            .filter(|c| c.combined_score >= threshold)
            .collect();
        if surviving.is_empty() {
            debug!(threshold, "no candidate cleared the adaptive threshold");
            return Ok(RetrievedContext::passthrough(query));
        }

        let budget = self.limits.retained_budget(limit, &surviving);
        let ranked = rerank(surviving, budget);
        let texts: Vec<&str> = ranked.iter().map(|c| c.result.payload.text.as_str()).collect();
        let citations = citation_titles(ranked.iter().map(|c| c.result.payload.title.as_str()));
        info!(
            chunks = texts.len(),
            threshold,
            citations = citations.len(),
            "assembled hybrid context"
        );
        Ok(RetrievedContext {
            prompt: build_prompt(query, &texts),
            augmented: true,
            citations,
        })
    }

    /// Embeds the query and searches within the scope's ready documents.
    /// Returns `None` when the scope has no ready documents or the index
    /// returned nothing.
    async fn search(
        &self,
        query: &str,
        scope: &[Document],
        limit: usize,
    ) -> Result<Option<Vec<SearchResult>>> {
        let ready: Vec<&DocumentId> = scope
            .iter()
            .filter(|d| d.status == DocumentStatus::Ready)
            .map(|d| &d.id)
            .collect();
        if ready.is_empty() {
            debug!("no ready documents in scope");
            return Ok(None);
        }

        let settings = EmbeddingSettings::resolve(self.settings.as_ref()).await?;
        let backend = self.backends.select(&settings)?;
        let vector = backend.embed(&settings.model, query).await?;
        let results = self
            .index
            .search(&vector, limit, Some(Filter::for_any_document(ready)))
            .await?;
        if results.is_empty() {
            return Ok(None);
        }
        Ok(Some(results))
    }
}
