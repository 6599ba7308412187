//! Capability traits at the seams of the pipeline.
//!
//! The embedding backend and the vector index are external services; the
//! document repository and settings store belong to the caller's persistence
//! layer. Everything here is object-safe so engines can hold `Arc<dyn _>`.

use async_trait::async_trait;

use crate::error::Result;
use crate::filter::Filter;
use crate::settings::EmbeddingSettings;
use crate::types::{DistanceMetric, DocumentStatus, IndexPoint, SearchResult};

/// Converts text to fixed-length vectors. One adapter per backend; no retry
/// at this layer — retries, if any, belong to the caller.
#[async_trait]
pub trait EmbeddingBackend: std::fmt::Debug + Send + Sync {
    /// Configuration string this backend is selected by (e.g. `"ollama"`).
    fn provider(&self) -> &str;

    /// Embed one text with the named model.
    async fn embed(&self, model: &str, text: &str) -> Result<Vec<f32>>;

    /// Model identifiers the backend currently serves.
    async fn list_models(&self) -> Result<Vec<String>>;
}

/// Selects an [`EmbeddingBackend`] from resolved embedding settings.
///
/// Implemented as a factory keyed on the provider string so the pipeline and
/// the retrieval engine pick up configuration changes at processing/query
/// time rather than at construction.
pub trait BackendSelector: Send + Sync {
    fn select(&self, settings: &EmbeddingSettings) -> Result<std::sync::Arc<dyn EmbeddingBackend>>;
}

/// Stores and retrieves vectors with payloads, against a single logical
/// collection per deployment.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Idempotent: checks existence first, creates only if absent.
    async fn ensure_collection(&self, vector_size: usize, metric: DistanceMetric) -> Result<()>;

    /// Replaces or inserts by point identity.
    async fn upsert(&self, points: Vec<IndexPoint>) -> Result<()>;

    /// Similarity search, descending by score.
    async fn search(
        &self,
        vector: &[f32],
        limit: usize,
        filter: Option<Filter>,
    ) -> Result<Vec<SearchResult>>;

    /// Removes every point matching the filter, returning how many points
    /// were scoped. Fails on an empty filter: an empty filter must never
    /// resolve to "delete everything".
    async fn delete_by_filter(&self, filter: Filter) -> Result<u64>;

    /// Number of points matching the filter; diagnostic/health use.
    async fn count(&self, filter: Option<Filter>) -> Result<u64>;
}

/// The slice of the caller's persistence layer the pipeline mutates.
#[async_trait]
pub trait DocumentRepository: Send + Sync {
    async fn update_status(&self, document_id: &str, status: DocumentStatus) -> Result<()>;
    async fn update_chunk_count(&self, document_id: &str, chunk_count: usize) -> Result<()>;
}

/// Named configuration values owned by the excluded persistence layer.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;
}
