//! Orchestration of one document's processing run.
//!
//! Invariants enforced here:
//! - runs for the same document id are serialized through a per-document
//!   lock, so two concurrent submissions cannot interleave index writes
//! - stale points are deleted immediately before the replacement batch is
//!   upserted, keeping the window where a document has no points as small
//!   as the index round-trip allows
//! - every vector is checked against the configured dimension before it
//!   reaches the index
//! - any failure, including deadline expiry, lands the document in `failed`

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use contextdb_chunk::strategy::StrategyPolicy;
use contextdb_core::filter::Filter;
use contextdb_core::settings::EmbeddingSettings;
use contextdb_core::traits::{BackendSelector, DocumentRepository, SettingsStore, VectorIndex};
use contextdb_core::types::{
    DistanceMetric, Document, DocumentId, DocumentStatus, IndexPoint, PointPayload,
};
use contextdb_core::{Error, Result};
use contextdb_index::point_id;

/// Outcome summary of one successful processing run.
#[derive(Debug, Clone)]
pub struct ProcessingReport {
    pub document_id: DocumentId,
    pub chunk_count: usize,
    pub strategy: &'static str,
    pub elapsed: Duration,
}

/// Drives documents through the processing state machine.
///
/// Cheap to share: hold it in an `Arc` and clone that into spawned tasks.
pub struct LifecycleManager {
    settings: Arc<dyn SettingsStore>,
    backends: Arc<dyn BackendSelector>,
    index: Arc<dyn VectorIndex>,
    repository: Arc<dyn DocumentRepository>,
    policy: StrategyPolicy,
    deadline: Duration,
    // One mutex per document id. Entries are never reaped: the table is
    // bounded by the number of distinct documents ever processed, and a
    // stale entry costs one Arc.
    locks: Mutex<HashMap<DocumentId, Arc<tokio::sync::Mutex<()>>>>,
}

impl LifecycleManager {
    pub fn new(
        settings: Arc<dyn SettingsStore>,
        backends: Arc<dyn BackendSelector>,
        index: Arc<dyn VectorIndex>,
        repository: Arc<dyn DocumentRepository>,
        policy: StrategyPolicy,
        deadline: Duration,
    ) -> Self {
        Self {
            settings,
            backends,
            index,
            repository,
            policy,
            deadline,
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Processes one document end to end: segment, embed, replace its
    /// points in the index, and mark it `ready`.
    ///
    /// On any error the document is marked `failed` and the error is
    /// returned; deadline expiry surfaces as [`Error::Timeout`].
    pub async fn process(&self, document: &Document) -> Result<ProcessingReport> {
        let lock = self.lock_for(&document.id);
        let _guard = lock.lock().await;

        let started = Instant::now();
        self.repository
            .update_status(&document.id, DocumentStatus::Processing)
            .await?;

        let run = tokio::time::timeout(self.deadline, self.run(document)).await;
        let outcome = match run {
            Ok(outcome) => outcome,
            Err(_) => Err(Error::Timeout(format!(
                "processing of document '{}' exceeded {}s",
                document.id,
                self.deadline.as_secs()
            ))),
        };

        match outcome {
            Ok((chunk_count, strategy)) => {
                self.repository
                    .update_status(&document.id, DocumentStatus::Ready)
                    .await?;
                let report = ProcessingReport {
                    document_id: document.id.clone(),
                    chunk_count,
                    strategy,
                    elapsed: started.elapsed(),
                };
                info!(
                    document_id = %report.document_id,
                    chunks = report.chunk_count,
                    strategy = report.strategy,
                    elapsed_ms = report.elapsed.as_millis() as u64,
                    "document processed"
                );
                Ok(report)
            }
            Err(e) => {
                warn!(document_id = %document.id, error = %e, "processing failed");
                // Failure status is best effort: the original error wins.
                if let Err(status_err) = self
                    .repository
                    .update_status(&document.id, DocumentStatus::Failed)
                    .await
                {
                    warn!(
                        document_id = %document.id,
                        error = %status_err,
                        "could not record failed status"
                    );
                }
                Err(e)
            }
        }
    }

    /// Spawns [`process`](Self::process) onto the runtime.
    pub fn spawn_process(self: &Arc<Self>, document: Document) -> JoinHandle<Result<ProcessingReport>> {
        let manager = Arc::clone(self);
        tokio::spawn(async move { manager.process(&document).await })
    }

    /// Removes every index point of the document, returning how many were
    /// scoped. Status bookkeeping for deletion belongs to the caller.
    pub async fn delete_document(&self, document_id: &DocumentId) -> Result<u64> {
        let removed = self
            .index
            .delete_by_filter(Filter::for_document(document_id))
            .await?;
        info!(%document_id, removed, "deleted document points");
        Ok(removed)
    }

    async fn run(&self, document: &Document) -> Result<(usize, &'static str)> {
        let settings = EmbeddingSettings::resolve(self.settings.as_ref()).await?;
        let backend = self.backends.select(&settings)?;
        self.index
            .ensure_collection(settings.dimension, DistanceMetric::Cosine)
            .await?;

        let strategy = self.policy.select(document);
        let chunks = strategy.segment(&document.content);
        self.repository
            .update_chunk_count(&document.id, chunks.len())
            .await?;
        debug!(document_id = %document.id, chunks = chunks.len(), "segmented document");

        let total = chunks.len();
        let mut points = Vec::with_capacity(total);
        for chunk in &chunks {
            let vector = backend.embed(&settings.model, &chunk.text).await?;
            if vector.len() != settings.dimension {
                return Err(Error::Configuration(format!(
                    "model '{}' produced a {}-dimensional vector, expected {}",
                    settings.model,
                    vector.len(),
                    settings.dimension
                )));
            }
            let mut extra = serde_json::Map::new();
            if let Some(header) = &chunk.header {
                extra.insert("header".to_string(), serde_json::json!(header));
            }
            points.push(IndexPoint {
                id: point_id(&document.id, chunk.index),
                vector,
                payload: PointPayload {
                    document_id: document.id.clone(),
                    chunk_index: chunk.index,
                    char_count: chunk.text.chars().count(),
                    text: chunk.text.clone(),
                    title: document.title.clone(),
                    position: chunk.index as f32 / total as f32,
                    total_chunks: total,
                    extra,
                },
            });
        }

        // Replace, never accumulate: a reprocessed document that shrank
        // must not keep points from its longer past self.
        let stale = self
            .index
            .delete_by_filter(Filter::for_document(&document.id))
            .await?;
        if stale > 0 {
            debug!(document_id = %document.id, stale, "removed stale points");
        }
        self.index.upsert(points).await?;

        Ok((total, strategy.name()))
    }

    fn lock_for(&self, document_id: &DocumentId) -> Arc<tokio::sync::Mutex<()>> {
        let mut table = self.locks.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        Arc::clone(
            table
                .entry(document_id.clone())
                .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(()))),
        )
    }
}
