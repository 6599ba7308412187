//! Domain types shared by the chunking, embedding, indexing, and retrieval
//! engines.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub type DocumentId = String;
pub type Meta = HashMap<String, String>;

/// Lifecycle state of an uploaded document.
///
/// Owned by the caller's persistence layer; only the pipeline mutates it:
/// `pending -> processing -> ready`, or `processing -> failed` on any stage
/// error. A `failed` document may be resubmitted, re-entering `processing`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    Pending,
    Processing,
    Ready,
    Failed,
}

impl std::fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            DocumentStatus::Pending => "pending",
            DocumentStatus::Processing => "processing",
            DocumentStatus::Ready => "ready",
            DocumentStatus::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// A free-text document as supplied by the excluded CRUD/API layer.
///
/// - `id`: stable external identity, also used to scope index points
/// - `title`: display title, echoed into index payloads for citations
/// - `content`: raw text; the segmenter normalizes it before chunking
/// - `chunk_count`: derived during processing, mutated only by the pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: DocumentId,
    pub title: String,
    pub content: String,
    pub size_bytes: usize,
    pub chunk_count: usize,
    pub status: DocumentStatus,
    #[serde(default)]
    pub metadata: Meta,
}

impl Document {
    /// Convenience constructor for a freshly uploaded document.
    pub fn new(id: impl Into<String>, title: impl Into<String>, content: impl Into<String>) -> Self {
        let content = content.into();
        Self {
            id: id.into(),
            title: title.into(),
            size_bytes: content.len(),
            content,
            chunk_count: 0,
            status: DocumentStatus::Pending,
            metadata: Meta::new(),
        }
    }
}

/// One retrievable span of a document's text.
///
/// Chunks are ephemeral: they exist between segmentation and embedding and
/// are never persisted on their own. `start`/`end` are character offsets into
/// the normalized text the strategy operated on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub text: String,
    pub index: usize,
    pub start: usize,
    pub end: usize,
    /// Section header this chunk belongs to, when header-aware chunking
    /// recognized one.
    pub header: Option<String>,
    /// True when the chunk came out of the header-aware strategy.
    pub structured: bool,
}

impl Chunk {
    pub fn new(text: impl Into<String>, index: usize, start: usize, end: usize) -> Self {
        Self {
            text: text.into(),
            index,
            start,
            end,
            header: None,
            structured: false,
        }
    }
}

/// Payload stored next to the vector for one chunk.
///
/// Field kinds are deliberately limited to what the index backend supports
/// natively (text, integer, float, bool); anything else in `extra` gets
/// sanitized before upsert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointPayload {
    pub document_id: DocumentId,
    pub chunk_index: usize,
    pub text: String,
    pub title: String,
    pub char_count: usize,
    /// Relative position of the chunk within its document, 0.0..=1.0.
    pub position: f32,
    pub total_chunks: usize,
    /// Free-form metadata, flattened into the payload object on the wire.
    #[serde(default, flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// The unit stored in the vector index: identity, embedding, payload.
///
/// `id` is derived deterministically from (document id, chunk index) so that
/// re-processing the same document overwrites points instead of duplicating
/// them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexPoint {
    pub id: u64,
    pub vector: Vec<f32>,
    pub payload: PointPayload,
}

/// A single similarity hit returned by the vector index.
///
/// `score` is backend-defined but monotonic: higher always means more
/// similar.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub id: u64,
    pub score: f32,
    pub payload: PointPayload,
}

/// Distance metric used when creating the index collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DistanceMetric {
    Cosine,
    Dot,
    Euclid,
}

impl DistanceMetric {
    pub fn as_str(self) -> &'static str {
        match self {
            DistanceMetric::Cosine => "Cosine",
            DistanceMetric::Dot => "Dot",
            DistanceMetric::Euclid => "Euclid",
        }
    }
}
