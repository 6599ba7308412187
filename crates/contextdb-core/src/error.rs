use thiserror::Error;

/// Error taxonomy for the retrieval pipeline.
///
/// - `Configuration`: missing or inconsistent embedding settings. Fatal for
///   the current run; never retried automatically.
/// - `Provider`: embedding backend unreachable, non-2xx, or malformed
///   response. Fails the current document or query.
/// - `Index`: vector index unreachable or an unsafe operation (for example
///   an empty delete filter).
/// - `Validation`: malformed chunk or document input.
/// - `Timeout`: a deadline expired. Fails that specific run, not the
///   document's lifecycle guarantees.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    #[error("Embedding provider error: {0}")]
    Provider(String),

    #[error("Vector index error: {0}")]
    Index(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Deadline exceeded: {0}")]
    Timeout(String),
}

pub type Result<T> = std::result::Result<T, Error>;
