//! Resolution of the active embedding configuration.
//!
//! Three named values are read from the caller's settings store at
//! processing/query time. Any of them being absent is a configuration
//! error, not a retryable fault.

use crate::error::{Error, Result};
use crate::traits::SettingsStore;

pub const KEY_PROVIDER: &str = "embedding_provider";
pub const KEY_MODEL: &str = "embedding_model";
pub const KEY_DIMENSION: &str = "embedding_dimension";

/// Process-wide selection of the active embedding backend.
///
/// Must be internally consistent: `dimension` has to match what `model`
/// actually produces, or index creation and later queries will fail or
/// silently mismatch. The pipeline enforces this by checking every vector
/// it receives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddingSettings {
    pub provider: String,
    pub model: String,
    pub dimension: usize,
}

impl EmbeddingSettings {
    /// Reads and validates the three settings keys.
    pub async fn resolve(store: &dyn SettingsStore) -> Result<Self> {
        let provider = require(store, KEY_PROVIDER).await?;
        let model = require(store, KEY_MODEL).await?;
        let raw_dimension = require(store, KEY_DIMENSION).await?;
        let dimension: usize = raw_dimension.trim().parse().map_err(|_| {
            Error::Configuration(format!(
                "setting '{KEY_DIMENSION}' is not a positive integer: '{raw_dimension}'"
            ))
        })?;
        if dimension == 0 {
            return Err(Error::Configuration(format!(
                "setting '{KEY_DIMENSION}' must be greater than zero"
            )));
        }
        Ok(Self {
            provider,
            model,
            dimension,
        })
    }
}

async fn require(store: &dyn SettingsStore, key: &str) -> Result<String> {
    match store.get(key).await? {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(Error::Configuration(format!("setting '{key}' is not set"))),
    }
}
