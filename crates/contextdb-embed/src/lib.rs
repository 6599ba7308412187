//! Embedding gateway: converts text to fixed-length vectors through a
//! pluggable backend.
//!
//! One adapter per backend behind the [`EmbeddingBackend`] trait from
//! `contextdb-core`, selected by [`BackendFactory`] keyed on the configured
//! provider string. No retries happen at this layer; transport failures,
//! non-2xx statuses, and empty embedding rows all surface as
//! `Error::Provider`.
#![deny(warnings)]
#![deny(dead_code)]
#![deny(unused_variables)]
#![deny(unused_imports)]

pub mod ollama;
pub mod openai;
pub mod stub;

use std::sync::Arc;

use contextdb_core::config::EmbeddingConfig;
use contextdb_core::settings::EmbeddingSettings;
use contextdb_core::traits::{BackendSelector, EmbeddingBackend};
use contextdb_core::{Error, Result};

pub use ollama::OllamaBackend;
pub use openai::OpenAiBackend;
pub use stub::StubBackend;

/// Selects an embedding backend from the resolved settings.
///
/// Known provider strings: `"ollama"`, `"openai"` (or
/// `"openai-compatible"`), and `"stub"`.
pub struct BackendFactory {
    config: EmbeddingConfig,
}

impl BackendFactory {
    pub fn new(config: EmbeddingConfig) -> Self {
        Self { config }
    }
}

impl BackendSelector for BackendFactory {
    fn select(&self, settings: &EmbeddingSettings) -> Result<Arc<dyn EmbeddingBackend>> {
        match settings.provider.as_str() {
            "ollama" => Ok(Arc::new(OllamaBackend::new(&self.config)?)),
            "openai" | "openai-compatible" => Ok(Arc::new(OpenAiBackend::new(&self.config)?)),
            "stub" => Ok(Arc::new(StubBackend::new(settings.dimension))),
            other => Err(Error::Configuration(format!(
                "unknown embedding provider '{other}'"
            ))),
        }
    }
}
