//! Lightweight configuration loader.
//!
//! Uses Figment to merge `config.toml` + `config.<env>.toml` + `CONTEXTDB_*`
//! env vars. Every section has working defaults so the loader succeeds with
//! no files present at all.

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

use crate::error::{Error, Result};

/// Connection parameters for the vector index service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexConfig {
    pub url: String,
    pub collection: String,
    pub timeout_secs: u64,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:6333".to_string(),
            collection: "contextdb_chunks".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Connection parameters for the embedding backends.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    pub ollama_url: String,
    pub openai_url: String,
    pub api_key: String,
    pub timeout_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            ollama_url: "http://127.0.0.1:11434".to_string(),
            openai_url: "https://api.openai.com/v1".to_string(),
            api_key: String::new(),
            timeout_secs: 30,
        }
    }
}

/// Default parameters for both chunking strategies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkingConfig {
    pub window: usize,
    pub overlap: usize,
    pub split_on_sentence: bool,
    pub structured_window: usize,
    pub structured_overlap: usize,
    pub min_chunk_size: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            window: 1000,
            overlap: 200,
            split_on_sentence: true,
            structured_window: 512,
            structured_overlap: 128,
            min_chunk_size: 100,
        }
    }
}

/// Tunables of the retrieval engine. The score constants are heuristics
/// carried over from the system this replaces; they are defaults, not
/// load-bearing correctness constants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Fixed cutoff used by plain semantic retrieval.
    pub min_score: f32,
    /// Floor of the adaptive threshold on the hybrid path.
    pub adaptive_floor: f32,
    /// Fraction of the top score used by the adaptive threshold.
    pub adaptive_ratio: f32,
    pub semantic_weight: f32,
    pub keyword_weight: f32,
    pub base_candidates: usize,
    pub max_candidates: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            min_score: 0.62,
            adaptive_floor: 0.55,
            adaptive_ratio: 0.85,
            semantic_weight: 0.7,
            keyword_weight: 0.3,
            base_candidates: 10,
            max_candidates: 40,
        }
    }
}

/// Ingestion scheduling limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Wall-clock budget for one processing run.
    pub deadline_secs: u64,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self { deadline_secs: 600 }
    }
}

/// Merged application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub index: IndexConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub chunking: ChunkingConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub ingest: IngestConfig,
}

impl Config {
    /// Loads `config.toml`, an env-specific overlay, and `CONTEXTDB_*`
    /// env vars (e.g. `CONTEXTDB_INDEX__URL`), in that order.
    pub fn load() -> Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());

        let mut figment = Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file("config.toml"));
        match env_name.as_str() {
            "dev" | "development" => figment = figment.merge(Toml::file("config.dev.toml")),
            "prod" | "production" => figment = figment.merge(Toml::file("config.prod.toml")),
            "test" | "testing" => figment = figment.merge(Toml::file("config.test.toml")),
            _ => {}
        }
        figment = figment.merge(Env::prefixed("CONTEXTDB_").split("__"));

        figment
            .extract()
            .map_err(|e| Error::Configuration(format!("failed to load configuration: {e}")))
    }
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}
