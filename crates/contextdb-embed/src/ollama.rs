//! Adapter for a locally hosted Ollama-style model server.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use contextdb_core::config::EmbeddingConfig;
use contextdb_core::traits::EmbeddingBackend;
use contextdb_core::{Error, Result};

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    #[serde(default)]
    embedding: Vec<f32>,
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<TaggedModel>,
}

#[derive(Debug, Deserialize)]
struct TaggedModel {
    name: String,
}

#[derive(Debug)]
pub struct OllamaBackend {
    client: reqwest::Client,
    base_url: String,
}

impl OllamaBackend {
    pub fn new(config: &EmbeddingConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::Provider(format!("failed to build http client: {e}")))?;
        Ok(Self {
            client,
            base_url: config.ollama_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl EmbeddingBackend for OllamaBackend {
    fn provider(&self) -> &str {
        "ollama"
    }

    async fn embed(&self, model: &str, text: &str) -> Result<Vec<f32>> {
        let url = format!("{}/api/embeddings", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&serde_json::json!({ "model": model, "prompt": text }))
            .send()
            .await
            .map_err(|e| Error::Provider(format!("ollama unreachable at {url}: {e}")))?;

        if !response.status().is_success() {
            return Err(Error::Provider(format!(
                "ollama returned {} for model '{model}'",
                response.status()
            )));
        }
        let body: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| Error::Provider(format!("malformed ollama response: {e}")))?;
        if body.embedding.is_empty() {
            return Err(Error::Provider(format!(
                "ollama returned an empty embedding for model '{model}'"
            )));
        }
        Ok(body.embedding)
    }

    async fn list_models(&self) -> Result<Vec<String>> {
        let url = format!("{}/api/tags", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::Provider(format!("ollama unreachable at {url}: {e}")))?;
        if !response.status().is_success() {
            return Err(Error::Provider(format!(
                "ollama returned {} while listing models",
                response.status()
            )));
        }
        let body: TagsResponse = response
            .json()
            .await
            .map_err(|e| Error::Provider(format!("malformed ollama tags response: {e}")))?;
        Ok(body.models.into_iter().map(|m| m.name).collect())
    }
}
