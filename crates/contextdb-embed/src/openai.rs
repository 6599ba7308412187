//! Adapter for a hosted OpenAI-compatible embeddings API.
//!
//! Works against api.openai.com and against any server speaking the same
//! `/embeddings` + `/models` surface.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use contextdb_core::config::EmbeddingConfig;
use contextdb_core::traits::EmbeddingBackend;
use contextdb_core::{Error, Result};

#[derive(Debug, Deserialize)]
struct EmbeddingsResponse {
    #[serde(default)]
    data: Vec<EmbeddingRow>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingRow {
    embedding: Vec<f32>,
}

#[derive(Debug, Deserialize)]
struct ModelsResponse {
    #[serde(default)]
    data: Vec<ModelRow>,
}

#[derive(Debug, Deserialize)]
struct ModelRow {
    id: String,
}

#[derive(Debug)]
pub struct OpenAiBackend {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl OpenAiBackend {
    pub fn new(config: &EmbeddingConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::Provider(format!("failed to build http client: {e}")))?;
        Ok(Self {
            client,
            base_url: config.openai_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if self.api_key.is_empty() {
            request
        } else {
            request.bearer_auth(&self.api_key)
        }
    }
}

#[async_trait]
impl EmbeddingBackend for OpenAiBackend {
    fn provider(&self) -> &str {
        "openai"
    }

    async fn embed(&self, model: &str, text: &str) -> Result<Vec<f32>> {
        let url = format!("{}/embeddings", self.base_url);
        let request = self
            .client
            .post(&url)
            .json(&serde_json::json!({ "model": model, "input": text }));
        let response = self
            .authorized(request)
            .send()
            .await
            .map_err(|e| Error::Provider(format!("embeddings api unreachable at {url}: {e}")))?;

        if !response.status().is_success() {
            return Err(Error::Provider(format!(
                "embeddings api returned {} for model '{model}'",
                response.status()
            )));
        }
        let body: EmbeddingsResponse = response
            .json()
            .await
            .map_err(|e| Error::Provider(format!("malformed embeddings response: {e}")))?;
        let row = body
            .data
            .into_iter()
            .next()
            .ok_or_else(|| {
                Error::Provider(format!(
                    "embeddings api returned zero rows for model '{model}'"
                ))
            })?;
        if row.embedding.is_empty() {
            return Err(Error::Provider(format!(
                "embeddings api returned an empty vector for model '{model}'"
            )));
        }
        Ok(row.embedding)
    }

    async fn list_models(&self) -> Result<Vec<String>> {
        let url = format!("{}/models", self.base_url);
        let response = self
            .authorized(self.client.get(&url))
            .send()
            .await
            .map_err(|e| Error::Provider(format!("embeddings api unreachable at {url}: {e}")))?;
        if !response.status().is_success() {
            return Err(Error::Provider(format!(
                "embeddings api returned {} while listing models",
                response.status()
            )));
        }
        let body: ModelsResponse = response
            .json()
            .await
            .map_err(|e| Error::Provider(format!("malformed models response: {e}")))?;
        Ok(body.data.into_iter().map(|m| m.id).collect())
    }
}
