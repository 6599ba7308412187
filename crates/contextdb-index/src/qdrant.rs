//! REST client for a Qdrant-style vector index service.
//!
//! Speaks to one logical collection per deployment. Every call carries the
//! configured request timeout; on expiry the call returns promptly with an
//! `Error::Index` instead of leaking the in-flight operation.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, warn};

use contextdb_core::config::IndexConfig;
use contextdb_core::filter::{Condition, Filter, MatchValue};
use contextdb_core::traits::VectorIndex;
use contextdb_core::types::{DistanceMetric, IndexPoint, PointPayload, SearchResult};
use contextdb_core::{Error, Result};

use crate::point::sanitize_payload;

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    result: T,
}

#[derive(Debug, Deserialize)]
struct ScoredPoint {
    id: u64,
    score: f32,
    payload: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct CountResult {
    count: u64,
}

pub struct QdrantIndex {
    client: reqwest::Client,
    base_url: String,
    collection: String,
}

impl QdrantIndex {
    pub fn new(config: &IndexConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::Index(format!("failed to build http client: {e}")))?;
        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            collection: config.collection.clone(),
        })
    }

    fn collection_url(&self, suffix: &str) -> String {
        format!("{}/collections/{}{suffix}", self.base_url, self.collection)
    }

    async fn check(op: &str, response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        let snippet: String = body.chars().take(200).collect();
        Err(Error::Index(format!("{op} returned {status}: {snippet}")))
    }

    fn send_error(op: &str, url: &str, e: reqwest::Error) -> Error {
        if e.is_timeout() {
            Error::Index(format!("{op} timed out against {url}"))
        } else {
            Error::Index(format!("{op} failed against {url}: {e}"))
        }
    }
}

fn condition_json(condition: &Condition) -> serde_json::Value {
    let value = match &condition.value {
        MatchValue::Bool(b) => serde_json::json!(b),
        MatchValue::Integer(i) => serde_json::json!(i),
        MatchValue::Text(t) => serde_json::json!(t),
    };
    serde_json::json!({ "key": condition.key, "match": { "value": value } })
}

fn filter_json(filter: &Filter) -> serde_json::Value {
    let mut object = serde_json::Map::new();
    if !filter.must.is_empty() {
        object.insert(
            "must".to_string(),
            filter.must.iter().map(condition_json).collect(),
        );
    }
    if !filter.should.is_empty() {
        object.insert(
            "should".to_string(),
            filter.should.iter().map(condition_json).collect(),
        );
    }
    serde_json::Value::Object(object)
}

#[async_trait]
impl VectorIndex for QdrantIndex {
    async fn ensure_collection(&self, vector_size: usize, metric: DistanceMetric) -> Result<()> {
        let url = self.collection_url("");
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Self::send_error("collection lookup", &url, e))?;

        if response.status().is_success() {
            debug!(collection = %self.collection, "collection already exists");
            return Ok(());
        }
        if response.status() != reqwest::StatusCode::NOT_FOUND {
            return Self::check("collection lookup", response).await.map(|_| ());
        }

        let body = serde_json::json!({
            "vectors": { "size": vector_size, "distance": metric.as_str() }
        });
        let response = self
            .client
            .put(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| Self::send_error("collection create", &url, e))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            // lost a create race with a concurrent caller: the collection
            // exists, which is all this method promises
            if status == reqwest::StatusCode::CONFLICT || body.contains("already exists") {
                debug!(collection = %self.collection, "collection created concurrently");
                return Ok(());
            }
            let snippet: String = body.chars().take(200).collect();
            return Err(Error::Index(format!(
                "collection create returned {status}: {snippet}"
            )));
        }
        info!(collection = %self.collection, vector_size, "created collection");
        Ok(())
    }

    async fn upsert(&self, points: Vec<IndexPoint>) -> Result<()> {
        if points.is_empty() {
            return Ok(());
        }
        let mut rows = Vec::with_capacity(points.len());
        for point in &points {
            rows.push(serde_json::json!({
                "id": point.id,
                "vector": point.vector,
                "payload": sanitize_payload(&point.payload)?,
            }));
        }
        let url = self.collection_url("/points?wait=true");
        let response = self
            .client
            .put(&url)
            .json(&serde_json::json!({ "points": rows }))
            .send()
            .await
            .map_err(|e| Self::send_error("upsert", &url, e))?;
        Self::check("upsert", response).await?;
        debug!(count = points.len(), "upserted points");
        Ok(())
    }

    async fn search(
        &self,
        vector: &[f32],
        limit: usize,
        filter: Option<Filter>,
    ) -> Result<Vec<SearchResult>> {
        let mut body = serde_json::json!({
            "vector": vector,
            "limit": limit.max(1),
            "with_payload": true,
        });
        if let Some(filter) = filter.filter(|f| !f.is_empty()) {
            body["filter"] = filter_json(&filter);
        }
        let url = self.collection_url("/points/search");
        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| Self::send_error("search", &url, e))?;
        let response = Self::check("search", response).await?;
        let parsed: ApiResponse<Vec<ScoredPoint>> = response
            .json()
            .await
            .map_err(|e| Error::Index(format!("malformed search response: {e}")))?;

        let mut results = Vec::with_capacity(parsed.result.len());
        for row in parsed.result {
            let Some(payload_value) = row.payload else {
                warn!(id = row.id, "search hit without payload, skipping");
                continue;
            };
            let payload: PointPayload = serde_json::from_value(payload_value)
                .map_err(|e| Error::Index(format!("malformed payload on point {}: {e}", row.id)))?;
            results.push(SearchResult {
                id: row.id,
                score: row.score,
                payload,
            });
        }
        Ok(results)
    }

    async fn delete_by_filter(&self, filter: Filter) -> Result<u64> {
        if filter.is_empty() {
            return Err(Error::Index(
                "refusing delete with empty filter: it would drop every point".to_string(),
            ));
        }
        let scoped = self.count(Some(filter.clone())).await?;
        let url = self.collection_url("/points/delete?wait=true");
        let response = self
            .client
            .post(&url)
            .json(&serde_json::json!({ "filter": filter_json(&filter) }))
            .send()
            .await
            .map_err(|e| Self::send_error("delete", &url, e))?;
        Self::check("delete", response).await?;
        debug!(scoped, "deleted points by filter");
        Ok(scoped)
    }

    async fn count(&self, filter: Option<Filter>) -> Result<u64> {
        let mut body = serde_json::json!({ "exact": true });
        if let Some(filter) = filter.filter(|f| !f.is_empty()) {
            body["filter"] = filter_json(&filter);
        }
        let url = self.collection_url("/points/count");
        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| Self::send_error("count", &url, e))?;
        let response = Self::check("count", response).await?;
        let parsed: ApiResponse<CountResult> = response
            .json()
            .await
            .map_err(|e| Error::Index(format!("malformed count response: {e}")))?;
        Ok(parsed.result.count)
    }
}
