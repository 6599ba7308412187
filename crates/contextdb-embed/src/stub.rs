//! Deterministic offline backend.
//!
//! Produces hash-seeded, L2-normalized vectors of a fixed dimensionality.
//! Useful for tests and air-gapped runs; carries no semantic signal, so
//! similarity scores against it are only meaningful for exact duplicates.

use async_trait::async_trait;
use std::hash::Hasher;
use twox_hash::XxHash64;

use contextdb_core::traits::EmbeddingBackend;
use contextdb_core::{Error, Result};

#[derive(Debug)]
pub struct StubBackend {
    dimension: usize,
}

impl StubBackend {
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }
}

#[async_trait]
impl EmbeddingBackend for StubBackend {
    fn provider(&self) -> &str {
        "stub"
    }

    async fn embed(&self, model: &str, text: &str) -> Result<Vec<f32>> {
        if text.is_empty() {
            return Err(Error::Provider("cannot embed empty text".to_string()));
        }
        let mut hasher = XxHash64::with_seed(0);
        hasher.write(model.as_bytes());
        hasher.write_u8(0);
        hasher.write(text.as_bytes());
        let seed = hasher.finish();

        let mut vector = Vec::with_capacity(self.dimension);
        for i in 0..self.dimension {
            let mut h = XxHash64::with_seed(seed);
            h.write_u64(i as u64);
            let raw = h.finish();
            // map to [-1, 1]
            vector.push((raw as f64 / u64::MAX as f64) as f32 * 2.0 - 1.0);
        }
        let magnitude: f32 = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if magnitude > 0.0 {
            for v in &mut vector {
                *v /= magnitude;
            }
        }
        Ok(vector)
    }

    async fn list_models(&self) -> Result<Vec<String>> {
        Ok(vec!["stub-embedding".to_string()])
    }
}
