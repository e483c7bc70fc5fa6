//! Local feature-hashing embedding provider.
//!
//! [`HashEmbeddingProvider`] needs no model download or network access. Each
//! lower-cased alphanumeric token is hashed into one of `dimensions` buckets,
//! bucket weights are term frequencies, and the vector is L2-normalised. Texts
//! sharing vocabulary land close together, which is enough for keyword-level
//! retrieval over small corpora.

use std::collections::HashMap;

use async_trait::async_trait;
use tracing::debug;

use crate::embedding::EmbeddingProvider;
use crate::error::Result;

/// The default dimensionality, matching `all-minilm`.
pub const DEFAULT_DIMENSIONS: usize = 384;

/// A deterministic bag-of-words embedder.
#[derive(Debug, Clone)]
pub struct HashEmbeddingProvider {
    dimensions: usize,
    name: String,
}

impl HashEmbeddingProvider {
    /// Create a provider producing vectors of `dimensions` entries.
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions: dimensions.max(1), name: format!("hash-{}", dimensions.max(1)) }
    }

    fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimensions];

        let lowered = text.to_lowercase();
        let mut tf: HashMap<&str, usize> = HashMap::new();
        for token in lowered.split(|c: char| !c.is_alphanumeric()).filter(|t| !t.is_empty()) {
            *tf.entry(token).or_insert(0) += 1;
        }

        for (token, count) in tf {
            vector[djb2(token) % self.dimensions] += count as f32;
        }

        let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            vector.iter_mut().for_each(|x| *x /= norm);
        }
        vector
    }
}

impl Default for HashEmbeddingProvider {
    fn default() -> Self {
        Self::new(DEFAULT_DIMENSIONS)
    }
}

/// Stable string hash; must not change between releases or persisted
/// indexes stop matching their queries.
fn djb2(s: &str) -> usize {
    s.bytes().fold(5381usize, |hash, b| hash.wrapping_mul(33).wrapping_add(b as usize))
}

#[async_trait]
impl EmbeddingProvider for HashEmbeddingProvider {
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        debug!(provider = %self.name, batch_size = texts.len(), "embedding batch");
        Ok(texts.iter().map(|text| self.embed_text(text)).collect())
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn name(&self) -> &str {
        &self.name
    }
}
