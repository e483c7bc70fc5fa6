//! Configuration for the RAG pipeline.
//!
//! A [`RagConfig`] is constructed once at process start, validated by
//! [`RagConfigBuilder::build`], and then shared read-only by the indexer and
//! retriever.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{RagError, Result};
use crate::vectorstore::DistanceMetric;

/// Default collection name inside the index directory.
pub const DEFAULT_COLLECTION: &str = "rag";

/// Which embedding backend produces vectors for chunks and queries.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum EmbeddingBackend {
    /// Local feature-hashing embedder, no external service.
    #[default]
    Hash,
    /// Ollama `/api/embed` endpoint (requires the `ollama` feature).
    Ollama,
}

/// Embedding model settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Backend used to compute embeddings.
    pub backend: EmbeddingBackend,
    /// Model identifier passed to the backend and recorded in the index.
    pub model: String,
    /// Base URL for HTTP backends.
    pub base_url: String,
    /// Output dimensionality of the model.
    pub dimensions: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            backend: EmbeddingBackend::Hash,
            model: "all-minilm".to_string(),
            base_url: "http://localhost:11434".to_string(),
            dimensions: 384,
        }
    }
}

/// Configuration parameters for the RAG pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RagConfig {
    /// Directory the loader reads `.txt`/`.md` documents from.
    pub corpus_dir: PathBuf,
    /// Directory holding the persisted vector index.
    pub index_dir: PathBuf,
    /// Collection name inside the index.
    pub collection: String,
    /// Window width in characters.
    pub chunk_size: usize,
    /// Characters shared by consecutive windows; stride is `chunk_size - chunk_overlap`.
    pub chunk_overlap: usize,
    /// Result count when the caller does not specify one.
    pub default_top_k: usize,
    /// Distance metric used by the collection.
    pub distance: DistanceMetric,
    /// Embedding model settings.
    pub embedding: EmbeddingConfig,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            corpus_dir: PathBuf::from("data"),
            index_dir: PathBuf::from("index"),
            collection: DEFAULT_COLLECTION.to_string(),
            chunk_size: 600,
            chunk_overlap: 100,
            default_top_k: 4,
            distance: DistanceMetric::default(),
            embedding: EmbeddingConfig::default(),
        }
    }
}

impl RagConfig {
    /// Create a new builder for constructing a [`RagConfig`].
    pub fn builder() -> RagConfigBuilder {
        RagConfigBuilder::default()
    }

    /// Start a builder from an existing configuration.
    pub fn to_builder(&self) -> RagConfigBuilder {
        RagConfigBuilder { config: self.clone() }
    }

    /// Read a JSON configuration file. Missing fields take their defaults.
    ///
    /// The result is validated before it is returned.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|source| RagError::Io { path: path.to_path_buf(), source })?;
        let config: RagConfig = serde_json::from_str(&raw).map_err(|e| {
            RagError::ConfigError(format!("invalid config file {}: {e}", path.display()))
        })?;
        config.to_builder().build()
    }

    /// Distance between window starts.
    pub fn stride(&self) -> usize {
        self.chunk_size - self.chunk_overlap
    }
}

/// Builder for constructing a validated [`RagConfig`].
#[derive(Debug, Clone, Default)]
pub struct RagConfigBuilder {
    config: RagConfig,
}

impl RagConfigBuilder {
    /// Set the corpus directory.
    pub fn corpus_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.corpus_dir = dir.into();
        self
    }

    /// Set the persisted index directory.
    pub fn index_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.index_dir = dir.into();
        self
    }

    /// Set the collection name.
    pub fn collection(mut self, name: impl Into<String>) -> Self {
        self.config.collection = name.into();
        self
    }

    /// Set the window width in characters.
    pub fn chunk_size(mut self, size: usize) -> Self {
        self.config.chunk_size = size;
        self
    }

    /// Set the overlap between consecutive chunks in characters.
    pub fn chunk_overlap(mut self, overlap: usize) -> Self {
        self.config.chunk_overlap = overlap;
        self
    }

    /// Set the result count used when none is given.
    pub fn default_top_k(mut self, k: usize) -> Self {
        self.config.default_top_k = k;
        self
    }

    /// Set the distance metric.
    pub fn distance(mut self, distance: DistanceMetric) -> Self {
        self.config.distance = distance;
        self
    }

    /// Replace the embedding settings.
    pub fn embedding(mut self, embedding: EmbeddingConfig) -> Self {
        self.config.embedding = embedding;
        self
    }

    /// Build the [`RagConfig`], validating that parameters are consistent.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if:
    /// - `chunk_size == 0`
    /// - `chunk_overlap >= chunk_size`
    /// - `default_top_k == 0`
    /// - the collection name is blank
    /// - `embedding.dimensions == 0`
    pub fn build(self) -> Result<RagConfig> {
        let config = self.config;
        if config.chunk_size == 0 {
            return Err(RagError::ConfigError("chunk_size must be greater than zero".to_string()));
        }
        if config.chunk_overlap >= config.chunk_size {
            return Err(RagError::ConfigError(format!(
                "chunk_overlap ({}) must be less than chunk_size ({})",
                config.chunk_overlap, config.chunk_size
            )));
        }
        if config.default_top_k == 0 {
            return Err(RagError::ConfigError(
                "default_top_k must be greater than zero".to_string(),
            ));
        }
        if config.collection.trim().is_empty() {
            return Err(RagError::ConfigError("collection name is required".to_string()));
        }
        if config.embedding.dimensions == 0 {
            return Err(RagError::ConfigError(
                "embedding dimensions must be greater than zero".to_string(),
            ));
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = RagConfig::default();
        assert_eq!(config.chunk_size, 600);
        assert_eq!(config.chunk_overlap, 100);
        assert_eq!(config.stride(), 500);
        assert_eq!(config.default_top_k, 4);
        assert_eq!(config.collection, "rag");
        assert_eq!(config.embedding.backend, EmbeddingBackend::Hash);
        assert!(RagConfig::builder().build().is_ok());
    }

    #[test]
    fn rejects_overlap_not_smaller_than_size() {
        let err = RagConfig::builder().chunk_size(100).chunk_overlap(100).build().unwrap_err();
        assert!(matches!(err, RagError::ConfigError(_)));
        assert!(RagConfig::builder().chunk_size(0).chunk_overlap(0).build().is_err());
    }

    #[test]
    fn rejects_zero_top_k_and_blank_collection() {
        assert!(RagConfig::builder().default_top_k(0).build().is_err());
        assert!(RagConfig::builder().collection("  ").build().is_err());
    }

    #[test]
    fn partial_json_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ragbot.json");
        std::fs::write(
            &path,
            r#"{"corpus_dir": "docs", "chunk_size": 300, "embedding": {"backend": "ollama"}}"#,
        )
        .unwrap();

        let config = RagConfig::from_json_file(&path).unwrap();
        assert_eq!(config.corpus_dir, PathBuf::from("docs"));
        assert_eq!(config.chunk_size, 300);
        assert_eq!(config.chunk_overlap, 100);
        assert_eq!(config.embedding.backend, EmbeddingBackend::Ollama);
        assert_eq!(config.embedding.model, "all-minilm");
    }

    #[test]
    fn invalid_json_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ragbot.json");
        std::fs::write(&path, r#"{"chunk_size": 50, "chunk_overlap": 80}"#).unwrap();
        assert!(matches!(RagConfig::from_json_file(&path), Err(RagError::ConfigError(_))));

        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(RagConfig::from_json_file(&path), Err(RagError::ConfigError(_))));
    }
}
