//! RAG pipeline context.
//!
//! The [`RagPipeline`] is constructed once at process start and holds the
//! configuration, embedding provider, vector store, and chunker. It exposes
//! the narrow surface an orchestrator needs: build or open the index,
//! retrieve, and build a prompt.
//!
//! # Example
//!
//! ```rust,ignore
//! use ragbot_rag::{RagConfig, RagPipeline};
//!
//! let pipeline = RagPipeline::from_config(RagConfig::default())?;
//! let collection = pipeline.get_collection().await?;
//! let retrieval = pipeline.retrieve("what is chunking?", &collection, None).await?;
//! let prompt = pipeline.build_prompt("what is chunking?", &retrieval.results);
//! ```

use std::sync::Arc;

use crate::chunking::{Chunker, FixedSizeChunker};
use crate::collection::Collection;
use crate::config::{EmbeddingBackend, EmbeddingConfig, RagConfig};
use crate::document::RetrievalResult;
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::filestore::FileVectorStore;
use crate::hashing::HashEmbeddingProvider;
use crate::indexer::Indexer;
use crate::prompt::build_prompt;
use crate::retriever::{Retrieval, Retriever};
use crate::vectorstore::VectorStore;

/// The RAG pipeline context.
///
/// Immutable after construction. Construct one via [`RagPipeline::builder()`]
/// or [`RagPipeline::from_config`].
pub struct RagPipeline {
    config: Arc<RagConfig>,
    embedding_provider: Arc<dyn EmbeddingProvider>,
    vector_store: Arc<dyn VectorStore>,
    indexer: Indexer,
    retriever: Retriever,
}

impl RagPipeline {
    /// Create a new [`RagPipelineBuilder`].
    pub fn builder() -> RagPipelineBuilder {
        RagPipelineBuilder::default()
    }

    /// Build a pipeline whose components all come from `config`: the
    /// configured embedding backend, a [`FileVectorStore`] at `index_dir`,
    /// and a [`FixedSizeChunker`].
    pub fn from_config(config: RagConfig) -> Result<Self> {
        Self::builder().config(config).build()
    }

    /// Return a reference to the pipeline configuration.
    pub fn config(&self) -> &RagConfig {
        &self.config
    }

    /// Return a reference to the embedding provider.
    pub fn embedding_provider(&self) -> &Arc<dyn EmbeddingProvider> {
        &self.embedding_provider
    }

    /// Return a reference to the vector store.
    pub fn vector_store(&self) -> &Arc<dyn VectorStore> {
        &self.vector_store
    }

    /// Rebuild the index from the corpus. See [`Indexer::build_index`].
    pub async fn build_index(&self) -> Result<Collection> {
        self.indexer.build_index().await
    }

    /// Open the index, building it if absent. See [`Indexer::get_collection`].
    pub async fn get_collection(&self) -> Result<Collection> {
        self.indexer.get_collection().await
    }

    /// Retrieve the nearest chunks for `query`. `None` uses the configured
    /// `default_top_k`.
    pub async fn retrieve(
        &self,
        query: &str,
        collection: &Collection,
        top_k: Option<usize>,
    ) -> Result<Retrieval> {
        let top_k = top_k.unwrap_or(self.config.default_top_k);
        self.retriever.retrieve(query, collection, top_k).await
    }

    /// Compose the grounding prompt. See [`build_prompt`].
    pub fn build_prompt(&self, question: &str, results: &[RetrievalResult]) -> String {
        build_prompt(question, results)
    }
}

/// Construct the embedding provider named by `config`.
///
/// # Errors
///
/// Returns [`RagError::ConfigError`] if the backend was compiled out.
pub fn embedding_provider_from_config(
    config: &EmbeddingConfig,
) -> Result<Arc<dyn EmbeddingProvider>> {
    match config.backend {
        EmbeddingBackend::Hash => Ok(Arc::new(HashEmbeddingProvider::new(config.dimensions))),
        #[cfg(feature = "ollama")]
        EmbeddingBackend::Ollama => Ok(Arc::new(
            crate::ollama::OllamaEmbeddingProvider::new(config.base_url.as_str())
                .with_model(config.model.as_str(), config.dimensions),
        )),
        #[cfg(not(feature = "ollama"))]
        EmbeddingBackend::Ollama => Err(RagError::ConfigError(
            "the ollama embedding backend requires the `ollama` feature".to_string(),
        )),
    }
}

/// Builder for constructing a [`RagPipeline`].
///
/// Only `config` is required. Components that are not set are derived from
/// the configuration.
///
/// # Example
///
/// ```rust,ignore
/// let pipeline = RagPipeline::builder()
///     .config(config)
///     .embedding_provider(Arc::new(HashEmbeddingProvider::new(64)))
///     .vector_store(Arc::new(InMemoryVectorStore::new()))
///     .build()?;
/// ```
#[derive(Default)]
pub struct RagPipelineBuilder {
    config: Option<RagConfig>,
    embedding_provider: Option<Arc<dyn EmbeddingProvider>>,
    vector_store: Option<Arc<dyn VectorStore>>,
    chunker: Option<Arc<dyn Chunker>>,
}

impl RagPipelineBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: RagConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Override the embedding provider.
    pub fn embedding_provider(mut self, provider: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedding_provider = Some(provider);
        self
    }

    /// Override the vector store backend.
    pub fn vector_store(mut self, store: Arc<dyn VectorStore>) -> Self {
        self.vector_store = Some(store);
        self
    }

    /// Override the document chunker.
    pub fn chunker(mut self, chunker: Arc<dyn Chunker>) -> Self {
        self.chunker = Some(chunker);
        self
    }

    /// Build the [`RagPipeline`].
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if the config is missing or invalid,
    /// or if the configured embedding backend is unavailable.
    pub fn build(self) -> Result<RagPipeline> {
        let config = self
            .config
            .ok_or_else(|| RagError::ConfigError("config is required".to_string()))?
            .to_builder()
            .build()?;

        let embedding_provider = match self.embedding_provider {
            Some(provider) => provider,
            None => embedding_provider_from_config(&config.embedding)?,
        };
        let vector_store = self
            .vector_store
            .unwrap_or_else(|| Arc::new(FileVectorStore::new(config.index_dir.clone())));
        let chunker: Arc<dyn Chunker> = match self.chunker {
            Some(chunker) => chunker,
            None => Arc::new(FixedSizeChunker::new(config.chunk_size, config.chunk_overlap)?),
        };

        let config = Arc::new(config);
        let indexer = Indexer::new(
            config.clone(),
            embedding_provider.clone(),
            vector_store.clone(),
            chunker,
        );
        let retriever = Retriever::new(embedding_provider.clone());

        Ok(RagPipeline { config, embedding_provider, vector_store, indexer, retriever })
    }
}
