//! Index build and the open-or-rebuild collection accessor.

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::chunking::Chunker;
use crate::collection::Collection;
use crate::config::RagConfig;
use crate::document::{Chunk, IndexRecord};
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::loader::load_documents;
use crate::vectorstore::{CollectionMetadata, VectorStore};

/// Builds the vector index from the corpus directory.
///
/// A build is destructive and non-incremental: the previous collection is
/// deleted and every document is re-chunked and re-embedded. It is not
/// atomic either; if the final insert fails the new collection is left
/// partially populated.
pub struct Indexer {
    config: Arc<RagConfig>,
    embedding_provider: Arc<dyn EmbeddingProvider>,
    vector_store: Arc<dyn VectorStore>,
    chunker: Arc<dyn Chunker>,
}

impl Indexer {
    /// Create an indexer over shared pipeline components.
    pub fn new(
        config: Arc<RagConfig>,
        embedding_provider: Arc<dyn EmbeddingProvider>,
        vector_store: Arc<dyn VectorStore>,
        chunker: Arc<dyn Chunker>,
    ) -> Self {
        Self { config, embedding_provider, vector_store, chunker }
    }

    /// Rebuild the collection from scratch and return a handle to it.
    ///
    /// Steps: load documents, chunk each in order, embed all chunk texts in
    /// one batch, delete the old collection, create a new one, bulk-insert.
    ///
    /// # Errors
    ///
    /// Loader errors ([`RagError::CorpusNotFound`], [`RagError::NoDocuments`],
    /// [`RagError::Io`]) are returned unchanged. Embedding and store failures
    /// are wrapped in [`RagError::PipelineError`].
    pub async fn build_index(&self) -> Result<Collection> {
        let name = self.config.collection.as_str();
        info!(corpus = %self.config.corpus_dir.display(), collection = name, "building index");

        let documents = load_documents(&self.config.corpus_dir)?;
        let chunks: Vec<Chunk> = documents.iter().flat_map(|doc| self.chunker.chunk(doc)).collect();
        info!(documents = documents.len(), chunk_count = chunks.len(), "chunked corpus");

        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        let embeddings = self.embedding_provider.embed_batch(&texts).await.map_err(|e| {
            error!(error = %e, "embedding failed during index build");
            RagError::PipelineError(format!("embedding failed: {e}"))
        })?;
        if embeddings.len() != chunks.len() {
            error!(expected = chunks.len(), actual = embeddings.len(), "embedding count mismatch");
            return Err(RagError::PipelineError(format!(
                "embedding provider returned {} vectors for {} chunks",
                embeddings.len(),
                chunks.len()
            )));
        }

        self.vector_store.delete_collection(name).await.map_err(|e| {
            error!(collection = name, error = %e, "failed to delete collection");
            RagError::PipelineError(format!("failed to delete collection '{name}': {e}"))
        })?;

        let metadata = CollectionMetadata::new(
            self.embedding_provider.dimensions(),
            self.config.distance,
            self.embedding_provider.name(),
        );
        self.vector_store.create_collection(name, &metadata).await.map_err(|e| {
            error!(collection = name, error = %e, "failed to create collection");
            RagError::PipelineError(format!("failed to create collection '{name}': {e}"))
        })?;

        let records: Vec<IndexRecord> = chunks
            .into_iter()
            .zip(embeddings)
            .map(|(chunk, embedding)| IndexRecord::from_chunk(chunk, embedding))
            .collect();
        self.vector_store.insert(name, &records).await.map_err(|e| {
            error!(collection = name, error = %e, "insert failed during index build");
            RagError::PipelineError(format!("insert failed for collection '{name}': {e}"))
        })?;

        info!(
            collection = name,
            records = records.len(),
            index = %self.config.index_dir.display(),
            "index saved"
        );

        let info = self.vector_store.open_collection(name).await?;
        Ok(Collection::new(self.vector_store.clone(), info))
    }

    /// Open the persisted collection, building it only if it does not exist.
    ///
    /// Only [`RagError::CollectionNotFound`] triggers a rebuild. A corrupt or
    /// unreadable index is reported rather than silently replaced, and so is
    /// an index built with a different embedding model, whether or not its
    /// vectors have the same length.
    pub async fn get_collection(&self) -> Result<Collection> {
        let name = self.config.collection.as_str();
        match self.vector_store.open_collection(name).await {
            Ok(info) => {
                let expected = self.embedding_provider.dimensions();
                if info.metadata.dimensions != expected {
                    error!(
                        collection = name,
                        stored = info.metadata.dimensions,
                        expected,
                        "collection dimensionality does not match the embedding provider"
                    );
                    return Err(RagError::DimensionMismatch {
                        expected,
                        actual: info.metadata.dimensions,
                    });
                }
                let current = self.embedding_provider.name();
                if info.metadata.embedding_model != current {
                    error!(
                        collection = name,
                        stored = %info.metadata.embedding_model,
                        current,
                        "collection was built with a different embedding model"
                    );
                    return Err(RagError::EmbeddingModelMismatch {
                        stored: info.metadata.embedding_model,
                        current: current.to_string(),
                    });
                }
                info!(collection = name, records = info.count, "opened collection");
                Ok(Collection::new(self.vector_store.clone(), info))
            }
            Err(e) if e.is_not_found() => {
                warn!(collection = name, "collection not found, building index");
                self.build_index().await
            }
            Err(e) => {
                error!(collection = name, error = %e, "failed to open collection");
                Err(e)
            }
        }
    }
}
