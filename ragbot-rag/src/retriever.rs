//! Query-time retrieval.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{error, info};

use crate::collection::Collection;
use crate::document::RetrievalResult;
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};

/// Ranked results of one query together with how long it took.
#[derive(Debug, Clone, Serialize)]
pub struct Retrieval {
    /// Results ordered nearest first.
    pub results: Vec<RetrievalResult>,
    /// Wall-clock time spent embedding and searching.
    pub elapsed: Duration,
}

impl Retrieval {
    /// Elapsed time in fractional milliseconds.
    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed.as_secs_f64() * 1000.0
    }
}

/// Embeds queries and searches a [`Collection`].
pub struct Retriever {
    embedding_provider: Arc<dyn EmbeddingProvider>,
}

impl Retriever {
    /// Create a retriever using `embedding_provider` for queries. It must be
    /// the same model the collection was built with.
    pub fn new(embedding_provider: Arc<dyn EmbeddingProvider>) -> Self {
        Self { embedding_provider }
    }

    /// Return the `top_k` chunks nearest to `query`.
    ///
    /// An empty collection yields an empty result list.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if `top_k` is zero, and
    /// [`RagError::PipelineError`] if embedding or search fails.
    pub async fn retrieve(
        &self,
        query: &str,
        collection: &Collection,
        top_k: usize,
    ) -> Result<Retrieval> {
        if top_k == 0 {
            return Err(RagError::ConfigError("top_k must be greater than zero".to_string()));
        }
        let started = Instant::now();

        let query_embedding = self.embedding_provider.embed(query).await.map_err(|e| {
            error!(error = %e, "embedding failed during query");
            RagError::PipelineError(format!("query embedding failed: {e}"))
        })?;

        let hits = collection.query(&query_embedding, top_k).await.map_err(|e| {
            error!(collection = collection.name(), error = %e, "vector store query failed");
            RagError::PipelineError(format!(
                "query failed in collection '{}': {e}",
                collection.name()
            ))
        })?;

        let results: Vec<RetrievalResult> = hits.into_iter().map(RetrievalResult::from).collect();
        let retrieval = Retrieval { results, elapsed: started.elapsed() };
        info!(
            result_count = retrieval.results.len(),
            elapsed_ms = format_args!("{:.0}", retrieval.elapsed_ms()),
            "retrieved"
        );
        Ok(retrieval)
    }
}
