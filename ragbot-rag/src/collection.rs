//! Handle to an open collection.

use std::fmt;
use std::sync::Arc;

use crate::document::QueryHit;
use crate::error::Result;
use crate::vectorstore::{CollectionInfo, CollectionMetadata, VectorStore};

/// An opened collection in a [`VectorStore`].
///
/// Returned by [`Indexer::build_index`](crate::Indexer::build_index) and
/// [`Indexer::get_collection`](crate::Indexer::get_collection), and consumed
/// by the [`Retriever`](crate::Retriever). Cloning is cheap.
#[derive(Clone)]
pub struct Collection {
    store: Arc<dyn VectorStore>,
    info: CollectionInfo,
}

impl Collection {
    pub(crate) fn new(store: Arc<dyn VectorStore>, info: CollectionInfo) -> Self {
        Self { store, info }
    }

    /// Collection name.
    pub fn name(&self) -> &str {
        &self.info.name
    }

    /// Metadata recorded when the collection was created.
    pub fn metadata(&self) -> &CollectionMetadata {
        &self.info.metadata
    }

    /// Current number of records, read from the store.
    pub async fn count(&self) -> Result<usize> {
        self.store.count(&self.info.name).await
    }

    /// Nearest-neighbour query, ascending by distance.
    pub async fn query(&self, embedding: &[f32], top_k: usize) -> Result<Vec<QueryHit>> {
        self.store.query(&self.info.name, embedding, top_k).await
    }
}

impl fmt::Debug for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collection").field("info", &self.info).finish_non_exhaustive()
    }
}
