//! In-memory vector store.
//!
//! This module provides [`InMemoryVectorStore`], a non-persistent vector store
//! backed by a `HashMap` protected by a `tokio::sync::RwLock`. Used by tests
//! and demos.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::document::{IndexRecord, QueryHit};
use crate::error::{RagError, Result};
use crate::vectorstore::{
    CollectionInfo, CollectionMetadata, VectorStore, check_dimensions, rank,
};

#[derive(Debug)]
struct MemoryCollection {
    metadata: CollectionMetadata,
    records: Vec<IndexRecord>,
}

/// An in-memory vector store using brute-force search.
///
/// # Example
///
/// ```rust,ignore
/// use ragbot_rag::{InMemoryVectorStore, VectorStore};
///
/// let store = InMemoryVectorStore::new();
/// store.create_collection("rag", &metadata).await?;
/// ```
#[derive(Debug, Default)]
pub struct InMemoryVectorStore {
    collections: RwLock<HashMap<String, MemoryCollection>>,
}

impl InMemoryVectorStore {
    /// Create a new empty in-memory vector store.
    pub fn new() -> Self {
        Self::default()
    }
}

fn not_found(name: &str) -> RagError {
    RagError::CollectionNotFound { name: name.to_string() }
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn create_collection(&self, name: &str, metadata: &CollectionMetadata) -> Result<()> {
        let mut collections = self.collections.write().await;
        if collections.contains_key(name) {
            return Err(RagError::VectorStoreError {
                backend: "InMemory".to_string(),
                message: format!("collection '{name}' already exists"),
            });
        }
        collections.insert(
            name.to_string(),
            MemoryCollection { metadata: metadata.clone(), records: Vec::new() },
        );
        Ok(())
    }

    async fn delete_collection(&self, name: &str) -> Result<()> {
        self.collections.write().await.remove(name);
        Ok(())
    }

    async fn open_collection(&self, name: &str) -> Result<CollectionInfo> {
        let collections = self.collections.read().await;
        let collection = collections.get(name).ok_or_else(|| not_found(name))?;
        Ok(CollectionInfo {
            name: name.to_string(),
            metadata: collection.metadata.clone(),
            count: collection.records.len(),
        })
    }

    async fn insert(&self, collection: &str, records: &[IndexRecord]) -> Result<()> {
        let mut collections = self.collections.write().await;
        let store = collections.get_mut(collection).ok_or_else(|| not_found(collection))?;
        check_dimensions(records, store.metadata.dimensions)?;
        store.records.extend_from_slice(records);
        Ok(())
    }

    async fn query(
        &self,
        collection: &str,
        embedding: &[f32],
        top_k: usize,
    ) -> Result<Vec<QueryHit>> {
        let collections = self.collections.read().await;
        let store = collections.get(collection).ok_or_else(|| not_found(collection))?;
        rank(&store.records, &store.metadata, embedding, top_k)
    }
}
