//! Persistent, file-backed vector store.
//!
//! Each collection lives in its own directory under the index root:
//!
//! ```text
//! <index_dir>/
//!   rag/
//!     collection.json   # metadata + records
//! ```
//!
//! Writes go to a sibling temp file that is renamed over `collection.json`,
//! so a crash never leaves a half-written file. Open failures are classified
//! so callers can tell a missing collection from a damaged or unreadable one.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::document::{IndexRecord, QueryHit};
use crate::error::{RagError, Result};
use crate::vectorstore::{
    CollectionInfo, CollectionMetadata, VectorStore, check_dimensions, rank,
};

const BACKEND: &str = "File";
const COLLECTION_FILE: &str = "collection.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredCollection {
    metadata: CollectionMetadata,
    records: Vec<IndexRecord>,
}

/// A vector store persisted as JSON files under a root directory.
///
/// Loaded collections are cached in memory and written through on every
/// mutation. The cache is per instance; another process rebuilding the same
/// directory is not observed until a fresh instance opens it.
///
/// # Example
///
/// ```rust,ignore
/// use ragbot_rag::{FileVectorStore, VectorStore};
///
/// let store = FileVectorStore::new("index");
/// let info = store.open_collection("rag").await?;
/// ```
#[derive(Debug)]
pub struct FileVectorStore {
    root: PathBuf,
    cache: RwLock<HashMap<String, StoredCollection>>,
}

impl FileVectorStore {
    /// Create a store rooted at `root`. Nothing is touched on disk until a
    /// collection is created.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into(), cache: RwLock::new(HashMap::new()) }
    }

    /// The index root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn collection_dir(&self, name: &str) -> Result<PathBuf> {
        let valid = !name.is_empty()
            && name != "."
            && name != ".."
            && !name.contains(['/', '\\'])
            && !name.contains('\0');
        if !valid {
            return Err(RagError::VectorStoreError {
                backend: BACKEND.to_string(),
                message: format!("invalid collection name '{name}'"),
            });
        }
        Ok(self.root.join(name))
    }

    fn io_error(name: &str, path: &Path, err: std::io::Error) -> RagError {
        match err.kind() {
            ErrorKind::NotFound => RagError::CollectionNotFound { name: name.to_string() },
            ErrorKind::PermissionDenied => {
                RagError::IndexAccessDenied { name: name.to_string(), path: path.to_path_buf() }
            }
            _ => RagError::VectorStoreError {
                backend: BACKEND.to_string(),
                message: format!("{}: {err}", path.display()),
            },
        }
    }

    async fn read_collection(&self, name: &str) -> Result<StoredCollection> {
        let path = self.collection_dir(name)?.join(COLLECTION_FILE);
        let bytes = tokio::fs::read(&path).await.map_err(|e| Self::io_error(name, &path, e))?;

        let stored: StoredCollection = serde_json::from_slice(&bytes).map_err(|e| {
            RagError::CorruptCollection { name: name.to_string(), message: e.to_string() }
        })?;
        check_dimensions(&stored.records, stored.metadata.dimensions).map_err(|e| {
            RagError::CorruptCollection { name: name.to_string(), message: e.to_string() }
        })?;

        debug!(
            collection = name,
            records = stored.records.len(),
            path = %path.display(),
            "read collection"
        );
        Ok(stored)
    }

    async fn write_collection(&self, name: &str, stored: &StoredCollection) -> Result<()> {
        let dir = self.collection_dir(name)?;
        tokio::fs::create_dir_all(&dir).await.map_err(|e| Self::io_error(name, &dir, e))?;

        let bytes = serde_json::to_vec(stored).map_err(|e| RagError::VectorStoreError {
            backend: BACKEND.to_string(),
            message: format!("failed to encode collection '{name}': {e}"),
        })?;

        let path = dir.join(COLLECTION_FILE);
        let tmp = dir.join(format!("{COLLECTION_FILE}.tmp"));
        tokio::fs::write(&tmp, &bytes).await.map_err(|e| Self::io_error(name, &tmp, e))?;
        tokio::fs::rename(&tmp, &path).await.map_err(|e| Self::io_error(name, &path, e))?;
        Ok(())
    }

    async fn ensure_loaded(&self, name: &str) -> Result<()> {
        if self.cache.read().await.contains_key(name) {
            return Ok(());
        }
        let stored = self.read_collection(name).await?;
        self.cache.write().await.entry(name.to_string()).or_insert(stored);
        Ok(())
    }
}

#[async_trait]
impl VectorStore for FileVectorStore {
    async fn create_collection(&self, name: &str, metadata: &CollectionMetadata) -> Result<()> {
        let path = self.collection_dir(name)?.join(COLLECTION_FILE);
        let mut cache = self.cache.write().await;
        let exists =
            tokio::fs::try_exists(&path).await.map_err(|e| Self::io_error(name, &path, e))?;
        if cache.contains_key(name) || exists {
            return Err(RagError::VectorStoreError {
                backend: BACKEND.to_string(),
                message: format!("collection '{name}' already exists"),
            });
        }

        let stored = StoredCollection { metadata: metadata.clone(), records: Vec::new() };
        self.write_collection(name, &stored).await?;
        cache.insert(name.to_string(), stored);
        info!(collection = name, path = %path.display(), "created collection");
        Ok(())
    }

    async fn delete_collection(&self, name: &str) -> Result<()> {
        let dir = self.collection_dir(name)?;
        let mut cache = self.cache.write().await;
        cache.remove(name);
        match tokio::fs::remove_dir_all(&dir).await {
            Ok(()) => {
                info!(collection = name, "deleted collection");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Self::io_error(name, &dir, e)),
        }
    }

    async fn open_collection(&self, name: &str) -> Result<CollectionInfo> {
        self.ensure_loaded(name).await?;
        let cache = self.cache.read().await;
        let stored = cache
            .get(name)
            .ok_or_else(|| RagError::CollectionNotFound { name: name.to_string() })?;
        Ok(CollectionInfo {
            name: name.to_string(),
            metadata: stored.metadata.clone(),
            count: stored.records.len(),
        })
    }

    async fn insert(&self, collection: &str, records: &[IndexRecord]) -> Result<()> {
        self.ensure_loaded(collection).await?;
        let mut cache = self.cache.write().await;
        let stored = cache
            .get_mut(collection)
            .ok_or_else(|| RagError::CollectionNotFound { name: collection.to_string() })?;
        check_dimensions(records, stored.metadata.dimensions)?;

        let before = stored.records.len();
        stored.records.extend_from_slice(records);
        if let Err(e) = self.write_collection(collection, stored).await {
            stored.records.truncate(before);
            return Err(e);
        }
        debug!(
            collection,
            inserted = records.len(),
            total = stored.records.len(),
            "inserted records"
        );
        Ok(())
    }

    async fn query(
        &self,
        collection: &str,
        embedding: &[f32],
        top_k: usize,
    ) -> Result<Vec<QueryHit>> {
        self.ensure_loaded(collection).await?;
        let cache = self.cache.read().await;
        let stored = cache
            .get(collection)
            .ok_or_else(|| RagError::CollectionNotFound { name: collection.to_string() })?;
        rank(&stored.records, &stored.metadata, embedding, top_k)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::ChunkMetadata;
    use crate::vectorstore::DistanceMetric;

    fn metadata() -> CollectionMetadata {
        CollectionMetadata::new(2, DistanceMetric::SquaredL2, "test-model")
    }

    fn record(source: &str, chunk_id: usize, embedding: [f32; 2]) -> IndexRecord {
        IndexRecord {
            id: format!("{source}_{chunk_id}"),
            embedding: embedding.to_vec(),
            document: format!("{source} chunk {chunk_id}"),
            metadata: ChunkMetadata { source: source.to_string(), chunk_id },
        }
    }

    #[tokio::test]
    async fn records_survive_a_new_store_instance() {
        let temp = tempfile::tempdir().unwrap();
        let store = FileVectorStore::new(temp.path());
        store.create_collection("rag", &metadata()).await.unwrap();
        store
            .insert("rag", &[record("a.txt", 0, [1.0, 0.0]), record("b.txt", 0, [0.0, 1.0])])
            .await
            .unwrap();

        let reopened = FileVectorStore::new(temp.path());
        let info = reopened.open_collection("rag").await.unwrap();
        assert_eq!(info.count, 2);
        assert_eq!(info.metadata.embedding_model, "test-model");

        let hits = reopened.query("rag", &[0.9, 0.1], 1).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "a.txt_0");
    }

    #[tokio::test]
    async fn missing_collection_is_not_found() {
        let temp = tempfile::tempdir().unwrap();
        let store = FileVectorStore::new(temp.path().join("never-created"));
        let err = store.open_collection("rag").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn garbage_file_is_corrupt_not_missing() {
        let temp = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(temp.path().join("rag")).unwrap();
        std::fs::write(temp.path().join("rag").join(COLLECTION_FILE), b"{not json").unwrap();

        let store = FileVectorStore::new(temp.path());
        let err = store.open_collection("rag").await.unwrap_err();
        assert!(matches!(err, RagError::CorruptCollection { .. }));
        assert!(!err.is_not_found());
    }

    #[tokio::test]
    async fn delete_is_idempotent_and_removes_files() {
        let temp = tempfile::tempdir().unwrap();
        let store = FileVectorStore::new(temp.path());
        store.delete_collection("rag").await.unwrap();

        store.create_collection("rag", &metadata()).await.unwrap();
        assert!(temp.path().join("rag").join(COLLECTION_FILE).exists());
        store.delete_collection("rag").await.unwrap();
        assert!(!temp.path().join("rag").exists());
        assert!(store.open_collection("rag").await.unwrap_err().is_not_found());
        store.delete_collection("rag").await.unwrap();
    }

    #[tokio::test]
    async fn create_refuses_existing_collection() {
        let temp = tempfile::tempdir().unwrap();
        let store = FileVectorStore::new(temp.path());
        store.create_collection("rag", &metadata()).await.unwrap();
        assert!(store.create_collection("rag", &metadata()).await.is_err());

        let other = FileVectorStore::new(temp.path());
        assert!(other.create_collection("rag", &metadata()).await.is_err());
    }

    #[tokio::test]
    async fn insert_rejects_wrong_dimensions() {
        let temp = tempfile::tempdir().unwrap();
        let store = FileVectorStore::new(temp.path());
        store.create_collection("rag", &metadata()).await.unwrap();

        let mut bad = record("a.txt", 0, [1.0, 0.0]);
        bad.embedding.push(0.5);
        let err = store.insert("rag", &[bad]).await.unwrap_err();
        assert!(matches!(err, RagError::DimensionMismatch { expected: 2, actual: 3 }));
        assert_eq!(store.count("rag").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn rejects_path_like_names() {
        let temp = tempfile::tempdir().unwrap();
        let store = FileVectorStore::new(temp.path());
        for name in ["", "..", "a/b", "a\\b"] {
            assert!(store.create_collection(name, &metadata()).await.is_err(), "{name}");
        }
    }
}
