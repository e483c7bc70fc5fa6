//! Vector store trait for storing and searching vector embeddings.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::document::{IndexRecord, QueryHit};
use crate::error::{RagError, Result};

/// How distance between two embeddings is measured. Lower is more similar.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum DistanceMetric {
    /// Sum of squared component differences.
    #[default]
    SquaredL2,
    /// `1 - cosine_similarity`. Zero-magnitude vectors are at distance 1.
    Cosine,
}

impl DistanceMetric {
    /// Distance between `a` and `b`, which must have equal length.
    pub fn distance(self, a: &[f32], b: &[f32]) -> f32 {
        match self {
            Self::SquaredL2 => a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum(),
            Self::Cosine => {
                let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
                let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
                let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
                if norm_a == 0.0 || norm_b == 0.0 {
                    return 1.0;
                }
                1.0 - dot / (norm_a * norm_b)
            }
        }
    }
}

/// Metadata written when a collection is created.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CollectionMetadata {
    /// Free-form description.
    pub description: String,
    /// Embedding dimensionality every record must have.
    pub dimensions: usize,
    /// Distance metric used for queries.
    pub distance: DistanceMetric,
    /// Identifier of the model that produced the embeddings.
    pub embedding_model: String,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

impl CollectionMetadata {
    /// Metadata for a chunk collection built now.
    pub fn new(dimensions: usize, distance: DistanceMetric, embedding_model: &str) -> Self {
        Self {
            description: "RAG chunks".to_string(),
            dimensions,
            distance,
            embedding_model: embedding_model.to_string(),
            created_at: Utc::now(),
        }
    }
}

/// What [`VectorStore::open_collection`] reports about an existing collection.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionInfo {
    /// Collection name.
    pub name: String,
    /// Metadata recorded at creation.
    pub metadata: CollectionMetadata,
    /// Number of records currently stored.
    pub count: usize,
}

/// A storage backend for vector embeddings with nearest-neighbour search.
///
/// Implementations manage named collections of [`IndexRecord`]s. A record
/// carries its id, embedding, document text, and metadata together, so the
/// four sequences of a bulk insert are aligned by construction.
///
/// # Example
///
/// ```rust,ignore
/// use ragbot_rag::{VectorStore, InMemoryVectorStore};
///
/// let store = InMemoryVectorStore::new();
/// store.create_collection("rag", &metadata).await?;
/// store.insert("rag", &records).await?;
/// let hits = store.query("rag", &query_embedding, 4).await?;
/// ```
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Create an empty collection, replacing nothing.
    ///
    /// Fails if a collection of that name already exists.
    async fn create_collection(&self, name: &str, metadata: &CollectionMetadata) -> Result<()>;

    /// Delete a collection and all its data. Deleting a missing collection
    /// succeeds.
    async fn delete_collection(&self, name: &str) -> Result<()>;

    /// Open an existing collection.
    ///
    /// Fails with [`RagError::CollectionNotFound`] if it does not exist.
    async fn open_collection(&self, name: &str) -> Result<CollectionInfo>;

    /// Bulk-insert records. Every embedding must match the collection's
    /// dimensionality.
    async fn insert(&self, collection: &str, records: &[IndexRecord]) -> Result<()>;

    /// Return at most `top_k` hits ordered by ascending distance.
    async fn query(&self, collection: &str, embedding: &[f32], top_k: usize)
    -> Result<Vec<QueryHit>>;

    /// Number of records in a collection.
    async fn count(&self, collection: &str) -> Result<usize> {
        Ok(self.open_collection(collection).await?.count)
    }
}

/// Reject records whose embeddings do not match `dimensions`.
pub(crate) fn check_dimensions(records: &[IndexRecord], dimensions: usize) -> Result<()> {
    match records.iter().find(|r| r.embedding.len() != dimensions) {
        Some(bad) => {
            Err(RagError::DimensionMismatch { expected: dimensions, actual: bad.embedding.len() })
        }
        None => Ok(()),
    }
}

/// Brute-force nearest-neighbour ranking shared by the bundled stores.
pub(crate) fn rank<'a>(
    records: impl IntoIterator<Item = &'a IndexRecord>,
    metadata: &CollectionMetadata,
    embedding: &[f32],
    top_k: usize,
) -> Result<Vec<QueryHit>> {
    if embedding.len() != metadata.dimensions {
        return Err(RagError::DimensionMismatch {
            expected: metadata.dimensions,
            actual: embedding.len(),
        });
    }

    let mut hits: Vec<QueryHit> = records
        .into_iter()
        .map(|record| QueryHit {
            id: record.id.clone(),
            document: record.document.clone(),
            metadata: record.metadata.clone(),
            distance: metadata.distance.distance(&record.embedding, embedding),
        })
        .collect();

    hits.sort_by(|a, b| a.distance.total_cmp(&b.distance).then_with(|| a.id.cmp(&b.id)));
    hits.truncate(top_k);
    Ok(hits)
}
