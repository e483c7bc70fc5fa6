//! Data types for documents, chunks, index records, and retrieval results.

use serde::{Deserialize, Serialize};

/// A source document read from the corpus directory.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Document {
    /// File name of the document, used as the citation key.
    pub source: String,
    /// Trimmed text content.
    pub text: String,
}

impl Document {
    /// Create a document from a source name and its text.
    pub fn new(source: impl Into<String>, text: impl Into<String>) -> Self {
        Self { source: source.into(), text: text.into() }
    }
}

/// A window of a [`Document`]'s text, the unit of retrieval.
///
/// `chunk_id` is dense and zero-based per source.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Chunk {
    /// The trimmed window text.
    pub text: String,
    /// The parent document's source name.
    pub source: String,
    /// Position of this chunk within its source.
    pub chunk_id: usize,
}

impl Chunk {
    /// Index key of this chunk: `{source}_{chunk_id}`.
    pub fn record_id(&self) -> String {
        format!("{}_{}", self.source, self.chunk_id)
    }
}

/// Metadata stored alongside every indexed chunk.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChunkMetadata {
    /// The source file name.
    pub source: String,
    /// The chunk position within the source.
    pub chunk_id: usize,
}

/// One row of the vector index.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IndexRecord {
    /// `{source}_{chunk_id}`.
    pub id: String,
    /// The chunk's embedding.
    pub embedding: Vec<f32>,
    /// The chunk text.
    pub document: String,
    /// Source and chunk position.
    pub metadata: ChunkMetadata,
}

impl IndexRecord {
    /// Pair a chunk with its embedding.
    pub fn from_chunk(chunk: Chunk, embedding: Vec<f32>) -> Self {
        Self {
            id: chunk.record_id(),
            embedding,
            metadata: ChunkMetadata { source: chunk.source, chunk_id: chunk.chunk_id },
            document: chunk.text,
        }
    }
}

/// A raw nearest-neighbour hit returned by a vector store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QueryHit {
    /// Record id.
    pub id: String,
    /// Stored chunk text.
    pub document: String,
    /// Stored metadata.
    pub metadata: ChunkMetadata,
    /// Distance to the query embedding (lower is more similar).
    pub distance: f32,
}

/// A retrieved chunk with its distance score.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RetrievalResult {
    /// The chunk text.
    pub text: String,
    /// The source file name.
    pub source: String,
    /// The chunk position within the source.
    pub chunk_id: usize,
    /// Distance rounded to four decimal places (lower is more similar).
    pub score: f32,
}

impl From<QueryHit> for RetrievalResult {
    fn from(hit: QueryHit) -> Self {
        Self {
            text: hit.document,
            source: hit.metadata.source,
            chunk_id: hit.metadata.chunk_id,
            score: round_score(hit.distance),
        }
    }
}

/// Round a distance to four decimal places.
pub fn round_score(distance: f32) -> f32 {
    ((f64::from(distance) * 10_000.0).round() / 10_000.0) as f32
}
