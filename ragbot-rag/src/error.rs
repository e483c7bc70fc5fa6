//! Error types for the `ragbot-rag` crate.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur in RAG operations.
#[derive(Debug, Error)]
pub enum RagError {
    /// The corpus directory does not exist or is not a directory.
    #[error("Corpus directory not found: {}", .path.display())]
    CorpusNotFound {
        /// The path that was looked up.
        path: PathBuf,
    },

    /// The corpus directory holds no eligible, non-empty documents.
    #[error("No .txt/.md documents in {}", .path.display())]
    NoDocuments {
        /// The corpus directory that was scanned.
        path: PathBuf,
    },

    /// A corpus file could not be read.
    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        /// The file that failed.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// An error occurred during embedding generation.
    #[error("Embedding error ({provider}): {message}")]
    EmbeddingError {
        /// The embedding provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// The requested collection does not exist in the vector store.
    #[error("Collection '{name}' not found")]
    CollectionNotFound {
        /// The collection name.
        name: String,
    },

    /// The persisted collection exists but cannot be decoded.
    #[error("Collection '{name}' is corrupt: {message}")]
    CorruptCollection {
        /// The collection name.
        name: String,
        /// A description of the decoding failure.
        message: String,
    },

    /// The persisted collection exists but the process may not access it.
    #[error("Access denied to collection '{name}' at {}", .path.display())]
    IndexAccessDenied {
        /// The collection name.
        name: String,
        /// The path that was refused.
        path: PathBuf,
    },

    /// Embedding lengths disagree between the collection and the caller.
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// The dimensionality the collection was built with.
        expected: usize,
        /// The dimensionality that was supplied.
        actual: usize,
    },

    /// The collection was embedded by a different model than the caller's.
    #[error("Collection was built with embedding model '{stored}', but '{current}' is configured")]
    EmbeddingModelMismatch {
        /// Model recorded in the collection metadata.
        stored: String,
        /// Model of the active embedding provider.
        current: String,
    },

    /// An error occurred in the vector store backend.
    #[error("Vector store error ({backend}): {message}")]
    VectorStoreError {
        /// The vector store backend that produced the error.
        backend: String,
        /// A description of the failure.
        message: String,
    },

    /// A configuration validation error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// An error in the RAG pipeline orchestration.
    #[error("Pipeline error: {0}")]
    PipelineError(String),
}

impl RagError {
    /// Whether this error means the collection simply does not exist yet.
    ///
    /// This is the only open failure that the collection accessor treats as
    /// recoverable by rebuilding.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::CollectionNotFound { .. })
    }
}

/// A convenience result type for RAG operations.
pub type Result<T> = std::result::Result<T, RagError>;
