//! # ragbot-rag
//!
//! A small retrieval-augmented generation pipeline over a directory of text
//! documents.
//!
//! ## Overview
//!
//! - [`load_documents`] reads `.txt`/`.md` files from the corpus directory
//! - [`FixedSizeChunker`] splits them into overlapping character windows
//! - an [`EmbeddingProvider`] turns chunk text into vectors
//! - a [`VectorStore`] persists the vectors and answers nearest-neighbour queries
//! - the [`Indexer`] rebuilds the index; the [`Retriever`] queries it
//! - [`build_prompt`] formats retrieved chunks into a grounding prompt
//!
//! [`RagPipeline`] wires these together from a [`RagConfig`].
//!
//! ## Features
//!
//! - `ollama`: [`OllamaEmbeddingProvider`](ollama::OllamaEmbeddingProvider)
//!   backed by a local Ollama server

pub mod chunking;
pub mod collection;
pub mod config;
pub mod document;
pub mod embedding;
pub mod error;
pub mod filestore;
pub mod hashing;
pub mod indexer;
pub mod inmemory;
pub mod loader;
pub mod pipeline;
pub mod prompt;
pub mod retriever;
pub mod vectorstore;

#[cfg(feature = "ollama")]
pub mod ollama;

pub use chunking::{Chunker, FixedSizeChunker};
pub use collection::Collection;
pub use config::{EmbeddingBackend, EmbeddingConfig, RagConfig, RagConfigBuilder};
pub use document::{Chunk, ChunkMetadata, Document, IndexRecord, QueryHit, RetrievalResult};
pub use embedding::EmbeddingProvider;
pub use error::{RagError, Result};
pub use filestore::FileVectorStore;
pub use hashing::HashEmbeddingProvider;
pub use indexer::Indexer;
pub use inmemory::InMemoryVectorStore;
pub use loader::load_documents;
pub use pipeline::{RagPipeline, RagPipelineBuilder, embedding_provider_from_config};
pub use prompt::build_prompt;
pub use retriever::{Retrieval, Retriever};
pub use vectorstore::{CollectionInfo, CollectionMetadata, DistanceMetric, VectorStore};
