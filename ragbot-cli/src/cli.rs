//! Command-line arguments and configuration resolution.
//!
//! Configuration is layered: built-in defaults, then an optional JSON file
//! (`--config`), then individual flags or their `RAGBOT_*` environment
//! variables.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use ragbot_rag::{DistanceMetric, EmbeddingBackend, RagConfig};

/// Ask questions about a folder of text documents.
#[derive(Parser, Debug)]
#[command(name = "ragbot", version)]
pub struct Cli {
    #[command(flatten)]
    pub pipeline: PipelineArgs,

    /// Log at debug level (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Rebuild the index from the corpus directory
    Index,

    /// Print the chunks nearest to a question
    Search {
        /// The question or search text
        question: String,

        /// Number of chunks to retrieve
        #[arg(short = 'k', long)]
        top_k: Option<usize>,

        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Answer a question from the corpus with a local Ollama model
    Ask {
        /// The question to answer
        question: String,

        /// Number of chunks to retrieve
        #[arg(short = 'k', long)]
        top_k: Option<usize>,

        /// Also print timings and the retrieved chunks
        #[arg(long)]
        show_context: bool,

        /// Print the grounding prompt instead of calling the model
        #[arg(long)]
        dry_run: bool,

        #[command(flatten)]
        generation: GenerationArgs,
    },
}

/// Embedding backend choices on the command line.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum EmbedderArg {
    /// Local feature-hashing embedder
    Hash,
    /// Ollama `/api/embed`
    Ollama,
}

impl From<EmbedderArg> for EmbeddingBackend {
    fn from(arg: EmbedderArg) -> Self {
        match arg {
            EmbedderArg::Hash => EmbeddingBackend::Hash,
            EmbedderArg::Ollama => EmbeddingBackend::Ollama,
        }
    }
}

/// Distance metric choices on the command line.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum DistanceArg {
    /// Squared Euclidean distance
    L2,
    /// One minus cosine similarity
    Cosine,
}

impl From<DistanceArg> for DistanceMetric {
    fn from(arg: DistanceArg) -> Self {
        match arg {
            DistanceArg::L2 => DistanceMetric::SquaredL2,
            DistanceArg::Cosine => DistanceMetric::Cosine,
        }
    }
}

/// Flags that override [`RagConfig`] fields.
#[derive(Args, Debug, Default)]
pub struct PipelineArgs {
    /// JSON configuration file
    #[arg(long, global = true, env = "RAGBOT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory of .txt/.md documents
    #[arg(long, global = true, env = "RAGBOT_CORPUS_DIR")]
    pub corpus_dir: Option<PathBuf>,

    /// Directory holding the persisted index
    #[arg(long, global = true, env = "RAGBOT_INDEX_DIR")]
    pub index_dir: Option<PathBuf>,

    /// Collection name inside the index
    #[arg(long, global = true, env = "RAGBOT_COLLECTION")]
    pub collection: Option<String>,

    /// Chunk window width in characters
    #[arg(long, global = true, env = "RAGBOT_CHUNK_SIZE")]
    pub chunk_size: Option<usize>,

    /// Characters shared by consecutive chunks
    #[arg(long, global = true, env = "RAGBOT_CHUNK_OVERLAP")]
    pub chunk_overlap: Option<usize>,

    /// Chunks retrieved when a command does not say
    #[arg(long, global = true, env = "RAGBOT_DEFAULT_TOP_K")]
    pub default_top_k: Option<usize>,

    /// Distance metric for new indexes
    #[arg(long, global = true, value_enum, env = "RAGBOT_DISTANCE")]
    pub distance: Option<DistanceArg>,

    /// Embedding backend
    #[arg(long, global = true, value_enum, env = "RAGBOT_EMBEDDER")]
    pub embedder: Option<EmbedderArg>,

    /// Embedding model identifier
    #[arg(long, global = true, env = "RAGBOT_EMBEDDING_MODEL")]
    pub embedding_model: Option<String>,

    /// Embedding vector length
    #[arg(long, global = true, env = "RAGBOT_EMBEDDING_DIMENSIONS")]
    pub embedding_dimensions: Option<usize>,

    /// Ollama server used for embeddings and generation
    #[arg(long, global = true, env = "RAGBOT_OLLAMA_URL")]
    pub ollama_url: Option<String>,
}

impl PipelineArgs {
    /// Produce the validated configuration these flags describe.
    pub fn resolve(&self) -> ragbot_rag::Result<RagConfig> {
        let base = match &self.config {
            Some(path) => RagConfig::from_json_file(path)?,
            None => RagConfig::default(),
        };

        let mut embedding = base.embedding.clone();
        if let Some(embedder) = self.embedder {
            embedding.backend = embedder.into();
        }
        if let Some(model) = &self.embedding_model {
            embedding.model = model.clone();
        }
        if let Some(dimensions) = self.embedding_dimensions {
            embedding.dimensions = dimensions;
        }
        if let Some(url) = &self.ollama_url {
            embedding.base_url = url.clone();
        }

        let mut builder = base.to_builder().embedding(embedding);
        if let Some(dir) = &self.corpus_dir {
            builder = builder.corpus_dir(dir);
        }
        if let Some(dir) = &self.index_dir {
            builder = builder.index_dir(dir);
        }
        if let Some(name) = &self.collection {
            builder = builder.collection(name);
        }
        if let Some(size) = self.chunk_size {
            builder = builder.chunk_size(size);
        }
        if let Some(overlap) = self.chunk_overlap {
            builder = builder.chunk_overlap(overlap);
        }
        if let Some(k) = self.default_top_k {
            builder = builder.default_top_k(k);
        }
        if let Some(distance) = self.distance {
            builder = builder.distance(distance.into());
        }
        builder.build()
    }
}

/// Settings for the generation call.
#[derive(Args, Debug, Clone)]
pub struct GenerationArgs {
    /// Ollama model that writes the answer
    #[arg(long, env = "RAGBOT_MODEL", default_value = "llama3")]
    pub model: String,

    /// Sampling temperature
    #[arg(long, default_value_t = 0.3)]
    pub temperature: f32,

    /// Maximum tokens to generate
    #[arg(long, default_value_t = 512)]
    pub max_tokens: u32,

    /// Seconds to wait for the model before giving up
    #[arg(long, default_value_t = 120)]
    pub timeout_secs: u64,
}
