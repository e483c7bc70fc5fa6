//! # RAG Basic Example
//!
//! Writes a tiny corpus to a temporary directory, indexes it, and prints the
//! grounding prompt for a few questions.
//!
//! Uses `HashEmbeddingProvider` and `InMemoryVectorStore`, so it needs no
//! Ollama server and leaves nothing on disk.
//!
//! Run: `cargo run -p ragbot-demos --example rag_basic`

use std::sync::Arc;

use ragbot_rag::{HashEmbeddingProvider, InMemoryVectorStore, RagConfig, RagPipeline};

const CORPUS: &[(&str, &str)] = &[
    (
        "rust.md",
        "# Rust\n\nRust is a systems programming language focused on safety, speed, and \
         concurrency. It achieves memory safety without a garbage collector through its \
         ownership system and the borrow checker.",
    ),
    (
        "python.txt",
        "Python is a high-level, interpreted programming language known for its readability. \
         It manages memory with reference counting and a cycle-detecting garbage collector.",
    ),
    (
        "rag.md",
        "# Retrieval-Augmented Generation\n\nDocuments are chunked, embedded, and stored in a \
         vector index. At query time the nearest chunks are retrieved and placed in the \
         prompt so the model answers from them.",
    ),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter("ragbot_rag=info").init();

    let workspace = tempfile::tempdir()?;
    let corpus_dir = workspace.path().join("data");
    std::fs::create_dir_all(&corpus_dir)?;
    for (name, text) in CORPUS {
        std::fs::write(corpus_dir.join(name), text)?;
    }

    // Small windows so each document yields a couple of chunks.
    let config = RagConfig::builder()
        .corpus_dir(&corpus_dir)
        .chunk_size(120)
        .chunk_overlap(30)
        .default_top_k(2)
        .build()?;

    let pipeline = RagPipeline::builder()
        .config(config)
        .embedding_provider(Arc::new(HashEmbeddingProvider::new(128)))
        .vector_store(Arc::new(InMemoryVectorStore::new()))
        .build()?;

    let collection = pipeline.build_index().await?;
    println!("Indexed {} chunks into '{}'", collection.count().await?, collection.name());

    for question in ["How does Rust manage memory?", "What happens at query time?"] {
        let retrieval = pipeline.retrieve(question, &collection, None).await?;
        println!("\n=== {question} ({:.1} ms)", retrieval.elapsed_ms());
        for result in &retrieval.results {
            println!("  {} #{} (dist: {:.4})", result.source, result.chunk_id, result.score);
        }
        println!("\n{}", pipeline.build_prompt(question, &retrieval.results));
    }

    Ok(())
}
