//! # Custom Embedder Example
//!
//! Plugs a user-defined `EmbeddingProvider` into the pipeline. The provider
//! here counts letters, which is enough to show the trait contract: one
//! vector per input text, all of `dimensions()` length.
//!
//! Run: `cargo run -p ragbot-demos --example custom_embedder`

use std::sync::Arc;

use async_trait::async_trait;
use ragbot_rag::{EmbeddingProvider, InMemoryVectorStore, RagConfig, RagPipeline};

/// Bag-of-letters embedding over `a..=z`.
struct LetterEmbedder;

#[async_trait]
impl EmbeddingProvider for LetterEmbedder {
    async fn embed_batch(&self, texts: &[&str]) -> ragbot_rag::Result<Vec<Vec<f32>>> {
        Ok(texts
            .iter()
            .map(|text| {
                let mut counts = vec![0.0f32; 26];
                for c in text.chars().filter(char::is_ascii_alphabetic) {
                    counts[(c.to_ascii_lowercase() as u8 - b'a') as usize] += 1.0;
                }
                let norm = counts.iter().map(|x| x * x).sum::<f32>().sqrt();
                if norm > 0.0 {
                    counts.iter_mut().for_each(|x| *x /= norm);
                }
                counts
            })
            .collect())
    }

    fn dimensions(&self) -> usize {
        26
    }

    fn name(&self) -> &str {
        "letters"
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let workspace = tempfile::tempdir()?;
    let corpus_dir = workspace.path().join("data");
    std::fs::create_dir_all(&corpus_dir)?;
    std::fs::write(corpus_dir.join("vowels.txt"), "aeiou aeiou aeiou")?;
    std::fs::write(corpus_dir.join("consonants.txt"), "bcdfg hjklm npqrst")?;

    let pipeline = RagPipeline::builder()
        .config(RagConfig::builder().corpus_dir(&corpus_dir).build()?)
        .embedding_provider(Arc::new(LetterEmbedder))
        .vector_store(Arc::new(InMemoryVectorStore::new()))
        .build()?;

    let collection = pipeline.build_index().await?;
    println!("Collection embedded with '{}'", collection.metadata().embedding_model);

    let retrieval = pipeline.retrieve("a e i", &collection, Some(1)).await?;
    for result in &retrieval.results {
        println!("nearest: {} (dist: {:.4})", result.source, result.score);
    }
    Ok(())
}
