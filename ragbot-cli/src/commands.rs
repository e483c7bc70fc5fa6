//! Subcommand execution and terminal rendering.

use std::time::Duration;

use anyhow::Context;
use ragbot_rag::{RagConfig, RagPipeline, Retrieval, RetrievalResult};
use serde::Serialize;
use tracing::debug;

use crate::cli::{Cli, Command, GenerationArgs};
use crate::generation::{Generation, GenerationOptions, OllamaGenerator};

/// Characters of chunk text shown per result.
pub const PREVIEW_CHARS: usize = 400;

/// Run the parsed command line to completion and print its output.
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    print!("{}", execute(cli).await?);
    Ok(())
}

/// Run the parsed command line and return what it would print.
pub async fn execute(cli: Cli) -> anyhow::Result<String> {
    let config = cli.pipeline.resolve().context("invalid configuration")?;
    debug!(?config, "resolved configuration");
    let pipeline = RagPipeline::from_config(config.clone())?;

    match cli.command {
        Command::Index => {
            let collection = pipeline.build_index().await.context("failed to build index")?;
            let count = collection.count().await?;
            Ok(format!("{}\n", render_index_summary(&config, count)))
        }
        Command::Search { question, top_k, json } => {
            let collection = pipeline.get_collection().await?;
            let retrieval = pipeline.retrieve(&question, &collection, top_k).await?;
            if json {
                Ok(format!("{}\n", render_json(&question, &retrieval)?))
            } else {
                Ok(render_retrieval(&retrieval))
            }
        }
        Command::Ask { question, top_k, show_context, dry_run, generation } => {
            let collection = pipeline.get_collection().await?;
            let retrieval = pipeline.retrieve(&question, &collection, top_k).await?;
            let prompt = pipeline.build_prompt(&question, &retrieval.results);

            if dry_run {
                return Ok(format!("{prompt}\n"));
            }

            let generator = generator(&config, &generation)?;
            let answer = generator.generate(&prompt).await?;
            let mut out = format!("{}\n", answer.answer);
            if show_context {
                out.push('\n');
                out.push_str(&render_timings(&retrieval, &answer));
                out.push_str(&render_retrieval(&retrieval));
            }
            Ok(out)
        }
    }
}

fn generator(config: &RagConfig, args: &GenerationArgs) -> anyhow::Result<OllamaGenerator> {
    let options = GenerationOptions { temperature: args.temperature, num_predict: args.max_tokens };
    Ok(OllamaGenerator::new(
        &config.embedding.base_url,
        args.model.clone(),
        options,
        Duration::from_secs(args.timeout_secs),
    )?)
}

/// One line summarizing a finished index build.
pub fn render_index_summary(config: &RagConfig, count: usize) -> String {
    format!(
        "Indexed {count} chunks from {} into collection '{}' at {}",
        config.corpus_dir.display(),
        config.collection,
        config.index_dir.display()
    )
}

/// Leading characters of a chunk, cut on a char boundary.
pub fn preview(text: &str) -> &str {
    match text.char_indices().nth(PREVIEW_CHARS) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}

/// Human-readable listing of retrieved chunks.
pub fn render_retrieval(retrieval: &Retrieval) -> String {
    let mut out = format!("Retrieval: {:.0} ms\n", retrieval.elapsed_ms());
    if retrieval.results.is_empty() {
        out.push_str("No chunks retrieved.\n");
        return out;
    }
    for (i, result) in retrieval.results.iter().enumerate() {
        out.push_str(&render_result(i + 1, result));
    }
    out
}

fn render_result(rank: usize, result: &RetrievalResult) -> String {
    format!(
        "\n{rank}. {} #{} (dist: {:.4})\n{}\n",
        result.source,
        result.chunk_id,
        result.score,
        preview(&result.text)
    )
}

/// Retrieval and generation times on one line.
pub fn render_timings(retrieval: &Retrieval, generation: &Generation) -> String {
    format!(
        "Retrieval: {:.0} ms | Generation: {:.0} ms\n",
        retrieval.elapsed_ms(),
        generation.elapsed.as_secs_f64() * 1000.0
    )
}

#[derive(Serialize)]
struct SearchOutput<'a> {
    question: &'a str,
    retrieval_ms: f64,
    results: &'a [RetrievalResult],
}

/// Machine-readable search output.
pub fn render_json(question: &str, retrieval: &Retrieval) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&SearchOutput {
        question,
        retrieval_ms: retrieval.elapsed_ms(),
        results: &retrieval.results,
    })
}
