//! Grounding prompt construction.

use std::collections::BTreeSet;

use crate::document::RetrievalResult;

/// Compose the prompt handed to the generation model.
///
/// With no results the prompt asks the model to say it has no context.
/// Otherwise each result is rendered under a `[Source: … | Chunk #…]` header
/// in rank order, followed by the question and an instruction to cite the
/// sorted, deduplicated source list.
pub fn build_prompt(question: &str, results: &[RetrievalResult]) -> String {
    if results.is_empty() {
        return format!("Question: {question}\n\nAnswer (say you have no context):");
    }

    let context = results
        .iter()
        .map(|r| format!("[Source: {} | Chunk #{}]\n{}", r.source, r.chunk_id, r.text))
        .collect::<Vec<_>>()
        .join("\n\n");
    let sources: BTreeSet<&str> = results.iter().map(|r| r.source.as_str()).collect();
    let sources = sources.into_iter().collect::<Vec<_>>().join(", ");

    format!(
        "Answer only from the context below. If not in context, say you don't know.\n\n\
         Context:\n{context}\n\n\
         Question: {question}\n\n\
         Answer (end with Sources: {sources}):"
    )
}
