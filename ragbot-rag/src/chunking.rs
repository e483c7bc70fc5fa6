//! Document chunking.
//!
//! This module provides the [`Chunker`] trait and [`FixedSizeChunker`], which
//! slides a fixed-width character window with configurable overlap across a
//! document. Windows ignore sentence and word boundaries.

use crate::document::{Chunk, Document};
use crate::error::{RagError, Result};

/// A strategy for splitting documents into chunks.
pub trait Chunker: Send + Sync {
    /// Split a document into chunks.
    ///
    /// Returns an empty `Vec` if the document has empty text. Chunk ids are
    /// dense and start at zero.
    fn chunk(&self, document: &Document) -> Vec<Chunk>;
}

/// Splits text into fixed-size windows by character count with overlap.
///
/// Window `n` starts at `n * (chunk_size - chunk_overlap)` characters and
/// spans `chunk_size` characters. Each window is trimmed, and windows that
/// trim to nothing are dropped without consuming a chunk id.
///
/// # Example
///
/// ```rust,ignore
/// use ragbot_rag::FixedSizeChunker;
///
/// let chunker = FixedSizeChunker::new(600, 100)?;
/// let chunks = chunker.chunk(&document);
/// ```
#[derive(Debug, Clone)]
pub struct FixedSizeChunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl FixedSizeChunker {
    /// Create a new `FixedSizeChunker`.
    ///
    /// # Arguments
    ///
    /// * `chunk_size`: number of characters per window
    /// * `chunk_overlap`: number of characters shared by consecutive windows
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] unless `chunk_overlap < chunk_size`,
    /// since a zero stride would never advance.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        if chunk_overlap >= chunk_size {
            return Err(RagError::ConfigError(format!(
                "chunk_overlap ({chunk_overlap}) must be less than chunk_size ({chunk_size})"
            )));
        }
        Ok(Self { chunk_size, chunk_overlap })
    }

    /// Number of characters between consecutive window starts.
    pub fn stride(&self) -> usize {
        self.chunk_size - self.chunk_overlap
    }

    /// Split raw text into trimmed windows.
    pub fn split(&self, text: &str) -> Vec<String> {
        // Byte offsets of every char boundary, plus the end of the text.
        let boundaries: Vec<usize> =
            text.char_indices().map(|(i, _)| i).chain(std::iter::once(text.len())).collect();
        let char_count = boundaries.len() - 1;

        let mut windows = Vec::new();
        let mut start = 0;
        while start < char_count {
            let end = (start + self.chunk_size).min(char_count);
            let piece = text[boundaries[start]..boundaries[end]].trim();
            if !piece.is_empty() {
                windows.push(piece.to_string());
            }
            start += self.stride();
        }
        windows
    }
}

impl Chunker for FixedSizeChunker {
    fn chunk(&self, document: &Document) -> Vec<Chunk> {
        self.split(&document.text)
            .into_iter()
            .enumerate()
            .map(|(chunk_id, text)| Chunk { text, source: document.source.clone(), chunk_id })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(text: &str) -> Document {
        Document::new("a.txt", text)
    }

    #[test]
    fn rejects_zero_stride() {
        assert!(FixedSizeChunker::new(100, 100).is_err());
        assert!(FixedSizeChunker::new(100, 150).is_err());
        assert!(FixedSizeChunker::new(0, 0).is_err());
        assert_eq!(FixedSizeChunker::new(600, 100).unwrap().stride(), 500);
    }

    #[test]
    fn empty_text_yields_no_chunks() {
        let chunker = FixedSizeChunker::new(10, 2).unwrap();
        assert!(chunker.chunk(&doc("")).is_empty());
        assert!(chunker.chunk(&doc("    ")).is_empty());
    }

    #[test]
    fn short_text_is_single_chunk() {
        let chunker = FixedSizeChunker::new(600, 100).unwrap();
        let chunks = chunker.chunk(&doc("hello world"));
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "hello world");
        assert_eq!(chunks[0].chunk_id, 0);
        assert_eq!(chunks[0].source, "a.txt");
    }

    #[test]
    fn windows_overlap_by_configured_amount() {
        let text: String = ('a'..='z').collect();
        let chunker = FixedSizeChunker::new(10, 4).unwrap();
        let chunks = chunker.split(&text);
        // starts at 0, 6, 12, 18, 24
        assert_eq!(chunks, ["abcdefghij", "ghijklmnop", "mnopqrstuv", "stuvwxyz", "yz"]);
    }

    #[test]
    fn whitespace_windows_are_dropped_without_consuming_ids() {
        // The second window (chars 4..8) is all spaces.
        let text = "abcd        efgh";
        let chunker = FixedSizeChunker::new(4, 0).unwrap();
        let chunks = chunker.chunk(&doc(text));
        let texts: Vec<_> = chunks.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, ["abcd", "efgh"]);
        let ids: Vec<_> = chunks.iter().map(|c| c.chunk_id).collect();
        assert_eq!(ids, [0, 1]);
    }

    #[test]
    fn counts_characters_not_bytes() {
        let text = "ééééé";
        let chunker = FixedSizeChunker::new(2, 0).unwrap();
        assert_eq!(chunker.split(text), ["éé", "éé", "é"]);
    }

    #[test]
    fn hello_world_corpus_produces_overlapping_chunks() {
        let text = "hello world".repeat(100);
        let chunker = FixedSizeChunker::new(600, 100).unwrap();
        let chunks = chunker.chunk(&doc(&text));
        assert_eq!(chunks.len(), 3);

        // Characters 500..600 belong to both of the first two windows.
        let shared = text[500..600].trim();
        assert!(shared.len() >= 98);
        assert!(chunks[0].text.ends_with(shared));
        assert!(chunks[1].text.starts_with(shared));
    }

    #[test]
    fn chunking_is_idempotent() {
        let text = "lorem ipsum dolor sit amet ".repeat(50);
        let chunker = FixedSizeChunker::new(64, 16).unwrap();
        assert_eq!(chunker.chunk(&doc(&text)), chunker.chunk(&doc(&text)));
    }
}
