//! Corpus loading.
//!
//! [`load_documents`] reads every `.txt` and `.md` file directly inside the
//! corpus directory and returns them ordered by file name.

use std::fs;
use std::path::Path;

use tracing::{debug, info};
use walkdir::WalkDir;

use crate::document::Document;
use crate::error::{RagError, Result};

/// File name suffixes the loader treats as text documents.
pub const TEXT_SUFFIXES: &[&str] = &[".txt", ".md"];

/// Load every eligible document from `dir`.
///
/// Only direct children are considered, including symlinks to files. A name
/// qualifies when it ends in `.txt` or `.md`, so a file named just `.txt`
/// counts too. Each file is read as UTF-8 and trimmed; files that are empty
/// after trimming are skipped.
///
/// # Errors
///
/// - [`RagError::CorpusNotFound`] if `dir` is missing or not a directory.
/// - [`RagError::Io`] if an eligible file cannot be read as UTF-8.
/// - [`RagError::NoDocuments`] if nothing was loaded.
pub fn load_documents(dir: impl AsRef<Path>) -> Result<Vec<Document>> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        return Err(RagError::CorpusNotFound { path: dir.to_path_buf() });
    }

    let mut documents = Vec::new();
    let entries = WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name();
    for entry in entries {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(dir).to_path_buf();
            RagError::Io { path, source: e.into() }
        })?;
        let Some(source) = entry.file_name().to_str().map(str::to_string) else {
            debug!(path = %entry.path().display(), "skipping non UTF-8 file name");
            continue;
        };
        // `Path::is_file` follows symlinks; the entry's own file type does not.
        if !has_text_suffix(&source) || !entry.path().is_file() {
            continue;
        }

        let raw = fs::read_to_string(entry.path())
            .map_err(|source| RagError::Io { path: entry.path().to_path_buf(), source })?;
        let text = raw.trim();
        if text.is_empty() {
            debug!(source = %source, "skipping empty document");
            continue;
        }

        info!(source = %source, chars = text.chars().count(), "loaded document");
        documents.push(Document::new(source, text));
    }

    if documents.is_empty() {
        return Err(RagError::NoDocuments { path: dir.to_path_buf() });
    }
    Ok(documents)
}

fn has_text_suffix(name: &str) -> bool {
    TEXT_SUFFIXES.iter().any(|suffix| name.ends_with(suffix))
}
