//! Loading passages from tabular corpora.
//!
//! A corpus is CSV with a header row naming at least `id`, `title` and
//! `text`; other columns are ignored.

use std::io::Read;
use std::path::Path;

use tracing::info;

use crate::document::Passage;
use crate::error::{RagError, Result};

/// Read every passage from a CSV file.
///
/// # Errors
///
/// Returns [`RagError::CorpusError`] if the file cannot be opened or a row
/// cannot be parsed; the message carries the failing line number.
pub fn load_csv(path: impl AsRef<Path>) -> Result<Vec<Passage>> {
    let path = path.as_ref();
    let reader = csv::Reader::from_path(path)
        .map_err(|e| RagError::CorpusError(format!("failed to open '{}': {e}", path.display())))?;
    let passages = read_passages(reader)?;
    info!(path = %path.display(), passages = passages.len(), "loaded corpus");
    Ok(passages)
}

/// Read every passage from any CSV source.
pub fn from_reader<R: Read>(source: R) -> Result<Vec<Passage>> {
    read_passages(csv::Reader::from_reader(source))
}

fn read_passages<R: Read>(mut reader: csv::Reader<R>) -> Result<Vec<Passage>> {
    reader
        .deserialize::<Passage>()
        .map(|row| {
            row.map_err(|e| {
                let line = e.position().map(|p| p.line()).unwrap_or_default();
                RagError::CorpusError(format!("invalid row at line {line}: {e}"))
            })
        })
        .collect()
}
