//! Ingestion run summary

use std::path::PathBuf;

use serde::Serialize;

/// What one ingestion run did
#[derive(Debug, Clone, Default, Serialize)]
pub struct IngestionReport {
    /// Source files that were read
    pub files: Vec<PathBuf>,
    /// Chunks produced across all files
    pub chunks: usize,
    /// Entries in the index after the run
    pub index_entries: usize,
    /// Where the index was written, if anything was written
    pub index_path: Option<PathBuf>,
}

impl IngestionReport {
    /// Nothing to ingest; the index is left untouched
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}
