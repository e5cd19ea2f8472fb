//! Document ingestion domain types and traits
//!
//! - `ChunkingStrategy` splits a loaded source text into overlapping windows
//! - `IngestionReport` summarises one ingestion run

pub mod chunker;
mod report;

pub use chunker::{Chunk, ChunkMetadata, ChunkingConfig, ChunkingStrategy};
pub use report::IngestionReport;
