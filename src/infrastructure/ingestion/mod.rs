//! Document ingestion infrastructure: text file loading, recursive chunking
//! and the pipeline that writes the vector index

pub mod chunkers;
mod loader;
mod pipeline;

pub use chunkers::{RecursiveChunker, DEFAULT_SEPARATORS};
pub use loader::{load_text_files, SourceFile};
pub use pipeline::IngestionPipeline;
