//! Ingest command - chunk text files and write the vector index

use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use tracing::info;

use crate::config::AppConfig;
use crate::infrastructure::ingestion::{IngestionPipeline, RecursiveChunker};
use crate::infrastructure::knowledge_base::InMemoryVectorIndex;

#[derive(Args, Clone, Debug, Default)]
pub struct IngestArgs {
    /// Directory of .txt files (overrides config)
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Index file to write (overrides config)
    #[arg(long)]
    pub index: Option<PathBuf>,

    /// Keep the entries already in the index file
    #[arg(long)]
    pub append: bool,

    /// Maximum chunk length in characters (overrides config)
    #[arg(long)]
    pub chunk_size: Option<usize>,

    /// Characters shared by consecutive chunks (overrides config)
    #[arg(long)]
    pub chunk_overlap: Option<usize>,
}

impl IngestArgs {
    fn apply(&self, config: &mut AppConfig) {
        if let Some(dir) = &self.data_dir {
            config.ingestion.data_dir = dir.clone();
        }
        if let Some(path) = &self.index {
            config.index.path = path.clone();
        }
        if let Some(size) = self.chunk_size {
            config.ingestion.chunk_size = size;
        }
        if let Some(overlap) = self.chunk_overlap {
            config.ingestion.chunk_overlap = overlap;
        }
    }
}

pub async fn run(args: IngestArgs) -> anyhow::Result<()> {
    let mut config = super::bootstrap()?;
    args.apply(&mut config);
    config.validate()?;

    let index = if args.append {
        crate::load_index(&config).await?
    } else {
        let embedder = crate::create_embedding_provider(&config.embedding)?;
        InMemoryVectorIndex::new(embedder, &config.embedding.model)
    };

    let pipeline = IngestionPipeline::new(
        Arc::new(index),
        Box::new(RecursiveChunker::new()),
        config.ingestion.chunking(),
    )
    .with_batch_size(config.ingestion.batch_size);

    let report = pipeline
        .run(&config.ingestion.data_dir, &config.index.path)
        .await?;

    if report.is_empty() {
        println!(
            "No .txt files found in {}; index left unchanged",
            config.ingestion.data_dir.display()
        );
        return Ok(());
    }

    info!(
        files = report.files.len(),
        chunks = report.chunks,
        entries = report.index_entries,
        "Ingestion complete"
    );
    println!(
        "Ingested {} chunks from {} files; index now holds {} entries ({})",
        report.chunks,
        report.files.len(),
        report.index_entries,
        config.index.path.display()
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_apply_to_config() {
        let mut config = AppConfig::default();
        let args = IngestArgs {
            data_dir: Some(PathBuf::from("docs")),
            index: Some(PathBuf::from("out/idx.json")),
            chunk_size: Some(400),
            chunk_overlap: Some(40),
            ..Default::default()
        };

        args.apply(&mut config);

        assert_eq!(config.ingestion.data_dir, PathBuf::from("docs"));
        assert_eq!(config.index.path, PathBuf::from("out/idx.json"));
        assert_eq!(config.ingestion.chunking().chunk_size, 400);
        assert_eq!(config.ingestion.chunking().chunk_overlap, 40);
    }

    #[test]
    fn test_no_overrides_keeps_config() {
        let mut config = AppConfig::default();

        IngestArgs::default().apply(&mut config);

        assert_eq!(config.ingestion.data_dir, PathBuf::from("data"));
        assert_eq!(config.ingestion.chunk_size, 1000);
    }
}
