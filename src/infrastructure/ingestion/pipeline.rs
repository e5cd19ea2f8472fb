//! Ingestion pipeline: load, chunk, embed, persist

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{info, warn};

use super::loader::{load_text_files, SourceFile};
use crate::domain::ingestion::{ChunkingConfig, ChunkingStrategy, IngestionReport};
use crate::domain::{DomainError, Document, VectorIndex};
use crate::infrastructure::knowledge_base::InMemoryVectorIndex;

/// Builds (or extends) the on-disk vector index from a directory of text files
#[derive(Debug)]
pub struct IngestionPipeline {
    index: Arc<InMemoryVectorIndex>,
    chunker: Box<dyn ChunkingStrategy>,
    chunking: ChunkingConfig,
    batch_size: usize,
}

impl IngestionPipeline {
    pub fn new(
        index: Arc<InMemoryVectorIndex>,
        chunker: Box<dyn ChunkingStrategy>,
        chunking: ChunkingConfig,
    ) -> Self {
        Self {
            index,
            chunker,
            chunking,
            batch_size: 32,
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Ingest `data_dir` and write the index to `index_path`
    ///
    /// With no `.txt` files the index file is not touched.
    pub async fn run(
        &self,
        data_dir: impl AsRef<Path>,
        index_path: impl AsRef<Path>,
    ) -> Result<IngestionReport, DomainError> {
        let data_dir = data_dir.as_ref();
        let index_path = index_path.as_ref();
        self.chunking.validate()?;

        let files = load_text_files(data_dir).await?;
        if files.is_empty() {
            warn!(dir = %data_dir.display(), "No .txt files found, nothing to ingest");
            return Ok(IngestionReport::empty());
        }

        info!(files = files.len(), dir = %data_dir.display(), "Loaded source files");

        let documents = self.split(&files)?;
        let chunk_count = documents.len();
        info!(
            chunks = chunk_count,
            chunk_size = self.chunking.chunk_size,
            chunk_overlap = self.chunking.chunk_overlap,
            chunker = self.chunker.name(),
            "Split documents into chunks"
        );

        let mut added = 0;
        for batch in documents.chunks(self.batch_size) {
            added += self.index.add_documents(batch.to_vec()).await?;
            info!(added, total = chunk_count, "Embedded batch");
        }

        self.index.save(index_path).await?;

        Ok(IngestionReport {
            files: files.into_iter().map(|f| f.path).collect(),
            chunks: chunk_count,
            index_entries: self.index.document_count().await?,
            index_path: Some(PathBuf::from(index_path)),
        })
    }

    fn split(&self, files: &[SourceFile]) -> Result<Vec<Document>, DomainError> {
        let mut documents = Vec::new();

        for file in files {
            let source = file.source();

            for chunk in self.chunker.chunk(&file.content, &self.chunking)? {
                documents.push(
                    Document::new(uuid::Uuid::new_v4().to_string(), chunk.content)
                        .with_metadata("source", serde_json::Value::String(source.clone()))
                        .with_all_metadata(chunk.metadata.to_json_map()),
                );
            }
        }

        Ok(documents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::embedding::MockEmbeddingProvider;
    use crate::infrastructure::ingestion::RecursiveChunker;

    fn pipeline(index: Arc<InMemoryVectorIndex>) -> IngestionPipeline {
        IngestionPipeline::new(
            index,
            Box::new(RecursiveChunker::new()),
            ChunkingConfig::new(100, 20),
        )
        .with_batch_size(2)
    }

    fn index(embedder: Arc<MockEmbeddingProvider>) -> Arc<InMemoryVectorIndex> {
        Arc::new(InMemoryVectorIndex::new(embedder, "all-minilm"))
    }

    #[tokio::test]
    async fn test_ingests_and_persists() {
        let data = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let index_path = out.path().join("index.json");

        let text = "Solar photovoltaics is the largest renewable employer. ".repeat(8);
        std::fs::write(data.path().join("solar.txt"), &text).unwrap();
        std::fs::write(data.path().join("wind.txt"), "Wind turbines are getting taller.").unwrap();

        let embedder = Arc::new(MockEmbeddingProvider::new(128));
        let index = index(embedder.clone());
        let report = pipeline(index.clone()).run(data.path(), &index_path).await.unwrap();

        assert_eq!(report.files.len(), 2);
        assert!(report.chunks > 2);
        assert_eq!(report.index_entries, report.chunks);
        assert_eq!(report.index_path.as_deref(), Some(index_path.as_path()));
        assert_eq!(embedder.call_count(), report.chunks.div_ceil(2));

        let reloaded = InMemoryVectorIndex::load(&index_path, embedder, "all-minilm")
            .await
            .unwrap();
        assert_eq!(reloaded.document_count().await.unwrap(), report.chunks);

        let hits = reloaded.nearest("wind turbines taller", 1).await.unwrap();
        assert!(hits[0].source().unwrap().ends_with("wind.txt"));
        assert!(hits[0].metadata.contains_key("chunk_index"));
    }

    #[tokio::test]
    async fn test_no_text_files_leaves_index_untouched() {
        let data = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let index_path = out.path().join("index.json");

        let report = pipeline(index(Arc::new(MockEmbeddingProvider::new(16))))
            .run(data.path(), &index_path)
            .await
            .unwrap();

        assert!(report.is_empty());
        assert!(!index_path.exists());
    }

    #[tokio::test]
    async fn test_append_keeps_existing_entries() {
        let data = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let index_path = out.path().join("index.json");
        std::fs::write(data.path().join("a.txt"), "Hydropower is the oldest renewable.").unwrap();

        let embedder = Arc::new(MockEmbeddingProvider::new(16));
        pipeline(index(embedder.clone())).run(data.path(), &index_path).await.unwrap();

        let existing = Arc::new(
            InMemoryVectorIndex::load(&index_path, embedder, "all-minilm")
                .await
                .unwrap(),
        );
        let report = pipeline(existing).run(data.path(), &index_path).await.unwrap();

        assert_eq!(report.chunks, 1);
        assert_eq!(report.index_entries, 2);
    }

    #[tokio::test]
    async fn test_bundled_data_answers_transport_question() {
        let data = Path::new(env!("CARGO_MANIFEST_DIR")).join("data");
        let out = tempfile::tempdir().unwrap();
        let index_path = out.path().join("index.json");

        let index = index(Arc::new(MockEmbeddingProvider::new(256)));
        let report = IngestionPipeline::new(
            index.clone(),
            Box::new(RecursiveChunker::new()),
            ChunkingConfig::default(),
        )
        .run(&data, &index_path)
        .await
        .unwrap();
        assert!(report.chunks > 2);

        let hits = index
            .nearest(
                "What percentage of energy in the transportation sector comes from renewables?",
                3,
            )
            .await
            .unwrap();

        let fact = "Less than 4% of transport energy is from renewables.";
        assert_eq!(hits.len(), 3);
        assert!(hits.iter().any(|doc| doc.content.contains(fact)));
    }

    #[tokio::test]
    async fn test_embedding_failure_aborts() {
        let data = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let index_path = out.path().join("index.json");
        std::fs::write(data.path().join("a.txt"), "text").unwrap();

        let embedder = Arc::new(MockEmbeddingProvider::new(16).with_error("offline"));
        let result = pipeline(index(embedder)).run(data.path(), &index_path).await;

        assert!(result.is_err());
        assert!(!index_path.exists());
    }
}
