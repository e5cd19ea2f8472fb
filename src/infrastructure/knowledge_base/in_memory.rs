//! In-memory cosine-similarity index persisted to a JSON file

use std::cmp::Ordering;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::domain::embedding::cosine_similarity;
use crate::domain::{
    DomainError, Document, EmbeddingProvider, EmbeddingRequest, RetrievedDocument, VectorIndex,
};

/// Brute-force vector index over embedded passages
#[derive(Debug)]
pub struct InMemoryVectorIndex {
    embedder: Arc<dyn EmbeddingProvider>,
    model: String,
    entries: Arc<RwLock<Vec<IndexEntry>>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct IndexEntry {
    id: String,
    content: String,
    #[serde(default)]
    metadata: HashMap<String, serde_json::Value>,
    embedding: Vec<f32>,
}

#[derive(Debug, Serialize, Deserialize)]
struct IndexFile {
    model: String,
    built_at: DateTime<Utc>,
    entries: Vec<IndexEntry>,
}

impl InMemoryVectorIndex {
    /// Create an empty index that embeds with `model`
    pub fn new(embedder: Arc<dyn EmbeddingProvider>, model: impl Into<String>) -> Self {
        Self {
            embedder,
            model: model.into(),
            entries: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Load an index file; a missing file yields an empty index
    ///
    /// The file must have been built with the same embedding model, otherwise
    /// query and passage vectors would not be comparable.
    pub async fn load(
        path: impl AsRef<Path>,
        embedder: Arc<dyn EmbeddingProvider>,
        model: impl Into<String>,
    ) -> Result<Self, DomainError> {
        let path = path.as_ref();
        let index = Self::new(embedder, model);

        let raw = match tokio::fs::read_to_string(path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(path = %path.display(), "Index file not found, starting with an empty index");
                return Ok(index);
            }
            Err(e) => {
                return Err(DomainError::storage(format!(
                    "Failed to read index file {}: {}",
                    path.display(),
                    e
                )));
            }
        };

        let file: IndexFile = serde_json::from_str(&raw).map_err(|e| {
            DomainError::storage(format!("Invalid index file {}: {}", path.display(), e))
        })?;

        if file.model != index.model {
            return Err(DomainError::configuration(format!(
                "Index {} was built with embedding model '{}' but '{}' is configured",
                path.display(),
                file.model,
                index.model
            )));
        }

        info!(
            path = %path.display(),
            entries = file.entries.len(),
            built_at = %file.built_at,
            "Loaded vector index"
        );

        *index.entries.write().await = file.entries;
        Ok(index)
    }

    /// Write all entries to `path`, creating parent directories
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<(), DomainError> {
        let path = path.as_ref();
        let entries = self.entries.read().await.clone();

        let file = IndexFile {
            model: self.model.clone(),
            built_at: Utc::now(),
            entries,
        };

        let json = serde_json::to_string(&file)
            .map_err(|e| DomainError::internal(format!("Failed to serialize index: {}", e)))?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                DomainError::storage(format!("Failed to create {}: {}", parent.display(), e))
            })?;
        }

        tokio::fs::write(path, json).await.map_err(|e| {
            DomainError::storage(format!("Failed to write index file {}: {}", path.display(), e))
        })?;

        info!(path = %path.display(), entries = file.entries.len(), "Saved vector index");
        Ok(())
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    async fn embed(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>, DomainError> {
        let expected = texts.len();
        let response = self
            .embedder
            .embed(EmbeddingRequest::batch(self.model.clone(), texts))
            .await?;

        let vectors = response.into_vectors();
        if vectors.len() != expected {
            return Err(DomainError::knowledge_base(format!(
                "Embedding provider returned {} vectors for {} inputs",
                vectors.len(),
                expected
            )));
        }

        Ok(vectors)
    }
}

#[async_trait]
impl VectorIndex for InMemoryVectorIndex {
    async fn nearest(&self, query: &str, k: usize) -> Result<Vec<RetrievedDocument>, DomainError> {
        if k == 0 || self.entries.read().await.is_empty() {
            return Ok(Vec::new());
        }

        // Query is embedded outside the lock
        let query_vector = self
            .embed(vec![query.to_string()])
            .await?
            .pop()
            .unwrap_or_default();

        let entries = self.entries.read().await;
        let mut scored: Vec<(f32, &IndexEntry)> = entries
            .iter()
            .map(|entry| (cosine_similarity(&query_vector, &entry.embedding), entry))
            .collect();

        // Stable sort keeps insertion order among equal scores
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));

        let results: Vec<RetrievedDocument> = scored
            .into_iter()
            .take(k)
            .map(|(_, entry)| RetrievedDocument {
                content: entry.content.clone(),
                metadata: entry.metadata.clone(),
            })
            .collect();

        debug!(k, returned = results.len(), "Nearest-neighbour lookup");
        Ok(results)
    }

    async fn add_documents(&self, documents: Vec<Document>) -> Result<usize, DomainError> {
        if documents.is_empty() {
            return Ok(0);
        }

        let texts = documents.iter().map(|d| d.content.clone()).collect();
        let vectors = self.embed(texts).await?;

        let mut entries = self.entries.write().await;
        let count = documents.len();

        for (doc, embedding) in documents.into_iter().zip(vectors) {
            entries.push(IndexEntry {
                id: doc.id,
                content: doc.content,
                metadata: doc.metadata,
                embedding,
            });
        }

        Ok(count)
    }

    async fn document_count(&self) -> Result<usize, DomainError> {
        Ok(self.entries.read().await.len())
    }

    fn index_type(&self) -> &'static str {
        "in_memory"
    }
}
