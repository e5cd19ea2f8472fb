//! Vector index trait

use async_trait::async_trait;

use super::document::{Document, RetrievedDocument};
use crate::domain::error::DomainError;

#[cfg(test)]
use mockall::automock;

/// Nearest-neighbour passage lookup
///
/// Implementations own the embedding of both stored documents and queries,
/// so callers only deal in text.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Return up to `k` passages most similar to `query`, most similar first
    async fn nearest(&self, query: &str, k: usize) -> Result<Vec<RetrievedDocument>, DomainError>;

    /// Embed and store documents, returning how many were added
    async fn add_documents(&self, documents: Vec<Document>) -> Result<usize, DomainError>;

    /// Number of stored passages
    async fn document_count(&self) -> Result<usize, DomainError>;

    /// Get the index type name
    fn index_type(&self) -> &'static str;
}
