//! Knowledge base domain - the passage index the retriever reads from

mod document;
mod index;

pub use document::{Document, RetrievedDocument};
pub use index::VectorIndex;

#[cfg(test)]
pub use index::MockVectorIndex;
