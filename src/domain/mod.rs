//! Domain layer - Core types and traits

pub mod embedding;
pub mod error;
pub mod evaluation;
pub mod ingestion;
pub mod knowledge_base;
pub mod llm;
pub mod prompt;
pub mod workflow;

pub use embedding::{EmbeddingProvider, EmbeddingRequest, EmbeddingResponse};
pub use error::DomainError;
pub use evaluation::{EvaluationItem, EvaluationRecord, EvaluationReport, Judgment};
pub use ingestion::{Chunk, ChunkingConfig, ChunkingStrategy, IngestionReport};
pub use knowledge_base::{Document, RetrievedDocument, VectorIndex};
pub use llm::{LlmProvider, LlmRequest, LlmResponse, Message};
pub use prompt::{PromptTemplate, TemplateError};
pub use workflow::{
    RelevanceScore, StateUpdate, WorkflowError, WorkflowExecutor, WorkflowRun, WorkflowState,
};
