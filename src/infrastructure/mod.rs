//! Infrastructure layer - External service implementations

pub mod embedding;
pub mod evaluation;
pub mod ingestion;
pub mod knowledge_base;
pub mod llm;
pub mod logging;
pub mod workflow;
