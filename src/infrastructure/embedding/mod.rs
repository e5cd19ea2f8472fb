//! Embedding provider implementations

mod openai;

pub use openai::{OpenAiEmbeddingProvider, DEFAULT_EMBEDDING_BASE_URL};

pub use super::llm::{HttpClient, HttpClientTrait};
