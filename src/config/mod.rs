//! Application configuration

mod app_config;

pub use app_config::{
    AppConfig, EmbeddingConfig, EvaluationConfig, IndexConfig, IngestionConfig, LlmConfig,
    LogFormat, LoggingConfig, ServerConfig, WorkflowConfig,
};
