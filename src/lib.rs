//! RAG Q&A Agent
//!
//! Answers questions about renewable energy from a local text index:
//! - A planner rejects out-of-scope questions
//! - Retrieval over an in-memory cosine index persisted to JSON
//! - Answers grounded strictly in the retrieved passages, scored for relevance
//! - Batch evaluation with a second model acting as judge

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use api::state::AppState;
use config::{EmbeddingConfig, LlmConfig};
use domain::workflow::prompts::DEFAULT_DOMAIN_DESCRIPTION;
use domain::{EmbeddingProvider, LlmProvider};
use infrastructure::{
    knowledge_base::InMemoryVectorIndex,
    llm::{LlmProviderFactory, ProviderEndpoint},
    workflow::{RagWorkflowExecutor, WorkflowExecutorConfig},
};
use tracing::info;

/// Create the application state for the HTTP server
pub async fn create_app_state_with_config(config: &AppConfig) -> anyhow::Result<AppState> {
    let llm_provider = create_llm_provider(&config.llm)?;
    let index = Arc::new(load_index(config).await?);
    let executor = create_executor(config, llm_provider, index.clone());

    Ok(AppState::new(Arc::new(executor), index))
}

/// Chat provider for the configured OpenAI-compatible endpoint
pub fn create_llm_provider(config: &LlmConfig) -> anyhow::Result<Arc<dyn LlmProvider>> {
    let endpoint = ProviderEndpoint::new(&config.base_url, config.api_key()?)
        .with_timeout_secs(config.timeout_secs);

    info!(base_url = %config.base_url, model = %config.model, "Using chat provider");
    Ok(LlmProviderFactory::create(&endpoint)?)
}

/// Embedding provider for the configured OpenAI-compatible endpoint
pub fn create_embedding_provider(
    config: &EmbeddingConfig,
) -> anyhow::Result<Arc<dyn EmbeddingProvider>> {
    let endpoint = ProviderEndpoint::new(&config.base_url, config.api_key()?)
        .with_timeout_secs(config.timeout_secs);

    info!(base_url = %config.base_url, model = %config.model, "Using embedding provider");
    Ok(LlmProviderFactory::create_embedding(&endpoint)?)
}

/// Load the index file named in the config; missing file means empty index
pub async fn load_index(config: &AppConfig) -> anyhow::Result<InMemoryVectorIndex> {
    let embedder = create_embedding_provider(&config.embedding)?;
    let index =
        InMemoryVectorIndex::load(&config.index.path, embedder, &config.embedding.model).await?;

    Ok(index)
}

/// Workflow executor over the given provider and index
pub fn create_executor(
    config: &AppConfig,
    llm_provider: Arc<dyn LlmProvider>,
    index: Arc<InMemoryVectorIndex>,
) -> RagWorkflowExecutor {
    RagWorkflowExecutor::with_config(llm_provider, index, workflow_config(config))
}

fn workflow_config(config: &AppConfig) -> WorkflowExecutorConfig {
    WorkflowExecutorConfig {
        model: config.llm.model.clone(),
        temperature: config.llm.temperature,
        top_k: config.workflow.top_k,
        on_unrecognized_verdict: config.workflow.on_unrecognized_verdict,
        domain_description: config
            .workflow
            .domain_description
            .clone()
            .unwrap_or_else(|| DEFAULT_DOMAIN_DESCRIPTION.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::workflow::UnrecognizedVerdictPolicy;

    #[test]
    fn test_workflow_config_from_app_config() {
        let mut config = AppConfig::default();
        config.llm.model = "llama3".to_string();
        config.llm.temperature = Some(0.2);
        config.workflow.top_k = 5;
        config.workflow.on_unrecognized_verdict = UnrecognizedVerdictPolicy::Accept;

        let workflow = workflow_config(&config);

        assert_eq!(workflow.model, "llama3");
        assert_eq!(workflow.temperature, Some(0.2));
        assert_eq!(workflow.top_k, 5);
        assert_eq!(workflow.on_unrecognized_verdict, UnrecognizedVerdictPolicy::Accept);
        assert_eq!(workflow.domain_description, DEFAULT_DOMAIN_DESCRIPTION);
    }

    #[test]
    fn test_domain_description_override() {
        let mut config = AppConfig::default();
        config.workflow.domain_description = Some("Offshore wind farms".to_string());

        assert_eq!(workflow_config(&config).domain_description, "Offshore wind farms");
    }

    #[tokio::test]
    async fn test_load_index_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = AppConfig::default();
        config.index.path = dir.path().join("missing.json");

        let index = load_index(&config).await.unwrap();

        assert_eq!(
            domain::VectorIndex::document_count(&index).await.unwrap(),
            0
        );
        assert_eq!(index.model(), "all-minilm");
    }

    #[test]
    fn test_llm_provider_requires_api_key() {
        let mut config = AppConfig::default().llm;
        config.api_key_env = "RAG_QA_AGENT_TEST_UNSET_KEY".to_string();

        let err = create_llm_provider(&config).unwrap_err();

        assert!(err.to_string().contains("RAG_QA_AGENT_TEST_UNSET_KEY"));
    }
}
