use std::sync::Arc;

use super::http_client::HttpClient;
use super::OpenAiProvider;
use crate::domain::{DomainError, EmbeddingProvider, LlmProvider};
use crate::infrastructure::embedding::OpenAiEmbeddingProvider;

/// Connection settings for an OpenAI-compatible endpoint
#[derive(Debug, Clone, Default)]
pub struct ProviderEndpoint {
    pub base_url: String,
    /// Empty when the endpoint needs no authentication
    pub api_key: String,
    pub timeout_secs: Option<u64>,
}

impl ProviderEndpoint {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            timeout_secs: None,
        }
    }

    pub fn with_timeout_secs(mut self, timeout_secs: Option<u64>) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}

/// Factory for creating chat and embedding providers
#[derive(Debug)]
pub struct LlmProviderFactory;

impl LlmProviderFactory {
    pub fn create(endpoint: &ProviderEndpoint) -> Result<Arc<dyn LlmProvider>, DomainError> {
        Self::validate(endpoint)?;
        let client = HttpClient::from_timeout_secs(endpoint.timeout_secs)?;

        Ok(Arc::new(OpenAiProvider::with_base_url(
            client,
            endpoint.api_key.clone(),
            endpoint.base_url.clone(),
        )))
    }

    pub fn create_embedding(
        endpoint: &ProviderEndpoint,
    ) -> Result<Arc<dyn EmbeddingProvider>, DomainError> {
        Self::validate(endpoint)?;
        let client = HttpClient::from_timeout_secs(endpoint.timeout_secs)?;

        Ok(Arc::new(OpenAiEmbeddingProvider::with_base_url(
            client,
            endpoint.api_key.clone(),
            endpoint.base_url.clone(),
        )))
    }

    fn validate(endpoint: &ProviderEndpoint) -> Result<(), DomainError> {
        let base_url = endpoint.base_url.trim();

        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(DomainError::configuration(format!(
                "Provider base URL must start with http:// or https://, got '{}'",
                endpoint.base_url
            )));
        }

        Ok(())
    }
}
