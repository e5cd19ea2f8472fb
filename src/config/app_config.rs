use std::path::PathBuf;

use serde::Deserialize;

use crate::domain::ingestion::ChunkingConfig;
use crate::domain::workflow::UnrecognizedVerdictPolicy;
use crate::domain::DomainError;

/// Application configuration
///
/// Every section has defaults, so an empty environment yields a working
/// configuration pointed at Groq for chat and a local Ollama for embeddings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub llm: LlmConfig,
    pub embedding: EmbeddingConfig,
    pub index: IndexConfig,
    pub ingestion: IngestionConfig,
    pub workflow: WorkflowConfig,
    pub evaluation: EvaluationConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Chat model endpoint (any OpenAI-compatible API)
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub base_url: String,
    pub model: String,
    /// Name of the environment variable holding the API key
    pub api_key_env: String,
    pub temperature: Option<f32>,
    pub timeout_secs: Option<u64>,
}

/// Embedding endpoint (any OpenAI-compatible API)
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub base_url: String,
    pub model: String,
    /// Unset for endpoints without authentication
    pub api_key_env: Option<String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    pub path: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IngestionConfig {
    pub data_dir: PathBuf,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub batch_size: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    pub top_k: usize,
    pub on_unrecognized_verdict: UnrecognizedVerdictPolicy,
    /// Overrides the built-in renewable-energy description given to the planner
    pub domain_description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EvaluationConfig {
    /// Falls back to `llm.model`
    pub judge_model: Option<String>,
    pub judge_temperature: f32,
    /// JSON array of `{question, ground_truth}`; built-in dataset when unset
    pub dataset: Option<PathBuf>,
    pub output: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.groq.com/openai".to_string(),
            model: "llama-3.3-70b-versatile".to_string(),
            api_key_env: "GROQ_API_KEY".to_string(),
            temperature: None,
            timeout_secs: None,
        }
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            model: "all-minilm".to_string(),
            api_key_env: None,
            timeout_secs: None,
        }
    }
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("index/index.json"),
        }
    }
}

impl Default for IngestionConfig {
    fn default() -> Self {
        let chunking = ChunkingConfig::default();

        Self {
            data_dir: PathBuf::from("data"),
            chunk_size: chunking.chunk_size,
            chunk_overlap: chunking.chunk_overlap,
            batch_size: 32,
        }
    }
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            top_k: 3,
            on_unrecognized_verdict: UnrecognizedVerdictPolicy::default(),
            domain_description: None,
        }
    }
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            judge_model: None,
            judge_temperature: 0.0,
            dataset: None,
            output: None,
        }
    }
}

impl LlmConfig {
    /// Read the API key from the configured environment variable
    pub fn api_key(&self) -> Result<String, DomainError> {
        read_key(&self.api_key_env)
    }
}

impl EmbeddingConfig {
    pub fn api_key(&self) -> Result<String, DomainError> {
        match &self.api_key_env {
            Some(name) => read_key(name),
            None => Ok(String::new()),
        }
    }
}

fn read_key(name: &str) -> Result<String, DomainError> {
    std::env::var(name)
        .ok()
        .filter(|key| !key.trim().is_empty())
        .ok_or_else(|| {
            DomainError::configuration(format!("Environment variable {} is not set", name))
        })
}

impl IngestionConfig {
    pub fn chunking(&self) -> ChunkingConfig {
        ChunkingConfig::new(self.chunk_size, self.chunk_overlap)
    }
}

impl EvaluationConfig {
    pub fn judge_model<'a>(&'a self, llm: &'a LlmConfig) -> &'a str {
        self.judge_model.as_deref().unwrap_or(&llm.model)
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Check cross-field constraints that serde cannot express
    pub fn validate(&self) -> Result<(), DomainError> {
        self.ingestion.chunking().validate()?;

        if self.workflow.top_k == 0 {
            return Err(DomainError::validation("workflow.top_k must be greater than 0"));
        }

        if self.ingestion.batch_size == 0 {
            return Err(DomainError::validation(
                "ingestion.batch_size must be greater than 0",
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from_toml(toml: &str) -> AppConfig {
        config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.llm.model, "llama-3.3-70b-versatile");
        assert_eq!(config.llm.api_key_env, "GROQ_API_KEY");
        assert_eq!(config.embedding.model, "all-minilm");
        assert_eq!(config.index.path, PathBuf::from("index/index.json"));
        assert_eq!(config.ingestion.chunking(), ChunkingConfig::new(1000, 200));
        assert_eq!(config.workflow.top_k, 3);
        assert_eq!(
            config.workflow.on_unrecognized_verdict,
            UnrecognizedVerdictPolicy::Reject
        );
        assert_eq!(config.evaluation.judge_temperature, 0.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = from_toml(
            r#"
            [llm]
            model = "llama-3.1-8b-instant"

            [workflow]
            on_unrecognized_verdict = "accept"

            [logging]
            format = "json"
            "#,
        );

        assert_eq!(config.llm.model, "llama-3.1-8b-instant");
        assert_eq!(config.llm.base_url, "https://api.groq.com/openai");
        assert_eq!(
            config.workflow.on_unrecognized_verdict,
            UnrecognizedVerdictPolicy::Accept
        );
        assert_eq!(config.workflow.top_k, 3);
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_judge_model_falls_back_to_llm_model() {
        let mut config = AppConfig::default();
        assert_eq!(config.evaluation.judge_model(&config.llm), "llama-3.3-70b-versatile");

        config.evaluation.judge_model = Some("judge".to_string());
        assert_eq!(config.evaluation.judge_model(&config.llm), "judge");
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = AppConfig::default();
        config.ingestion.chunk_overlap = 1000;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.workflow.top_k = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_api_key_is_configuration_error() {
        let llm = LlmConfig {
            api_key_env: "RAG_QA_AGENT_TEST_UNSET_KEY".to_string(),
            ..Default::default()
        };

        assert!(matches!(llm.api_key(), Err(DomainError::Configuration { .. })));
        assert_eq!(EmbeddingConfig::default().api_key().unwrap(), "");
    }
}
