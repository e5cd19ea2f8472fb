use async_trait::async_trait;
use std::fmt::Debug;

use super::{LlmRequest, LlmResponse};
use crate::domain::DomainError;

/// Trait for chat-completion providers (Groq, OpenAI, Ollama, ...)
#[async_trait]
pub trait LlmProvider: Send + Sync + Debug {
    /// Send a chat completion request
    async fn chat(&self, model: &str, request: LlmRequest) -> Result<LlmResponse, DomainError>;

    /// Get the provider name
    fn provider_name(&self) -> &'static str;
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use crate::domain::llm::Message;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Scripted provider: replies are consumed in order, every request is recorded
    #[derive(Debug, Default)]
    pub struct MockLlmProvider {
        replies: Mutex<VecDeque<Result<String, String>>>,
        requests: Mutex<Vec<LlmRequest>>,
    }

    impl MockLlmProvider {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_reply(self, reply: impl Into<String>) -> Self {
            self.replies.lock().unwrap().push_back(Ok(reply.into()));
            self
        }

        pub fn with_error(self, error: impl Into<String>) -> Self {
            self.replies.lock().unwrap().push_back(Err(error.into()));
            self
        }

        pub fn call_count(&self) -> usize {
            self.requests.lock().unwrap().len()
        }

        /// Prompts sent so far, in call order
        pub fn prompts(&self) -> Vec<String> {
            self.requests
                .lock()
                .unwrap()
                .iter()
                .filter_map(|r| r.prompt().map(str::to_string))
                .collect()
        }

        pub fn requests(&self) -> Vec<LlmRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl LlmProvider for MockLlmProvider {
        async fn chat(&self, model: &str, request: LlmRequest) -> Result<LlmResponse, DomainError> {
            self.requests.lock().unwrap().push(request);

            match self.replies.lock().unwrap().pop_front() {
                Some(Ok(reply)) => Ok(LlmResponse::new(
                    "mock-response".to_string(),
                    model.to_string(),
                    Message::assistant(reply),
                )),
                Some(Err(error)) => Err(DomainError::provider("mock", error)),
                None => Err(DomainError::provider("mock", "No mock reply configured")),
            }
        }

        fn provider_name(&self) -> &'static str {
            "mock"
        }
    }
}
