//! LLM judge for batch evaluation
//!
//! Asks a second model to grade a generated answer against the ground truth.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::domain::evaluation::{parse_judge_response, EvaluationItem, Judgment};
use crate::domain::workflow::prompts::JUDGE_PROMPT;
use crate::domain::{DomainError, LlmProvider, LlmRequest, PromptTemplate};

/// Grades answers on faithfulness and relevance (1-5 each)
#[derive(Debug)]
pub struct LlmJudge {
    provider: Arc<dyn LlmProvider>,
    model: String,
    temperature: f32,
    prompt: PromptTemplate,
}

impl LlmJudge {
    pub fn new(provider: Arc<dyn LlmProvider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature: 0.0,
            prompt: PromptTemplate::parse(JUDGE_PROMPT),
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Judge one answer
    ///
    /// Malformed judge output is returned as a `Judgment::Failed`; only
    /// transport and provider failures are errors.
    pub async fn judge(
        &self,
        item: &EvaluationItem,
        generated_answer: &str,
    ) -> Result<Judgment, DomainError> {
        let prompt = self
            .prompt
            .render_pairs(&[
                ("question", item.question.as_str()),
                ("ground_truth", item.ground_truth.as_str()),
                ("generated_answer", generated_answer),
            ])
            .map_err(|e| DomainError::internal(e.to_string()))?;

        let request = LlmRequest::builder()
            .user(prompt)
            .temperature(self.temperature)
            .build();

        debug!(model = %self.model, question = %item.question, "Requesting judgment");

        let response = self.provider.chat(&self.model, request).await?;
        let judgment = parse_judge_response(response.content());

        if !judgment.is_scored() {
            warn!(raw = %response.content(), "Judge returned malformed output");
        }

        Ok(judgment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::evaluation::JUDGE_PARSE_ERROR;
    use crate::domain::llm::MockLlmProvider;

    fn item() -> EvaluationItem {
        EvaluationItem::new(
            "What percentage of transport energy is renewable?",
            "Less than 4% of transport energy is from renewables.",
        )
    }

    #[tokio::test]
    async fn test_judge_parses_reply() {
        let llm = Arc::new(MockLlmProvider::new().with_reply(
            "```json\n{\"faithfulness\": 5, \"relevance\": 4, \"justification\": \"Accurate.\"}\n```",
        ));
        let judge = LlmJudge::new(llm.clone(), "judge-model");

        let judgment = judge.judge(&item(), "Under 4%.").await.unwrap();

        assert_eq!(judgment.scores(), Some((5, 4)));

        let request = &llm.requests()[0];
        assert_eq!(request.temperature, Some(0.0));
        let prompt = request.prompt().unwrap();
        assert!(prompt.contains("Less than 4% of transport energy"));
        assert!(prompt.contains("Under 4%."));
    }

    #[tokio::test]
    async fn test_judge_malformed_reply() {
        let llm = Arc::new(MockLlmProvider::new().with_reply("Looks good to me"));
        let judge = LlmJudge::new(llm, "judge-model");

        let judgment = judge.judge(&item(), "answer").await.unwrap();

        assert_eq!(
            judgment,
            Judgment::Failed {
                error: JUDGE_PARSE_ERROR.to_string(),
                raw_content: Some("Looks good to me".to_string()),
            }
        );
    }

    #[tokio::test]
    async fn test_judge_provider_error() {
        let llm = Arc::new(MockLlmProvider::new().with_error("timeout"));
        let judge = LlmJudge::new(llm, "judge-model");

        assert!(judge.judge(&item(), "answer").await.is_err());
    }
}
