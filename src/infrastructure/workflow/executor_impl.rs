//! Retrieval-augmented QA workflow executor

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::domain::workflow::prompts::{
    build_context, ANSWER_PROMPT, DEFAULT_DOMAIN_DESCRIPTION, EVALUATOR_PROMPT,
    NOT_RELEVANT_MESSAGE, PLANNER_PROMPT, REFUSAL_MESSAGE,
};
use crate::domain::workflow::{
    NodeExecution, PlannerVerdict, RelevanceScore, StateUpdate, UnrecognizedVerdictPolicy,
    WorkflowError, WorkflowExecutor, WorkflowNode, WorkflowRun, WorkflowState,
};
use crate::domain::{LlmProvider, LlmRequest, PromptTemplate, VectorIndex};

/// Model and retrieval settings for the workflow
#[derive(Debug, Clone)]
pub struct WorkflowExecutorConfig {
    /// Model used by the planner, answerer and evaluator
    pub model: String,
    /// Sampling temperature; provider default when unset
    pub temperature: Option<f32>,
    /// Passages retrieved per question
    pub top_k: usize,
    pub on_unrecognized_verdict: UnrecognizedVerdictPolicy,
    /// Knowledge base description shown to the planner
    pub domain_description: String,
}

impl Default for WorkflowExecutorConfig {
    fn default() -> Self {
        Self {
            model: "llama-3.3-70b-versatile".to_string(),
            temperature: None,
            top_k: 3,
            on_unrecognized_verdict: UnrecognizedVerdictPolicy::default(),
            domain_description: DEFAULT_DOMAIN_DESCRIPTION.to_string(),
        }
    }
}

/// Runs planning, retrieval, answering and evaluation against one model and
/// one vector index
pub struct RagWorkflowExecutor {
    llm_provider: Arc<dyn LlmProvider>,
    index: Arc<dyn VectorIndex>,
    config: WorkflowExecutorConfig,
    planner_prompt: PromptTemplate,
    answer_prompt: PromptTemplate,
    evaluator_prompt: PromptTemplate,
}

impl fmt::Debug for RagWorkflowExecutor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RagWorkflowExecutor")
            .field("llm_provider", &self.llm_provider.provider_name())
            .field("index", &self.index.index_type())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl RagWorkflowExecutor {
    pub fn new(llm_provider: Arc<dyn LlmProvider>, index: Arc<dyn VectorIndex>) -> Self {
        Self::with_config(llm_provider, index, WorkflowExecutorConfig::default())
    }

    pub fn with_config(
        llm_provider: Arc<dyn LlmProvider>,
        index: Arc<dyn VectorIndex>,
        config: WorkflowExecutorConfig,
    ) -> Self {
        Self {
            llm_provider,
            index,
            config,
            planner_prompt: PromptTemplate::parse(PLANNER_PROMPT),
            answer_prompt: PromptTemplate::parse(ANSWER_PROMPT),
            evaluator_prompt: PromptTemplate::parse(EVALUATOR_PROMPT),
        }
    }

    pub fn config(&self) -> &WorkflowExecutorConfig {
        &self.config
    }

    async fn execute_node(
        &self,
        node: WorkflowNode,
        state: &WorkflowState,
    ) -> Result<StateUpdate, WorkflowError> {
        match node {
            WorkflowNode::Planning => self.plan(state).await,
            WorkflowNode::Retrieval => self.retrieve(state).await,
            WorkflowNode::Answering => self.answer(state).await,
            WorkflowNode::Evaluation => self.evaluate(state).await,
        }
    }

    /// Decide whether the question is within the knowledge domain
    pub async fn plan(&self, state: &WorkflowState) -> Result<StateUpdate, WorkflowError> {
        let prompt = self.planner_prompt.render_pairs(&[
            ("domain", self.config.domain_description.as_str()),
            ("query", state.user_query()),
        ])?;

        let reply = self.complete("planning", prompt).await?;
        let verdict = PlannerVerdict::parse(&reply);
        let decision = self.config.on_unrecognized_verdict.decide(verdict);

        if verdict == PlannerVerdict::Unrecognized {
            warn!(
                reply = %reply,
                policy = ?self.config.on_unrecognized_verdict,
                decision,
                "Planner reply was neither affirmative nor negative"
            );
        }

        debug!(?verdict, decision, "Planning completed");

        if decision {
            Ok(StateUpdate::new().with_planner_decision(true))
        } else {
            Ok(StateUpdate::new()
                .with_planner_decision(false)
                .with_final_answer(NOT_RELEVANT_MESSAGE)
                .with_evaluator_response(RelevanceScore::zero()))
        }
    }

    /// Fetch the nearest passages for the question
    pub async fn retrieve(&self, state: &WorkflowState) -> Result<StateUpdate, WorkflowError> {
        let docs = self
            .index
            .nearest(state.user_query(), self.config.top_k)
            .await
            .map_err(|e| WorkflowError::stage("retrieval", e))?;

        debug!(retrieved = docs.len(), top_k = self.config.top_k, "Retrieval completed");

        Ok(StateUpdate::new().with_retrieved_docs(docs))
    }

    /// Answer strictly from the retrieved passages
    pub async fn answer(&self, state: &WorkflowState) -> Result<StateUpdate, WorkflowError> {
        let docs = state.retrieved_docs().unwrap_or_default();

        if docs.is_empty() {
            debug!("No passages retrieved, skipping answer generation");
            return Ok(StateUpdate::new()
                .with_final_answer(REFUSAL_MESSAGE)
                .with_evaluator_response(RelevanceScore::zero()));
        }

        let context = build_context(docs);
        let prompt = self.answer_prompt.render_pairs(&[
            ("context", context.as_str()),
            ("question", state.user_query()),
        ])?;

        let answer = self.complete("answering", prompt).await?;

        Ok(StateUpdate::new().with_final_answer(answer))
    }

    /// Score how relevant the answer is to the question
    pub async fn evaluate(&self, state: &WorkflowState) -> Result<StateUpdate, WorkflowError> {
        let answer = state.final_answer().unwrap_or_default();

        if answer.is_empty() {
            debug!("No answer to evaluate");
            return Ok(StateUpdate::new().with_evaluator_response(RelevanceScore::zero()));
        }

        let prompt = self.evaluator_prompt.render_pairs(&[
            ("question", state.user_query()),
            ("answer", answer),
        ])?;

        let reply = self.complete("evaluation", prompt).await?;
        let score = RelevanceScore::parse(&reply);

        if !score.is_parsed() {
            warn!(reply = %reply, "Evaluator reply is not a score between 0 and 100");
        }

        Ok(StateUpdate::new().with_evaluator_response(score))
    }

    async fn complete(&self, stage: &'static str, prompt: String) -> Result<String, WorkflowError> {
        let request = LlmRequest::builder()
            .user(prompt)
            .maybe_temperature(self.config.temperature)
            .build();

        let response = self
            .llm_provider
            .chat(&self.config.model, request)
            .await
            .map_err(|e| WorkflowError::stage(stage, e))?;

        if let Some(usage) = &response.usage {
            debug!(
                stage,
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "Model call completed"
            );
        }

        Ok(response.content().to_string())
    }
}

#[async_trait]
impl WorkflowExecutor for RagWorkflowExecutor {
    async fn run(&self, user_query: &str) -> Result<WorkflowRun, WorkflowError> {
        if user_query.trim().is_empty() {
            return Err(WorkflowError::invalid_input("Question must not be empty"));
        }

        let start = Instant::now();
        let mut state = WorkflowState::new(user_query);
        let mut nodes = Vec::new();
        let mut current = Some(WorkflowNode::ENTRY);

        while let Some(node) = current {
            let node_start = Instant::now();
            debug!(node = %node, "Executing node");

            let update = self.execute_node(node, &state).await?;
            state.apply(update)?;

            nodes.push(NodeExecution::new(
                node,
                node_start.elapsed().as_millis() as u64,
            ));
            current = node.next(&state);
        }

        let execution_time_ms = start.elapsed().as_millis() as u64;
        info!(
            planner_decision = state.planner_decision(),
            retrieved = state.retrieved_docs().map(<[_]>::len).unwrap_or(0),
            score = ?state.evaluator_response(),
            nodes = nodes.len(),
            execution_time_ms,
            "Workflow completed"
        );

        Ok(WorkflowRun {
            state,
            nodes,
            execution_time_ms,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::knowledge_base::{MockVectorIndex, RetrievedDocument};
    use crate::domain::llm::MockLlmProvider;
    use crate::domain::embedding::MockEmbeddingProvider;
    use crate::domain::workflow::prompts::CONTEXT_SEPARATOR;
    use crate::domain::{DomainError, Document};
    use crate::infrastructure::knowledge_base::InMemoryVectorIndex;

    const QUESTION: &str = "How many people work in renewables?";
    const TRANSPORT_QUESTION: &str =
        "What percentage of energy in the transportation sector comes from renewables?";
    const TRANSPORT_FACT: &str = "Less than 4% of transport energy is from renewables.";

    fn passages() -> Vec<RetrievedDocument> {
        vec![
            RetrievedDocument::new("A").with_metadata("source", "data/a.txt".into()),
            RetrievedDocument::new("B"),
            RetrievedDocument::new("C"),
        ]
    }

    fn index_returning(docs: Vec<RetrievedDocument>) -> MockVectorIndex {
        let mut index = MockVectorIndex::new();
        index
            .expect_nearest()
            .withf(|query, k| query.to_string() == QUESTION && *k == 3)
            .times(1)
            .returning(move |_, _| Ok(docs.clone()));
        index.expect_index_type().return_const("mock");
        index
    }

    fn unused_index() -> MockVectorIndex {
        let mut index = MockVectorIndex::new();
        index.expect_nearest().never();
        index.expect_index_type().return_const("mock");
        index
    }

    fn executor(llm: Arc<MockLlmProvider>, index: MockVectorIndex) -> RagWorkflowExecutor {
        RagWorkflowExecutor::new(llm, Arc::new(index))
    }

    async fn renewables_index(embedder: Arc<MockEmbeddingProvider>) -> Arc<InMemoryVectorIndex> {
        let index = InMemoryVectorIndex::new(embedder, "mock");
        index
            .add_documents(vec![
                Document::new(
                    "transport",
                    format!(
                        "{} Only a small percentage of the energy used in the transportation \
                         sector comes from renewables, mostly biofuels.",
                        TRANSPORT_FACT
                    ),
                ),
                Document::new(
                    "jobs",
                    "As of 2020, renewables employed about 12 million people worldwide.",
                ),
                Document::new(
                    "china",
                    "In 2021, China accounted for almost half of the global increase in \
                     renewable electricity.",
                ),
                Document::new(
                    "nuclear",
                    "Nuclear power is controversial because it requires mining uranium.",
                ),
            ])
            .await
            .unwrap();
        Arc::new(index)
    }

    /// Text between the context and question markers of the answer prompt
    fn answer_context(prompt: &str) -> &str {
        let start = prompt.find("**Context:**\n").unwrap() + "**Context:**\n".len();
        let end = prompt.find("\n---\n**Question:**").unwrap();
        &prompt[start..end]
    }

    #[tokio::test]
    async fn test_in_scope_question_runs_all_nodes() {
        let llm = Arc::new(
            MockLlmProvider::new()
                .with_reply("True")
                .with_reply("About 12 million people.")
                .with_reply("85"),
        );
        let executor = executor(llm.clone(), index_returning(passages()));

        let run = executor.run(QUESTION).await.unwrap();
        let state = &run.state;

        assert!(state.planner_decision());
        assert_eq!(state.retrieved_docs(), Some(passages().as_slice()));
        assert_eq!(state.final_answer(), Some("About 12 million people."));
        assert_eq!(state.evaluator_response(), Some(&RelevanceScore::Score(85)));
        assert_eq!(run.visited(), vec!["planning", "retrieval", "answering", "evaluation"]);
        assert_eq!(llm.call_count(), 3);

        let prompts = llm.prompts();
        assert!(prompts[0].contains(&format!("User Question: \"{}\"", QUESTION)));
        assert!(prompts[1].contains("A\n\n---\n\nB\n\n---\n\nC"));
        assert!(!prompts[1].contains("data/a.txt"));
        assert!(prompts[2].contains("About 12 million people."));
    }

    #[tokio::test]
    async fn test_out_of_scope_question_ends_after_planning() {
        let llm = Arc::new(MockLlmProvider::new().with_reply("False"));
        let executor = executor(llm.clone(), unused_index());

        let run = executor.run("What is the capital of Australia?").await.unwrap();
        let state = &run.state;

        assert!(!state.planner_decision());
        assert_eq!(state.final_answer(), Some(NOT_RELEVANT_MESSAGE));
        assert_eq!(state.evaluator_response(), Some(&RelevanceScore::Score(0)));
        assert!(state.retrieved_docs().is_none());
        assert_eq!(run.visited(), vec!["planning"]);
        assert_eq!(llm.call_count(), 1);
    }

    #[tokio::test]
    async fn test_empty_retrieval_refuses_without_model_call() {
        let llm = Arc::new(MockLlmProvider::new().with_reply("True"));
        let executor = executor(llm.clone(), index_returning(Vec::new()));

        let run = executor.run(QUESTION).await.unwrap();
        let state = &run.state;

        assert!(state.planner_decision());
        assert_eq!(state.final_answer(), Some(REFUSAL_MESSAGE));
        assert_eq!(state.evaluator_response(), Some(&RelevanceScore::Score(0)));
        assert_eq!(run.visited(), vec!["planning", "retrieval", "answering"]);
        assert_eq!(llm.call_count(), 1);
    }

    #[tokio::test]
    async fn test_unrecognized_verdict_rejected_by_default() {
        let llm = Arc::new(MockLlmProvider::new().with_reply("Not true"));
        let executor = executor(llm, unused_index());

        let run = executor.run(QUESTION).await.unwrap();

        assert!(!run.state.planner_decision());
        assert_eq!(run.state.final_answer(), Some(NOT_RELEVANT_MESSAGE));
    }

    #[tokio::test]
    async fn test_unrecognized_verdict_accepted_by_policy() {
        let llm = Arc::new(
            MockLlmProvider::new()
                .with_reply("Maybe")
                .with_reply("answer")
                .with_reply("70"),
        );
        let config = WorkflowExecutorConfig {
            on_unrecognized_verdict: UnrecognizedVerdictPolicy::Accept,
            ..Default::default()
        };
        let executor =
            RagWorkflowExecutor::with_config(llm, Arc::new(index_returning(passages())), config);

        let run = executor.run(QUESTION).await.unwrap();

        assert!(run.state.planner_decision());
        assert_eq!(run.state.evaluator_response(), Some(&RelevanceScore::Score(70)));
    }

    #[tokio::test]
    async fn test_unparseable_score_is_kept_raw() {
        let llm = Arc::new(
            MockLlmProvider::new()
                .with_reply("True")
                .with_reply("answer")
                .with_reply("very relevant"),
        );
        let executor = executor(llm, index_returning(passages()));

        let run = executor.run(QUESTION).await.unwrap();

        assert_eq!(
            run.state.evaluator_response(),
            Some(&RelevanceScore::Unparseable("very relevant".to_string()))
        );
    }

    #[tokio::test]
    async fn test_planner_failure_propagates() {
        let llm = Arc::new(MockLlmProvider::new().with_error("rate limited"));
        let executor = executor(llm, unused_index());

        let error = executor.run(QUESTION).await.unwrap_err();

        assert!(matches!(error, WorkflowError::Stage { stage: "planning", .. }));
    }

    #[tokio::test]
    async fn test_retrieval_failure_propagates() {
        let llm = Arc::new(MockLlmProvider::new().with_reply("True"));
        let mut index = MockVectorIndex::new();
        index
            .expect_nearest()
            .returning(|_, _| Err(DomainError::knowledge_base("index not initialized")));
        index.expect_index_type().return_const("mock");
        let executor = executor(llm.clone(), index);

        let error = executor.run(QUESTION).await.unwrap_err();

        assert!(matches!(error, WorkflowError::Stage { stage: "retrieval", .. }));
        assert_eq!(llm.call_count(), 1);
    }

    #[tokio::test]
    async fn test_empty_question_rejected() {
        let llm = Arc::new(MockLlmProvider::new());
        let executor = executor(llm.clone(), unused_index());

        let error = executor.run("   ").await.unwrap_err();

        assert!(matches!(error, WorkflowError::InvalidInput(_)));
        assert_eq!(llm.call_count(), 0);
    }

    #[tokio::test]
    async fn test_model_and_temperature_forwarded() {
        let llm = Arc::new(MockLlmProvider::new().with_reply("False"));
        let config = WorkflowExecutorConfig {
            temperature: Some(0.2),
            domain_description: "- Tidal power".to_string(),
            ..Default::default()
        };
        let executor = RagWorkflowExecutor::with_config(llm.clone(), Arc::new(unused_index()), config);

        executor.run(QUESTION).await.unwrap();

        let request = &llm.requests()[0];
        assert_eq!(request.temperature, Some(0.2));
        assert!(llm.prompts()[0].contains("- Tidal power"));
    }

    #[tokio::test]
    async fn test_evaluate_skips_empty_answer() {
        let llm = Arc::new(MockLlmProvider::new());
        let executor = executor(llm.clone(), unused_index());

        let mut state = WorkflowState::new(QUESTION);
        state.apply(StateUpdate::new().with_final_answer("")).unwrap();
        let update = executor.evaluate(&state).await.unwrap();

        assert_eq!(update.evaluator_response, Some(RelevanceScore::zero()));
        assert_eq!(llm.call_count(), 0);
    }

    #[tokio::test]
    async fn test_transport_question_answered_from_indexed_passage() {
        let index = renewables_index(Arc::new(MockEmbeddingProvider::new(256))).await;
        let llm = Arc::new(
            MockLlmProvider::new()
                .with_reply("True")
                .with_reply("Less than 4% of transport energy comes from renewables.")
                .with_reply("90"),
        );
        let executor = RagWorkflowExecutor::new(llm.clone(), index);

        let run = executor.run(TRANSPORT_QUESTION).await.unwrap();
        let state = &run.state;

        let docs = state.retrieved_docs().unwrap();
        assert!(!docs.is_empty());
        assert!(docs.iter().any(|doc| doc.content.contains(TRANSPORT_FACT)));

        let prompts = llm.prompts();
        let expected = docs
            .iter()
            .map(|doc| doc.content.as_str())
            .collect::<Vec<_>>()
            .join(CONTEXT_SEPARATOR);
        assert_eq!(answer_context(&prompts[1]), expected);

        let score = state.evaluator_response().and_then(RelevanceScore::value).unwrap();
        assert!(score >= 50);
        assert_eq!(run.visited(), vec!["planning", "retrieval", "answering", "evaluation"]);
    }

    #[tokio::test]
    async fn test_repeated_question_retrieves_same_passages() {
        let index = renewables_index(Arc::new(MockEmbeddingProvider::new(256))).await;
        let llm = Arc::new(
            MockLlmProvider::new()
                .with_reply("True")
                .with_reply("Under 4%.")
                .with_reply("80")
                .with_reply("True")
                .with_reply("Under 4%.")
                .with_reply("80"),
        );
        let executor = RagWorkflowExecutor::new(llm, index);

        let first = executor.run(TRANSPORT_QUESTION).await.unwrap();
        let second = executor.run(TRANSPORT_QUESTION).await.unwrap();

        assert!(first.state.retrieved_docs().is_some_and(|docs| !docs.is_empty()));
        assert_eq!(first.state.retrieved_docs(), second.state.retrieved_docs());
    }

    #[tokio::test]
    async fn test_missing_index_file_refuses() {
        let dir = tempfile::tempdir().unwrap();
        let embedder = Arc::new(MockEmbeddingProvider::new(256));
        let index =
            InMemoryVectorIndex::load(dir.path().join("missing.json"), embedder.clone(), "mock")
                .await
                .unwrap();
        let llm = Arc::new(MockLlmProvider::new().with_reply("True"));
        let executor = RagWorkflowExecutor::new(llm.clone(), Arc::new(index));

        let run = executor.run(TRANSPORT_QUESTION).await.unwrap();
        let state = &run.state;

        assert!(state.planner_decision());
        assert!(state.retrieved_docs().is_some_and(|docs| docs.is_empty()));
        assert_eq!(state.final_answer(), Some(REFUSAL_MESSAGE));
        assert_eq!(state.evaluator_response(), Some(&RelevanceScore::Score(0)));
        assert_eq!(run.visited(), vec!["planning", "retrieval", "answering"]);
        assert_eq!(llm.call_count(), 1);
        assert_eq!(embedder.call_count(), 0);
    }
}
