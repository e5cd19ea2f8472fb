//! Request and response bodies for asking a question

use serde::{Deserialize, Serialize};

use crate::domain::{RelevanceScore, RetrievedDocument, WorkflowRun};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AskRequest {
    pub user_query: String,
}

/// Final workflow state as returned to API clients
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AskResponse {
    pub final_answer: String,
    /// Numeric score, or the raw evaluator text when it could not be parsed
    pub evaluator_response: RelevanceScore,
    /// Parsed score, present only when the planner accepted the question
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relevance_score: Option<u8>,
    pub planner_decision: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retrieved_docs: Option<Vec<RetrievedDocument>>,
    pub execution_time_ms: u64,
}

impl From<WorkflowRun> for AskResponse {
    fn from(run: WorkflowRun) -> Self {
        let execution_time_ms = run.execution_time_ms;
        let state = run.into_state();

        let evaluator_response = state
            .evaluator_response()
            .cloned()
            .unwrap_or_else(RelevanceScore::zero);
        let relevance_score = if state.planner_decision() {
            evaluator_response.value()
        } else {
            None
        };

        Self {
            final_answer: state.final_answer().unwrap_or_default().to_string(),
            relevance_score,
            evaluator_response,
            planner_decision: state.planner_decision(),
            retrieved_docs: state.retrieved_docs().map(<[_]>::to_vec),
            execution_time_ms,
        }
    }
}
