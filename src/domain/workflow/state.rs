//! Shared state record for a single workflow run

use serde::{Deserialize, Serialize};

use super::error::WorkflowError;
use super::score::RelevanceScore;
use crate::domain::knowledge_base::RetrievedDocument;

/// State threaded through the workflow stages
///
/// Created from the user query, then only changed through [`StateUpdate`]s.
/// Every stage-written field is write-once per run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowState {
    user_query: String,
    planner_decision: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    retrieved_docs: Option<Vec<RetrievedDocument>>,
    #[serde(default)]
    final_answer: Option<String>,
    #[serde(default)]
    evaluator_response: Option<RelevanceScore>,
    #[serde(skip)]
    planned: bool,
}

impl WorkflowState {
    pub fn new(user_query: impl Into<String>) -> Self {
        Self {
            user_query: user_query.into(),
            planner_decision: true,
            retrieved_docs: None,
            final_answer: None,
            evaluator_response: None,
            planned: false,
        }
    }

    pub fn user_query(&self) -> &str {
        &self.user_query
    }

    pub fn planner_decision(&self) -> bool {
        self.planner_decision
    }

    pub fn retrieved_docs(&self) -> Option<&[RetrievedDocument]> {
        self.retrieved_docs.as_deref()
    }

    pub fn final_answer(&self) -> Option<&str> {
        self.final_answer.as_deref()
    }

    pub fn evaluator_response(&self) -> Option<&RelevanceScore> {
        self.evaluator_response.as_ref()
    }

    /// Merge a stage's partial update
    ///
    /// The update is checked in full before anything is written, so a rejected
    /// update leaves the state untouched.
    pub fn apply(&mut self, update: StateUpdate) -> Result<(), WorkflowError> {
        if update.planner_decision.is_some() && self.planned {
            return Err(WorkflowError::FieldAlreadySet("planner_decision"));
        }
        if update.retrieved_docs.is_some() && self.retrieved_docs.is_some() {
            return Err(WorkflowError::FieldAlreadySet("retrieved_docs"));
        }
        if update.final_answer.is_some() && self.final_answer.is_some() {
            return Err(WorkflowError::FieldAlreadySet("final_answer"));
        }
        if update.evaluator_response.is_some() && self.evaluator_response.is_some() {
            return Err(WorkflowError::FieldAlreadySet("evaluator_response"));
        }

        let decision = update.planner_decision.unwrap_or(self.planner_decision);
        if update.retrieved_docs.is_some() && !decision {
            return Err(WorkflowError::invariant(
                "retrieved documents written for a rejected question",
            ));
        }

        if let Some(decision) = update.planner_decision {
            self.planner_decision = decision;
            self.planned = true;
        }
        if let Some(docs) = update.retrieved_docs {
            self.retrieved_docs = Some(docs);
        }
        if let Some(answer) = update.final_answer {
            self.final_answer = Some(answer);
        }
        if let Some(score) = update.evaluator_response {
            self.evaluator_response = Some(score);
        }

        Ok(())
    }
}

/// Partial update returned by a stage
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StateUpdate {
    pub planner_decision: Option<bool>,
    pub retrieved_docs: Option<Vec<RetrievedDocument>>,
    pub final_answer: Option<String>,
    pub evaluator_response: Option<RelevanceScore>,
}

impl StateUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_planner_decision(mut self, decision: bool) -> Self {
        self.planner_decision = Some(decision);
        self
    }

    pub fn with_retrieved_docs(mut self, docs: Vec<RetrievedDocument>) -> Self {
        self.retrieved_docs = Some(docs);
        self
    }

    pub fn with_final_answer(mut self, answer: impl Into<String>) -> Self {
        self.final_answer = Some(answer.into());
        self
    }

    pub fn with_evaluator_response(mut self, score: RelevanceScore) -> Self {
        self.evaluator_response = Some(score);
        self
    }
}
