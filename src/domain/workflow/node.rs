//! Workflow nodes and the routing between them

use std::fmt;

use super::state::WorkflowState;

/// A stage of the workflow graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkflowNode {
    Planning,
    Retrieval,
    Answering,
    Evaluation,
}

impl WorkflowNode {
    /// Entry point of every run
    pub const ENTRY: Self = Self::Planning;

    pub fn name(self) -> &'static str {
        match self {
            Self::Planning => "planning",
            Self::Retrieval => "retrieval",
            Self::Answering => "answering",
            Self::Evaluation => "evaluation",
        }
    }

    /// Node to run after `self` has completed, or `None` when the run ends
    pub fn next(self, state: &WorkflowState) -> Option<Self> {
        match self {
            Self::Planning => state.planner_decision().then_some(Self::Retrieval),
            Self::Retrieval => Some(Self::Answering),
            Self::Answering if state.evaluator_response().is_some() => None,
            Self::Answering => Some(Self::Evaluation),
            Self::Evaluation => None,
        }
    }
}

impl fmt::Display for WorkflowNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
