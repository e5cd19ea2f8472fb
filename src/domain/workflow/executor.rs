//! Workflow executor trait and run result

use std::fmt::Debug;

use async_trait::async_trait;
use serde::Serialize;

use super::error::WorkflowError;
use super::node::WorkflowNode;
use super::state::WorkflowState;

/// Timing of one completed node
#[derive(Debug, Clone, Serialize)]
pub struct NodeExecution {
    pub node: &'static str,
    pub execution_time_ms: u64,
}

impl NodeExecution {
    pub fn new(node: WorkflowNode, execution_time_ms: u64) -> Self {
        Self {
            node: node.name(),
            execution_time_ms,
        }
    }
}

/// Outcome of a completed run
#[derive(Debug, Clone, Serialize)]
pub struct WorkflowRun {
    pub state: WorkflowState,
    pub nodes: Vec<NodeExecution>,
    pub execution_time_ms: u64,
}

impl WorkflowRun {
    /// Names of the nodes that ran, in order
    pub fn visited(&self) -> Vec<&'static str> {
        self.nodes.iter().map(|n| n.node).collect()
    }

    pub fn into_state(self) -> WorkflowState {
        self.state
    }
}

/// Runs a user query through the workflow
#[async_trait]
pub trait WorkflowExecutor: Send + Sync + Debug {
    async fn run(&self, user_query: &str) -> Result<WorkflowRun, WorkflowError>;
}
