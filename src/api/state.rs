//! Application state shared by all handlers

use std::sync::Arc;

use crate::domain::{VectorIndex, WorkflowExecutor};

/// Shared services; cloned per request
#[derive(Clone)]
pub struct AppState {
    pub executor: Arc<dyn WorkflowExecutor>,
    /// Same index the executor retrieves from, read by the readiness probe
    pub index: Arc<dyn VectorIndex>,
}

impl AppState {
    pub fn new(executor: Arc<dyn WorkflowExecutor>, index: Arc<dyn VectorIndex>) -> Self {
        Self { executor, index }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::domain::knowledge_base::{MockVectorIndex, RetrievedDocument};
    use crate::domain::llm::MockLlmProvider;
    use crate::infrastructure::workflow::RagWorkflowExecutor;

    /// Index that returns `docs` for every query and reports `count` entries
    pub fn index_with(docs: Vec<RetrievedDocument>, count: usize) -> Arc<MockVectorIndex> {
        let mut index = MockVectorIndex::new();
        index
            .expect_nearest()
            .returning(move |_, _| Ok(docs.clone()));
        index
            .expect_document_count()
            .returning(move || Ok(count));
        index.expect_index_type().return_const("mock");
        Arc::new(index)
    }

    pub fn state_with(llm: MockLlmProvider, index: Arc<MockVectorIndex>) -> AppState {
        let executor = RagWorkflowExecutor::new(Arc::new(llm), index.clone());
        AppState::new(Arc::new(executor), index)
    }
}
