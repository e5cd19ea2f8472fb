//! Workflow error types

use thiserror::Error;

use crate::domain::prompt::TemplateError;
use crate::domain::DomainError;

/// Errors that abort a workflow run
///
/// Out-of-scope questions and empty retrievals are not errors; they end the
/// run through a short-circuit and surface as ordinary state.
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Field '{0}' was already written in this run")]
    FieldAlreadySet(&'static str),

    #[error("Invariant violated: {0}")]
    InvariantViolation(String),

    #[error("Prompt rendering failed: {0}")]
    Template(#[from] TemplateError),

    #[error("Stage '{stage}' failed: {source}")]
    Stage {
        stage: &'static str,
        #[source]
        source: DomainError,
    },
}

impl WorkflowError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn invariant(message: impl Into<String>) -> Self {
        Self::InvariantViolation(message.into())
    }

    pub fn stage(stage: &'static str, source: DomainError) -> Self {
        Self::Stage { stage, source }
    }

    /// The upstream error behind a failed stage, if any
    pub fn upstream(&self) -> Option<&DomainError> {
        match self {
            Self::Stage { source, .. } => Some(source),
            _ => None,
        }
    }
}
