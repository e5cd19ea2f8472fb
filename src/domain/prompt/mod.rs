//! Prompt templates

mod template;

pub use template::{PromptTemplate, PromptVariable, TemplateError};
