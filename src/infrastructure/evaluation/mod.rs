//! Batch evaluation: LLM judge and runner

mod judge;
mod runner;

pub use judge::LlmJudge;
pub use runner::BatchEvaluator;
