//! Question-answering workflow domain
//!
//! A run moves a [`WorkflowState`] through four nodes:
//! planning, retrieval, answering and evaluation. The planner may end the run
//! early for out-of-scope questions, and the answerer skips evaluation when
//! no passages were retrieved.

mod error;
mod executor;
mod node;
pub mod prompts;
mod score;
mod state;
mod verdict;

pub use error::WorkflowError;
pub use executor::{NodeExecution, WorkflowExecutor, WorkflowRun};
pub use node::WorkflowNode;
pub use score::{RelevanceScore, MAX_SCORE};
pub use state::{StateUpdate, WorkflowState};
pub use verdict::{PlannerVerdict, UnrecognizedVerdictPolicy};
