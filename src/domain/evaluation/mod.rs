//! Batch evaluation domain: dataset items, judge verdicts and reports

mod dataset;
mod judgment;
mod report;

pub use dataset::{default_dataset, EvaluationItem};
pub use judgment::{
    extract_json, parse_judge_response, Judgment, JUDGE_PARSE_ERROR, OUT_OF_SCOPE_JUSTIFICATION,
};
pub use report::{EvaluationRecord, EvaluationReport, EvaluationSummary};
