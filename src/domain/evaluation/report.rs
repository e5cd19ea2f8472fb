//! Batch evaluation records and summary

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::dataset::EvaluationItem;
use super::judgment::Judgment;
use crate::domain::workflow::RelevanceScore;

// ============================================================================
// EvaluationRecord
// ============================================================================

/// Result of evaluating one dataset item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationRecord {
    pub question: String,
    pub ground_truth: String,
    /// Empty when the workflow failed before producing an answer
    pub generated_answer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub planner_decision: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relevance_score: Option<RelevanceScore>,
    pub evaluation: Judgment,
}

impl EvaluationRecord {
    /// Record for an item whose workflow run failed
    pub fn failed(item: &EvaluationItem, error: impl Into<String>) -> Self {
        Self {
            question: item.question.clone(),
            ground_truth: item.ground_truth.clone(),
            generated_answer: String::new(),
            planner_decision: None,
            relevance_score: None,
            evaluation: Judgment::upstream_error(error),
        }
    }
}

// ============================================================================
// EvaluationSummary
// ============================================================================

/// Aggregates over a batch
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvaluationSummary {
    pub total_items: usize,
    pub scored_items: usize,
    pub failed_items: usize,
    pub out_of_scope_items: usize,
    /// Mean faithfulness over scored items
    pub avg_faithfulness: Option<f64>,
    /// Mean relevance over scored items
    pub avg_relevance: Option<f64>,
    /// Mean evaluator score over items the planner accepted with a parsed score
    pub avg_relevance_score: Option<f64>,
}

impl EvaluationSummary {
    pub fn from_records(records: &[EvaluationRecord]) -> Self {
        let scores: Vec<(u8, u8)> = records.iter().filter_map(|r| r.evaluation.scores()).collect();
        let relevance_scores: Vec<u8> = records
            .iter()
            .filter(|r| r.planner_decision == Some(true))
            .filter_map(|r| r.relevance_score.as_ref().and_then(RelevanceScore::value))
            .collect();

        Self {
            total_items: records.len(),
            scored_items: scores.len(),
            failed_items: records.len() - scores.len(),
            out_of_scope_items: records
                .iter()
                .filter(|r| r.planner_decision == Some(false))
                .count(),
            avg_faithfulness: mean(scores.iter().map(|(f, _)| *f)),
            avg_relevance: mean(scores.iter().map(|(_, r)| *r)),
            avg_relevance_score: mean(relevance_scores.into_iter()),
        }
    }
}

fn mean(values: impl Iterator<Item = u8>) -> Option<f64> {
    let (sum, count) = values.fold((0u64, 0u64), |(sum, count), v| (sum + v as u64, count + 1));

    (count > 0).then(|| sum as f64 / count as f64)
}

// ============================================================================
// EvaluationReport
// ============================================================================

/// Full batch output, as written by `evaluate --output`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub generated_at: DateTime<Utc>,
    pub summary: EvaluationSummary,
    pub results: Vec<EvaluationRecord>,
}

impl EvaluationReport {
    pub fn new(results: Vec<EvaluationRecord>) -> Self {
        Self {
            generated_at: Utc::now(),
            summary: EvaluationSummary::from_records(&results),
            results,
        }
    }
}
