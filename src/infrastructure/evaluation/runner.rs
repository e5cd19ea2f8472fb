//! Batch evaluation runner

use std::sync::Arc;

use tracing::{error, info};

use super::judge::LlmJudge;
use crate::domain::evaluation::{EvaluationItem, EvaluationRecord, EvaluationReport, Judgment};
use crate::domain::WorkflowExecutor;

/// Runs every dataset item through the workflow and the judge, in order
///
/// A failure on one item is recorded against that item and the batch moves on.
#[derive(Debug)]
pub struct BatchEvaluator {
    executor: Arc<dyn WorkflowExecutor>,
    judge: LlmJudge,
}

impl BatchEvaluator {
    pub fn new(executor: Arc<dyn WorkflowExecutor>, judge: LlmJudge) -> Self {
        Self { executor, judge }
    }

    pub async fn run(&self, items: &[EvaluationItem]) -> EvaluationReport {
        let mut records = Vec::with_capacity(items.len());

        for (i, item) in items.iter().enumerate() {
            info!(item = i + 1, total = items.len(), question = %item.question, "Evaluating item");

            let record = self.evaluate_item(item).await;
            info!(
                item = i + 1,
                scored = record.evaluation.is_scored(),
                evaluation = ?record.evaluation,
                "Item evaluated"
            );
            records.push(record);
        }

        let report = EvaluationReport::new(records);
        info!(
            total = report.summary.total_items,
            scored = report.summary.scored_items,
            failed = report.summary.failed_items,
            avg_faithfulness = ?report.summary.avg_faithfulness,
            avg_relevance = ?report.summary.avg_relevance,
            "Evaluation finished"
        );

        report
    }

    async fn evaluate_item(&self, item: &EvaluationItem) -> EvaluationRecord {
        let state = match self.executor.run(&item.question).await {
            Ok(run) => run.into_state(),
            Err(e) => {
                error!(question = %item.question, error = %e, "Workflow failed");
                return EvaluationRecord::failed(item, format!("Workflow failed: {}", e));
            }
        };

        let generated_answer = state.final_answer().unwrap_or_default().to_string();

        let evaluation = if !state.planner_decision() {
            info!("Agent identified the question as out of scope");
            Judgment::out_of_scope()
        } else {
            match self.judge.judge(item, &generated_answer).await {
                Ok(judgment) => judgment,
                Err(e) => {
                    error!(question = %item.question, error = %e, "Judge call failed");
                    Judgment::upstream_error(format!("Judge failed: {}", e))
                }
            }
        };

        EvaluationRecord {
            question: item.question.clone(),
            ground_truth: item.ground_truth.clone(),
            generated_answer,
            planner_decision: Some(state.planner_decision()),
            relevance_score: state.evaluator_response().cloned(),
            evaluation,
        }
    }
}
