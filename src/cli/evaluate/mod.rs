//! Evaluate command - run the dataset through the agent and a judge model

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::Args;
use tracing::info;

use crate::domain::evaluation::{default_dataset, EvaluationItem, EvaluationReport};
use crate::infrastructure::evaluation::{BatchEvaluator, LlmJudge};

#[derive(Args, Clone, Debug, Default)]
pub struct EvaluateArgs {
    /// JSON array of {question, ground_truth}; built-in dataset when unset
    #[arg(long)]
    pub dataset: Option<PathBuf>,

    /// Write the full report as JSON to this file
    #[arg(long)]
    pub output: Option<PathBuf>,
}

pub async fn run(args: EvaluateArgs) -> anyhow::Result<()> {
    let mut config = super::bootstrap()?;
    if args.dataset.is_some() {
        config.evaluation.dataset = args.dataset;
    }
    if args.output.is_some() {
        config.evaluation.output = args.output;
    }
    config.validate()?;

    let items = match &config.evaluation.dataset {
        Some(path) => load_dataset(path).await?,
        None => default_dataset(),
    };

    let llm_provider = crate::create_llm_provider(&config.llm)?;
    let index = Arc::new(crate::load_index(&config).await?);
    let executor = crate::create_executor(&config, llm_provider.clone(), index);
    let judge = LlmJudge::new(llm_provider, config.evaluation.judge_model(&config.llm))
        .with_temperature(config.evaluation.judge_temperature);

    info!(items = items.len(), "Starting evaluation");
    let report = BatchEvaluator::new(Arc::new(executor), judge)
        .run(&items)
        .await;

    print_report(&report);

    if let Some(path) = &config.evaluation.output {
        write_report(&report, path).await?;
        info!(path = %path.display(), "Evaluation report written");
    }

    Ok(())
}

async fn load_dataset(path: &Path) -> anyhow::Result<Vec<EvaluationItem>> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read dataset {}", path.display()))?;

    let items: Vec<EvaluationItem> = serde_json::from_str(&raw)
        .with_context(|| format!("Invalid dataset {}", path.display()))?;

    anyhow::ensure!(!items.is_empty(), "Dataset {} is empty", path.display());
    Ok(items)
}

async fn write_report(report: &EvaluationReport, path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }

    let json = serde_json::to_string_pretty(report)?;
    tokio::fs::write(path, json)
        .await
        .with_context(|| format!("Failed to write report {}", path.display()))?;

    Ok(())
}

fn print_report(report: &EvaluationReport) {
    let total = report.results.len();

    for (i, record) in report.results.iter().enumerate() {
        println!("\n==================== Item {}/{} ====================", i + 1, total);
        println!("Question: {}", record.question);
        println!("Agent's Answer: {}", record.generated_answer);
        println!(
            "Judge's Evaluation: {}",
            serde_json::to_string(&record.evaluation).unwrap_or_default()
        );
    }

    let summary = &report.summary;
    println!("\n==================== Evaluation Complete ====================");
    println!(
        "Items: {} (scored {}, failed {}, out of scope {})",
        summary.total_items, summary.scored_items, summary.failed_items, summary.out_of_scope_items
    );
    if let (Some(faithfulness), Some(relevance)) = (summary.avg_faithfulness, summary.avg_relevance)
    {
        println!(
            "Average faithfulness: {:.2}/5, average relevance: {:.2}/5",
            faithfulness, relevance
        );
    }
}
