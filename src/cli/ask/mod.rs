//! Ask command - answer one question on the terminal

use std::sync::Arc;

use clap::Args;

use crate::api::types::AskResponse;
use crate::domain::{RelevanceScore, WorkflowExecutor};

#[derive(Args, Clone, Debug)]
pub struct AskArgs {
    /// Question to ask; multiple words are joined with spaces
    #[arg(required = true, num_args = 1.., trailing_var_arg = true)]
    pub words: Vec<String>,

    /// Print the final state as JSON
    #[arg(long)]
    pub json: bool,
}

impl AskArgs {
    pub fn question(&self) -> String {
        self.words.join(" ")
    }
}

pub async fn run(args: AskArgs) -> anyhow::Result<()> {
    let config = super::bootstrap()?;
    config.validate()?;

    let llm_provider = crate::create_llm_provider(&config.llm)?;
    let index = Arc::new(crate::load_index(&config).await?);
    let executor = crate::create_executor(&config, llm_provider, index);

    let run = executor.run(&args.question()).await?;
    let response = AskResponse::from(run);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else {
        print!("{}", render_text(&response));
    }

    Ok(())
}

fn render_text(response: &AskResponse) -> String {
    let mut out = format!("Answer:\n{}\n", response.final_answer);

    if response.planner_decision {
        match &response.evaluator_response {
            RelevanceScore::Score(_) => {
                out.push_str(&format!("\nRelevance score: {}\n", response.evaluator_response));
            }
            RelevanceScore::Unparseable(raw) => {
                out.push_str(&format!(
                    "\nCould not parse the evaluation score. Raw output: {}\n",
                    raw
                ));
            }
        }
    }

    for (i, doc) in response.retrieved_docs.iter().flatten().enumerate() {
        out.push_str(&format!(
            "\n[Document {}] {}\n{}\n",
            i + 1,
            doc.source().unwrap_or("unknown source"),
            doc.content
        ));
    }

    out
}
