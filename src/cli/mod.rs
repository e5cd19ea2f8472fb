//! CLI module for the RAG Q&A agent
//!
//! Provides subcommands:
//! - `serve`: HTTP server with the question form and JSON API
//! - `ask`: answer a single question on the terminal
//! - `ingest`: build the vector index from text files
//! - `evaluate`: run the evaluation dataset through the agent and a judge model

pub mod ask;
pub mod evaluate;
pub mod ingest;
pub mod serve;

use clap::{Parser, Subcommand};

use crate::config::AppConfig;
use crate::infrastructure::logging;

/// Retrieval-augmented Q&A agent over a local renewable-energy knowledge base
#[derive(Parser)]
#[command(name = "rag-qa-agent")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP server (question form + JSON API)
    Serve(serve::ServeArgs),

    /// Ask a single question
    Ask(ask::AskArgs),

    /// Build the vector index from the data directory
    Ingest(ingest::IngestArgs),

    /// Run the batch evaluation
    Evaluate(evaluate::EvaluateArgs),
}

/// Load `.env` and the layered configuration, then install logging
pub(crate) fn bootstrap() -> anyhow::Result<AppConfig> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;
    logging::init_logging(&config.logging)?;

    Ok(config)
}
