//! CLI module for Tokenmeter
//!
//! Provides commands:
//! - `demo`: Sample queries against every built-in model
//! - `replay`: Record query/response pairs from a JSON-lines file
//! - `record`: Record a single query/response pair
//! - `models`: List the pricing table

use crate::app::{load_config, AppConfig};
use clap::{Parser, Subcommand};
use tokenmeter_llm::{format_call, format_report, CostTracker, RecordedUsage};

pub mod demo;
pub mod models;
pub mod replay;

/// Tokenmeter CLI
#[derive(Parser, Debug)]
#[command(name = "tokenmeter")]
#[command(about = "LLM usage cost tracker with cached query pricing")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the sample queries against every built-in model
    Demo {
        /// Seconds to wait before repeating the first query
        #[arg(long)]
        pause_secs: Option<u64>,
        /// Print the final report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Record query/response pairs from a JSON-lines file ("-" for stdin)
    Replay {
        /// Input file with one {"query", "response", "model"} object per line
        input: String,
        /// Print the final report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Record a single query/response pair
    Record {
        /// Model name (case and spacing are ignored)
        #[arg(long)]
        model: String,
        /// Query text
        #[arg(long)]
        query: String,
        /// Model response text
        #[arg(long)]
        response: String,
    },
    /// List priced models
    Models,
}

/// Run the CLI command
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let Some(command) = cli.command else {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        cmd.print_help()?;
        println!();
        return Ok(());
    };

    let config = load_config()?;

    match command {
        Commands::Demo { pause_secs, json } => {
            let pause = pause_secs.unwrap_or(config.demo.pause_secs);
            demo::run(&config, pause, json).await
        }
        Commands::Replay { input, json } => replay::run(&config, &input, json).await,
        Commands::Record {
            model,
            query,
            response,
        } => record(&config, &model, &query, &response).await,
        Commands::Models => models::run(&config),
    }
}

async fn record(
    config: &AppConfig,
    model: &str,
    query: &str,
    response: &str,
) -> anyhow::Result<()> {
    let tracker = config.build_tracker()?;
    let usage = tracker.record_usage(query, response, model).await?;
    print_usage(&usage);
    Ok(())
}

/// Print a single call's cost summary
pub(crate) fn print_usage(usage: &RecordedUsage) {
    println!("{}", format_call(usage));
}

/// Print the tracker's report as text or JSON
pub(crate) async fn print_report(tracker: &CostTracker, json: bool) -> anyhow::Result<()> {
    let report = tracker.generate_report().await;
    if json {
        println!("{}", report.to_json_pretty()?);
    } else {
        println!("{}", format_report(&report));
    }
    Ok(())
}
