//! Sample driver
//!
//! Runs two sample queries against every built-in model, waits, repeats the
//! first query so it is billed at the retrieval rate, then prints the caches.

use super::{print_report, print_usage};
use crate::app::AppConfig;
use std::time::Duration;
use tokenmeter_llm::CostTracker;
use tracing::info;

const QUERY_TOKENS: &str = "Hello! What are tokens and how are they calculated?";
const RESPONSE_TOKENS: &str = "Tokens can be anything from words, character sets, or even combinations of words and punctuation. Each model calculates them differently according to its own set of rules.";

const QUERY_YEAR: &str = "How many days are there in a year?";
const RESPONSE_YEAR: &str = "There are 365 days in a year, but every 4 years a leap year comes around which has 366 days instead.";

/// Model names as a user would type them
const DEMO_MODELS: [&str; 4] = ["claude opus 4", "Claude Sonnet 4", "GPT-4.1", "openaio3"];

/// A typo that no pricing entry matches
const MISSPELLED_MODEL: &str = "openai03";

pub async fn run(config: &AppConfig, pause_secs: u64, json: bool) -> anyhow::Result<()> {
    let tracker = config.build_tracker()?;

    println!("💰 Tokenmeter Demo\n");

    record_all(&tracker, QUERY_TOKENS, RESPONSE_TOKENS).await;
    record_all(&tracker, QUERY_YEAR, RESPONSE_YEAR).await;

    // Unknown models are reported, not fatal
    record_one(&tracker, QUERY_TOKENS, RESPONSE_TOKENS, MISSPELLED_MODEL).await;

    if pause_secs > 0 {
        println!("Waiting {pause_secs}s so repeated access times are easy to tell apart...\n");
        tokio::time::sleep(Duration::from_secs(pause_secs)).await;
    }

    info!("Repeating the first sample query");
    record_all(&tracker, QUERY_TOKENS, RESPONSE_TOKENS).await;

    print_report(&tracker, json).await
}

async fn record_all(tracker: &CostTracker, query: &str, response: &str) {
    for model in DEMO_MODELS {
        record_one(tracker, query, response, model).await;
    }
}

async fn record_one(tracker: &CostTracker, query: &str, response: &str, model: &str) {
    match tracker.record_usage(query, response, model).await {
        Ok(usage) => print_usage(&usage),
        Err(e) => println!("❌ {e}. Please try again.\n"),
    }
}
