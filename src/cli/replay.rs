//! JSON-lines replay
//!
//! Records each `{"query", "response", "model"}` line in order against one
//! tracker, so repeated queries in the file are billed at retrieval rates.

use super::{print_report, print_usage};
use crate::app::AppConfig;
use anyhow::{Context, Result};
use serde::Deserialize;
use tokenmeter_llm::CostTracker;
use tokio::io::AsyncReadExt;
use tracing::warn;

/// One recorded interaction
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ReplayEntry {
    pub query: String,
    pub response: String,
    pub model: String,
}

/// Replay outcome counts
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ReplaySummary {
    pub recorded: usize,
    pub cache_hits: usize,
    pub skipped: usize,
    pub total_cost: f64,
}

pub async fn run(config: &AppConfig, input: &str, json: bool) -> Result<()> {
    let text = read_input(input).await?;
    let tracker = config.build_tracker()?;

    let summary = replay(&tracker, &text).await;

    println!(
        "Replayed {} calls ({} cache hits, {} skipped), ${} this run\n",
        summary.recorded, summary.cache_hits, summary.skipped, summary.total_cost
    );
    print_report(&tracker, json).await
}

async fn read_input(input: &str) -> Result<String> {
    if input == "-" {
        let mut text = String::new();
        tokio::io::stdin()
            .read_to_string(&mut text)
            .await
            .context("Failed to read stdin")?;
        Ok(text)
    } else {
        tokio::fs::read_to_string(input)
            .await
            .with_context(|| format!("Failed to read {input}"))
    }
}

/// Record every valid line; malformed lines and unknown models are skipped
pub async fn replay(tracker: &CostTracker, text: &str) -> ReplaySummary {
    let mut summary = ReplaySummary::default();

    for (index, line) in text.lines().enumerate() {
        let line_no = index + 1;
        if line.trim().is_empty() {
            continue;
        }

        let entry: ReplayEntry = match serde_json::from_str(line) {
            Ok(entry) => entry,
            Err(e) => {
                warn!(line = line_no, error = %e, "Skipping malformed replay line");
                summary.skipped += 1;
                continue;
            }
        };

        match tracker
            .record_usage(&entry.query, &entry.response, &entry.model)
            .await
        {
            Ok(usage) => {
                print_usage(&usage);
                summary.recorded += 1;
                summary.total_cost += usage.call_cost();
                if usage.cache_hit {
                    summary.cache_hits += 1;
                }
            }
            Err(e) => {
                println!("❌ line {line_no}: {e}\n");
                summary.skipped += 1;
            }
        }
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_replay_counts_hits_and_skips() {
        let tracker = CostTracker::default();
        let text = r#"
{"query": "What is Rust?", "response": "A language.", "model": "GPT-4.1"}
{"query": "What is Rust?", "response": "A language.", "model": " gpt-4.1 "}
not json
{"query": "What is Rust?", "response": "A language.", "model": "Claude Opus 4"}
{"query": "What is Rust?", "response": "A language.", "model": "openai03"}
"#;

        let summary = replay(&tracker, text).await;

        assert_eq!(summary.recorded, 3);
        assert_eq!(summary.cache_hits, 1);
        assert_eq!(summary.skipped, 2);
        assert!(summary.total_cost > 0.0);

        let records = tracker.records("gpt-4.1").await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].access_times().len(), 2);
    }

    #[tokio::test]
    async fn test_read_input_missing_file() {
        let err = read_input("/definitely/not/here.jsonl").await.unwrap_err();
        assert!(err.to_string().contains("Failed to read"));
    }
}
