//! Cost Reporting
//!
//! This module contains report types and text formatting for the usage
//! caches and for single calls.

use super::record::{RecordedUsage, UsageRecord};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f UTC";

/// Cost report across all models
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostReport {
    /// When report was generated
    pub generated_at: DateTime<Utc>,
    /// Per-model sections, ordered by canonical model id
    pub models: Vec<ModelReport>,
}

impl CostReport {
    /// Lifetime cost summed over every model
    #[must_use]
    pub fn total_cost(&self) -> f64 {
        self.models.iter().map(|m| m.total_cost).sum()
    }

    /// Retrieval savings summed over every model
    #[must_use]
    pub fn estimated_savings(&self) -> f64 {
        self.models.iter().map(|m| m.estimated_savings).sum()
    }

    /// Section for a canonical model id
    #[must_use]
    pub fn model(&self, model: &str) -> Option<&ModelReport> {
        self.models.iter().find(|m| m.model == model)
    }

    /// Pretty-printed JSON
    ///
    /// # Errors
    ///
    /// Returns the serializer error (not expected for this type).
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Cache contents and totals for one model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelReport {
    /// Canonical model id
    pub model: String,
    /// Provider name
    pub provider: String,
    /// Records in insertion order
    pub records: Vec<UsageRecord>,
    /// Total accesses (first-seen plus hits)
    pub total_accesses: usize,
    /// Cache hits
    pub cache_hits: usize,
    /// Lifetime cost of all records
    pub total_cost: f64,
    /// Full price of the hits minus what they were billed
    pub estimated_savings: f64,
}

impl ModelReport {
    /// Summarize a model's records
    #[must_use]
    pub fn new(model: &str, provider: &str, records: Vec<UsageRecord>) -> Self {
        let total_accesses: usize = records.iter().map(|r| r.access_times().len()).sum();
        let cache_hits: usize = records.iter().map(UsageRecord::hit_count).sum();
        let total_cost: f64 = records.iter().map(UsageRecord::total_cost).sum();
        let estimated_savings: f64 = records.iter().map(UsageRecord::estimated_savings).sum();

        Self {
            model: model.to_string(),
            provider: provider.to_string(),
            records,
            total_accesses,
            cache_hits,
            total_cost,
            estimated_savings,
        }
    }
}

/// Format report as text
#[must_use]
pub fn format_report(report: &CostReport) -> String {
    let mut output = String::new();

    output.push_str("📊 **LLM Usage Cache Report**\n\n");
    output.push_str(&format!(
        "Generated: {}\n",
        report.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    output.push_str(&format!("Total Cost: ${:.6}\n", report.total_cost()));
    output.push_str(&format!(
        "Retrieval Savings: ${:.6}\n",
        report.estimated_savings()
    ));

    for model in &report.models {
        output.push('\n');
        output.push_str(&format_model(model));
    }

    output
}

/// Format one model's cache as text
#[must_use]
pub fn format_model(model: &ModelReport) -> String {
    let mut output = String::new();

    output.push_str(&format!("**{}** ({})\n", model.model, model.provider));
    output.push_str(&format!(
        "• {} queries, {} accesses, {} cache hits, ${:.6} total\n",
        model.records.len(),
        model.total_accesses,
        model.cache_hits,
        model.total_cost
    ));
    output.push_str("-------------------------------\n");

    for record in &model.records {
        output.push_str(&format!("Query: {}\n", record.query()));
        output.push_str(&format!(
            "Number of Tokens in Query: {}\n",
            record.query_tokens()
        ));
        output.push_str(&format!("Query Cost: ${}\n", record.query_cost()));
        output.push_str(&format!("LLM Response: {}\n", record.llm_response()));
        output.push_str(&format!(
            "Number of Tokens in Response: {}\n",
            record.response_tokens()
        ));
        output.push_str(&format!("Response Cost: ${}\n", record.response_cost()));
        output.push_str(&format!("Total Cost: ${}\n", record.total_cost()));
        let times: Vec<String> = record
            .access_times()
            .iter()
            .map(|t| t.format(TIME_FORMAT).to_string())
            .collect();
        output.push_str(&format!("Time: [{}]\n\n", times.join(", ")));
    }

    output.push_str("-------------------------------\n");
    output
}

/// Format the outcome of a single call
#[must_use]
pub fn format_call(usage: &RecordedUsage) -> String {
    let record = &usage.record;

    if usage.cache_hit {
        format!(
            "[{}] You have used this query before! You used {} tokens in your query. The retrieval cost is: ${}\n\
             The llm response used {} tokens. The cost is: ${}\n\
             New total cost is: ${}\n",
            usage.model,
            record.query_tokens(),
            usage.query_cost,
            record.response_tokens(),
            usage.response_cost,
            record.total_cost()
        )
    } else {
        format!(
            "[{}] You used {} tokens in your query. The cost was: ${}\n\
             The llm response used {} tokens. The cost was: ${}\n\
             Total cost was: ${}\n",
            usage.model,
            record.query_tokens(),
            usage.query_cost,
            record.response_tokens(),
            usage.response_cost,
            record.total_cost()
        )
    }
}
