//! Application configuration types
//!
//! Contains the configuration structures for the tokenmeter binary and the
//! conversion into a ready-to-use [`CostTracker`].

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::sync::Arc;
use tokenmeter_llm::{
    default_pricing, CostTracker, Encoding, ModelPricing, PricingTable, TokenCounter,
};

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub pricing: PricingConfig,
    #[serde(default)]
    pub demo: DemoConfig,
}

/// Usage cache limits
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Maximum cached queries per model (unbounded when unset, never 0)
    #[serde(default)]
    pub max_entries_per_model: Option<NonZeroUsize>,
}

/// Pricing table configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingConfig {
    /// Start from the built-in model table
    #[serde(default = "default_true")]
    pub include_defaults: bool,
    /// Extra models, or overrides of built-in ones
    #[serde(default)]
    pub models: Vec<ModelEntry>,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            include_defaults: true,
            models: Vec::new(),
        }
    }
}

fn default_true() -> bool {
    true
}

/// One configured model: rates plus the encoding used to count its tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelEntry {
    pub model: String,
    #[serde(default = "default_provider")]
    pub provider: String,
    pub query_cost_per_million: f64,
    pub response_cost_per_million: f64,
    pub retrieval_cost_per_million: f64,
    pub encoding: Encoding,
}

fn default_provider() -> String {
    "custom".to_string()
}

/// Sample driver settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DemoConfig {
    /// Seconds to wait before repeating the first sample query
    #[serde(default)]
    pub pause_secs: u64,
}

impl AppConfig {
    /// Check that the configuration builds a usable pricing table
    pub fn validate(&self) -> Result<()> {
        self.pricing_table().map(drop)
    }

    /// Effective pricing table
    pub fn pricing_table(&self) -> Result<PricingTable> {
        let mut table = if self.pricing.include_defaults {
            default_pricing()
        } else {
            PricingTable::new()
        };

        for entry in &self.pricing.models {
            table
                .insert(ModelPricing::new(
                    &entry.model,
                    &entry.provider,
                    entry.query_cost_per_million,
                    entry.response_cost_per_million,
                    entry.retrieval_cost_per_million,
                ))
                .with_context(|| format!("Invalid pricing.models entry {:?}", entry.model))?;
        }

        Ok(table)
    }

    /// Token counter covering the built-in and configured models
    pub fn token_counter(&self) -> TokenCounter {
        self.pricing
            .models
            .iter()
            .fold(TokenCounter::default(), |counter, entry| {
                counter.with_model(&entry.model, entry.encoding)
            })
    }

    /// Build the cost tracker for this configuration
    pub fn build_tracker(&self) -> Result<CostTracker> {
        let tracker = CostTracker::new(self.pricing_table()?, Arc::new(self.token_counter()));

        Ok(match self.cache.max_entries_per_model {
            Some(max) => tracker.with_max_entries(max),
            None => tracker,
        })
    }
}
