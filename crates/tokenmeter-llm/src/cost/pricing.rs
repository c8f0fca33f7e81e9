//! Model Pricing - per-model rate table
//!
//! This module contains the pricing table the cost tracker resolves rates
//! from. All rates are USD per 1M billable units.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ============================================================================
// Model Pricing Constants (per 1M tokens, USD)
// ============================================================================

// Anthropic Claude 4 family
/// Claude Opus 4 query cost per 1M tokens
pub const CLAUDE_OPUS4_QUERY_COST: f64 = 18.75;
/// Claude Opus 4 response cost per 1M tokens
pub const CLAUDE_OPUS4_RESPONSE_COST: f64 = 75.00;
/// Claude Sonnet 4 query cost per 1M tokens
pub const CLAUDE_SONNET4_QUERY_COST: f64 = 3.75;
/// Claude Sonnet 4 response cost per 1M tokens
pub const CLAUDE_SONNET4_RESPONSE_COST: f64 = 15.00;
/// Claude cached query retrieval cost per 1M tokens
pub const CLAUDE_RETRIEVAL_COST: f64 = 1.50;

// OpenAI GPT-4.1 / o3
/// GPT-4.1 and o3 query cost per 1M tokens
pub const OPENAI_QUERY_COST: f64 = 2.00;
/// GPT-4.1 and o3 response cost per 1M tokens
pub const OPENAI_RESPONSE_COST: f64 = 8.00;
/// GPT-4.1 and o3 cached query retrieval cost per 1M tokens
pub const OPENAI_RETRIEVAL_COST: f64 = 0.50;

const UNITS_PER_MILLION: f64 = 1_000_000.0;

/// Normalize a model identifier: drop all whitespace, lowercase.
///
/// `"Claude Opus 4"`, `"claude opus 4"` and `"CLAUDEOPUS4"` all map to
/// `"claudeopus4"`.
#[must_use]
pub fn canonicalize_model(model: &str) -> String {
    model
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

// ============================================================================
// Cost Models
// ============================================================================

/// Pricing information for a model (per 1M units)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelPricing {
    /// Canonical model id
    pub model: String,
    /// Provider name
    pub provider: String,
    /// Cost per 1M query units on first processing (USD)
    pub query_cost_per_million: f64,
    /// Cost per 1M response units on first processing (USD)
    pub response_cost_per_million: f64,
    /// Cost per 1M query units when served from the cache (USD)
    pub retrieval_cost_per_million: f64,
}

impl ModelPricing {
    /// Create a pricing entry; the model id is canonicalized
    #[must_use]
    pub fn new(
        model: &str,
        provider: &str,
        query_cost_per_million: f64,
        response_cost_per_million: f64,
        retrieval_cost_per_million: f64,
    ) -> Self {
        Self {
            model: canonicalize_model(model),
            provider: provider.to_string(),
            query_cost_per_million,
            response_cost_per_million,
            retrieval_cost_per_million,
        }
    }

    /// Full-price cost of the query units
    #[must_use]
    pub fn query_cost(&self, units: usize) -> f64 {
        units as f64 * self.query_cost_per_million / UNITS_PER_MILLION
    }

    /// Full-price cost of the response units
    #[must_use]
    pub fn response_cost(&self, units: usize) -> f64 {
        units as f64 * self.response_cost_per_million / UNITS_PER_MILLION
    }

    /// Cost of serving a cached query of `units` query units
    #[must_use]
    pub fn retrieval_cost(&self, units: usize) -> f64 {
        units as f64 * self.retrieval_cost_per_million / UNITS_PER_MILLION
    }

    /// Check that every rate is finite and non-negative
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPricing`] naming the first bad rate.
    pub fn validate(&self) -> Result<()> {
        let rates = [
            ("query_cost_per_million", self.query_cost_per_million),
            ("response_cost_per_million", self.response_cost_per_million),
            ("retrieval_cost_per_million", self.retrieval_cost_per_million),
        ];

        for (field, value) in rates {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::InvalidPricing {
                    model: canonicalize_model(&self.model),
                    field,
                    value: value.to_string(),
                });
            }
        }
        Ok(())
    }
}

// ============================================================================
// Pricing Table
// ============================================================================

/// Rate table keyed by canonical model id
///
/// Serialized as a list of entries; deserialization goes through
/// [`PricingTable::insert`], so keys are canonical and rates are checked.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<ModelPricing>", into = "Vec<ModelPricing>")]
pub struct PricingTable {
    models: BTreeMap<String, ModelPricing>,
}

impl PricingTable {
    /// Create an empty table
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace an entry (keyed by its canonical id)
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPricing`] if any rate is negative, NaN or
    /// infinite. The table is left unchanged.
    pub fn insert(&mut self, pricing: ModelPricing) -> Result<()> {
        pricing.validate()?;
        self.store(pricing);
        Ok(())
    }

    /// Builder form of [`PricingTable::insert`]
    ///
    /// # Errors
    ///
    /// Same as [`PricingTable::insert`].
    pub fn with(mut self, pricing: ModelPricing) -> Result<Self> {
        self.insert(pricing)?;
        Ok(self)
    }

    fn store(&mut self, pricing: ModelPricing) {
        let key = canonicalize_model(&pricing.model);
        self.models.insert(
            key.clone(),
            ModelPricing {
                model: key,
                ..pricing
            },
        );
    }

    /// Resolve rates for a model identifier in any case or spacing
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownModel`] with the canonical id when the table
    /// has no entry for it.
    pub fn resolve(&self, model: &str) -> Result<&ModelPricing> {
        let key = canonicalize_model(model);
        self.models.get(&key).ok_or(Error::UnknownModel(key))
    }

    /// Whether the table prices this model
    #[must_use]
    pub fn contains(&self, model: &str) -> bool {
        self.models.contains_key(&canonicalize_model(model))
    }

    /// Entries ordered by canonical id
    pub fn iter(&self) -> impl Iterator<Item = &ModelPricing> {
        self.models.values()
    }

    /// Number of priced models
    #[must_use]
    pub fn len(&self) -> usize {
        self.models.len()
    }

    /// Whether the table is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

impl TryFrom<Vec<ModelPricing>> for PricingTable {
    type Error = Error;

    fn try_from(entries: Vec<ModelPricing>) -> Result<Self> {
        entries.into_iter().try_fold(Self::new(), Self::with)
    }
}

impl From<PricingTable> for Vec<ModelPricing> {
    fn from(table: PricingTable) -> Self {
        table.models.into_values().collect()
    }
}

/// Default pricing for the built-in models
#[must_use]
pub fn default_pricing() -> PricingTable {
    let mut table = PricingTable::new();
    for pricing in [
        ModelPricing::new(
            "claudeopus4",
            "anthropic",
            CLAUDE_OPUS4_QUERY_COST,
            CLAUDE_OPUS4_RESPONSE_COST,
            CLAUDE_RETRIEVAL_COST,
        ),
        ModelPricing::new(
            "claudesonnet4",
            "anthropic",
            CLAUDE_SONNET4_QUERY_COST,
            CLAUDE_SONNET4_RESPONSE_COST,
            CLAUDE_RETRIEVAL_COST,
        ),
        ModelPricing::new(
            "gpt-4.1",
            "openai",
            OPENAI_QUERY_COST,
            OPENAI_RESPONSE_COST,
            OPENAI_RETRIEVAL_COST,
        ),
        ModelPricing::new(
            "openaio3",
            "openai",
            OPENAI_QUERY_COST,
            OPENAI_RESPONSE_COST,
            OPENAI_RETRIEVAL_COST,
        ),
    ] {
        // Constant rates above are all finite and non-negative
        table.store(pricing);
    }
    table
}
