//! Cost Tracker - Usage accounting service
//!
//! This module contains the CostTracker, which owns one usage cache per
//! priced model and routes every call to the right one.

use super::cache::UsageCache;
use super::pricing::{canonicalize_model, default_pricing, PricingTable};
use super::record::{RecordedUsage, UsageRecord};
use super::report::{CostReport, ModelReport};
use crate::error::{Error, Result};
use crate::token::{TokenCounter, UnitCounter};
use chrono::Utc;
use std::collections::BTreeMap;
use std::num::NonZeroUsize;
use std::sync::Arc;
use tracing::{info, warn};

/// Cost tracker for memoized LLM usage
///
/// Build one at startup and share it by reference (or `Arc`). Caches are
/// created for every model in the pricing table and live as long as the
/// tracker.
pub struct CostTracker {
    /// Pricing information
    pricing: PricingTable,
    /// Billable unit counter
    counter: Arc<dyn UnitCounter>,
    /// One cache per canonical model id (sorted, which fixes lock order)
    caches: BTreeMap<String, UsageCache>,
}

impl std::fmt::Debug for CostTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CostTracker")
            .field("pricing", &self.pricing)
            .field("caches", &self.caches)
            .finish_non_exhaustive()
    }
}

impl Default for CostTracker {
    fn default() -> Self {
        Self::new(default_pricing(), Arc::new(TokenCounter::default()))
    }
}

impl CostTracker {
    /// Create a tracker for the given pricing table and unit counter
    #[must_use]
    pub fn new(pricing: PricingTable, counter: Arc<dyn UnitCounter>) -> Self {
        let caches = pricing
            .iter()
            .map(|p| (p.model.clone(), UsageCache::new(p.clone())))
            .collect();

        Self {
            pricing,
            counter,
            caches,
        }
    }

    /// Limit every model's cache to `max` records
    #[must_use]
    pub fn with_max_entries(mut self, max: NonZeroUsize) -> Self {
        self.caches = std::mem::take(&mut self.caches)
            .into_iter()
            .map(|(model, cache)| (model, cache.with_max_entries(max)))
            .collect();
        self
    }

    /// Pricing table in use
    #[must_use]
    pub fn pricing(&self) -> &PricingTable {
        &self.pricing
    }

    /// Cache for a model identifier in any case or spacing
    ///
    /// # Errors
    ///
    /// Returns `UnknownModel` when the model has no pricing entry.
    pub fn cache(&self, model: &str) -> Result<&UsageCache> {
        let key = canonicalize_model(model);
        self.caches.get(&key).ok_or(Error::UnknownModel(key))
    }

    /// Record a query/response pair against a model
    ///
    /// The first call for a (model, query) pair is billed at full price; every
    /// later call is billed at the model's retrieval rate on the originally
    /// counted query tokens.
    ///
    /// # Errors
    ///
    /// Returns `UnknownModel` or `UnsupportedModel`; no cache is touched in
    /// either case.
    pub async fn record_usage(
        &self,
        query: &str,
        response: &str,
        model: &str,
    ) -> Result<RecordedUsage> {
        let cache = self.cache(model).inspect_err(|e| warn!("{e}"))?;
        let canonical = cache.model();

        let query_units = self
            .counter
            .count_units(query, canonical)
            .inspect_err(|e| warn!("{e}"))?;
        let response_units = self
            .counter
            .count_units(response, canonical)
            .inspect_err(|e| warn!("{e}"))?;

        Ok(cache
            .record(query, response, query_units, response_units)
            .await)
    }

    /// Records for a model in insertion order
    ///
    /// # Errors
    ///
    /// Returns `UnknownModel` when the model has no pricing entry.
    pub async fn records(&self, model: &str) -> Result<Vec<UsageRecord>> {
        Ok(self.cache(model)?.records().await)
    }

    /// Empty one model's cache
    ///
    /// # Errors
    ///
    /// Returns `UnknownModel` when the model has no pricing entry.
    pub async fn clear_model(&self, model: &str) -> Result<()> {
        let cache = self.cache(model)?;
        cache.clear().await;
        info!(model = %cache.model(), "Cleared usage cache");
        Ok(())
    }

    /// Empty every model's cache
    ///
    /// All cache locks are held before any is cleared.
    pub async fn clear_all(&self) {
        let mut guards = Vec::with_capacity(self.caches.len());
        for cache in self.caches.values() {
            guards.push(cache.lock().await);
        }
        for entries in &mut guards {
            entries.clear();
        }
        info!(models = guards.len(), "Cleared all usage caches");
    }

    /// Generate a cost report
    pub async fn generate_report(&self) -> CostReport {
        let mut models = Vec::with_capacity(self.caches.len());
        for cache in self.caches.values() {
            let pricing = cache.pricing();
            models.push(ModelReport::new(
                &pricing.model,
                &pricing.provider,
                cache.records().await,
            ));
        }

        CostReport {
            generated_at: Utc::now(),
            models,
        }
    }

    /// Format report as text
    #[must_use]
    pub fn format_report(report: &CostReport) -> String {
        super::report::format_report(report)
    }
}
