//! Usage Cache - per-model query memoization
//!
//! This module contains the cache that decides whether a query was seen
//! before for a model and bills it accordingly.

use super::pricing::ModelPricing;
use super::record::{RecordedUsage, UsageRecord};
use chrono::Utc;
use indexmap::IndexMap;
use std::num::NonZeroUsize;
use tokio::sync::{RwLock, RwLockWriteGuard};
use tracing::debug;

pub(crate) type Entries = IndexMap<String, UsageRecord>;

/// Usage cache for a single model
///
/// Entries keep insertion order so reports are reproducible. Lookup and
/// create/update run under one write guard, so two racing calls for a new
/// query cannot both take the first-seen path.
#[derive(Debug)]
pub struct UsageCache {
    /// Rates for this model
    pricing: ModelPricing,
    /// Records keyed by query text
    entries: RwLock<Entries>,
    /// Maximum records to keep (oldest inserted evicted first)
    max_entries: Option<NonZeroUsize>,
}

impl UsageCache {
    /// Create an unbounded cache for a model
    #[must_use]
    pub fn new(pricing: ModelPricing) -> Self {
        Self {
            pricing,
            entries: RwLock::new(IndexMap::new()),
            max_entries: None,
        }
    }

    /// Create with a record limit
    #[must_use]
    pub fn with_max_entries(mut self, max: NonZeroUsize) -> Self {
        self.max_entries = Some(max);
        self
    }

    /// Canonical model id this cache belongs to
    #[must_use]
    pub fn model(&self) -> &str {
        &self.pricing.model
    }

    /// Rates applied by this cache
    #[must_use]
    pub fn pricing(&self) -> &ModelPricing {
        &self.pricing
    }

    /// Record one query/response pair whose units were already counted
    pub async fn record(
        &self,
        query: &str,
        response: &str,
        query_units: usize,
        response_units: usize,
    ) -> RecordedUsage {
        let mut entries = self.entries.write().await;
        let now = Utc::now();

        if let Some(record) = entries.get_mut(query) {
            let retrieval_cost = self.pricing.retrieval_cost(record.query_tokens());
            record.record_hit(retrieval_cost, now);

            debug!(
                model = %self.pricing.model,
                query_tokens = record.query_tokens(),
                retrieval_cost,
                total_cost = record.total_cost(),
                accesses = record.access_times().len(),
                "Usage cache hit"
            );

            return RecordedUsage {
                model: self.pricing.model.clone(),
                record: record.clone(),
                cache_hit: true,
                query_cost: retrieval_cost,
                response_cost: 0.0,
            };
        }

        let query_cost = self.pricing.query_cost(query_units);
        let response_cost = self.pricing.response_cost(response_units);
        let record = UsageRecord::new(
            query,
            query_units,
            query_cost,
            response,
            response_units,
            response_cost,
            now,
        );

        if let Some(max) = self.max_entries {
            while entries.len() >= max.get() {
                if let Some((evicted, _)) = entries.shift_remove_index(0) {
                    debug!(model = %self.pricing.model, query = %evicted, "Evicted oldest usage record");
                }
            }
        }
        entries.insert(query.to_string(), record.clone());

        debug!(
            model = %self.pricing.model,
            query_tokens = query_units,
            response_tokens = response_units,
            total_cost = record.total_cost(),
            "Usage cache miss"
        );

        RecordedUsage {
            model: self.pricing.model.clone(),
            record,
            cache_hit: false,
            query_cost,
            response_cost,
        }
    }

    /// Get the record for a query
    pub async fn get(&self, query: &str) -> Option<UsageRecord> {
        self.entries.read().await.get(query).cloned()
    }

    /// Snapshot of all records in insertion order
    pub async fn records(&self) -> Vec<UsageRecord> {
        self.entries.read().await.values().cloned().collect()
    }

    /// Number of cached queries
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Whether the cache holds no queries
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Remove every record
    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }

    /// Exclusive access for multi-cache operations
    pub(crate) async fn lock(&self) -> RwLockWriteGuard<'_, Entries> {
        self.entries.write().await
    }
}
