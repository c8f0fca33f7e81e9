//! Usage Records
//!
//! This module contains the cached usage entry and the per-call result type.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Accumulated usage for one query against one model
///
/// Token counts, first-seen costs, the query and the response are fixed at
/// creation. Only `total_cost` and `access_times` change afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageRecord {
    query: String,
    query_tokens: usize,
    query_cost: f64,
    llm_response: String,
    response_tokens: usize,
    response_cost: f64,
    total_cost: f64,
    access_times: Vec<DateTime<Utc>>,
}

impl UsageRecord {
    pub(crate) fn new(
        query: &str,
        query_tokens: usize,
        query_cost: f64,
        llm_response: &str,
        response_tokens: usize,
        response_cost: f64,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            query: query.to_string(),
            query_tokens,
            query_cost,
            llm_response: llm_response.to_string(),
            response_tokens,
            response_cost,
            total_cost: query_cost + response_cost,
            access_times: vec![now],
        }
    }

    /// Charge a retrieval and log the access
    pub(crate) fn record_hit(&mut self, retrieval_cost: f64, now: DateTime<Utc>) {
        self.total_cost += retrieval_cost;
        self.touch(now);
    }

    // Access times must stay strictly increasing even if the clock stalls
    // or steps backwards.
    fn touch(&mut self, now: DateTime<Utc>) {
        let at = match self.access_times.last() {
            Some(last) if now <= *last => *last + Duration::nanoseconds(1),
            _ => now,
        };
        self.access_times.push(at);
    }

    /// Query text (cache key)
    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Query tokens counted on first insertion
    #[must_use]
    pub fn query_tokens(&self) -> usize {
        self.query_tokens
    }

    /// Full-price query cost charged on first insertion
    #[must_use]
    pub fn query_cost(&self) -> f64 {
        self.query_cost
    }

    /// Response text stored on first insertion
    #[must_use]
    pub fn llm_response(&self) -> &str {
        &self.llm_response
    }

    /// Response tokens counted on first insertion
    #[must_use]
    pub fn response_tokens(&self) -> usize {
        self.response_tokens
    }

    /// Full-price response cost charged on first insertion
    #[must_use]
    pub fn response_cost(&self) -> f64 {
        self.response_cost
    }

    /// Lifetime cost: first processing plus every retrieval
    #[must_use]
    pub fn total_cost(&self) -> f64 {
        self.total_cost
    }

    /// One timestamp per interaction, oldest first
    #[must_use]
    pub fn access_times(&self) -> &[DateTime<Utc>] {
        &self.access_times
    }

    /// Number of times this query was served from the cache
    #[must_use]
    pub fn hit_count(&self) -> usize {
        self.access_times.len().saturating_sub(1)
    }

    /// What the cache hits would have cost at full price, minus what they
    /// cost at the retrieval rate
    #[must_use]
    pub fn estimated_savings(&self) -> f64 {
        let first = self.query_cost + self.response_cost;
        let retrievals = self.total_cost - first;
        first * self.hit_count() as f64 - retrievals
    }
}

/// Outcome of a single `record_usage` call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordedUsage {
    /// Canonical model id
    pub model: String,
    /// Record state after this call
    pub record: UsageRecord,
    /// Whether the query was already cached
    pub cache_hit: bool,
    /// Query cost charged by this call (retrieval cost on a hit)
    pub query_cost: f64,
    /// Response cost charged by this call (zero on a hit)
    pub response_cost: f64,
}

impl RecordedUsage {
    /// Cost incurred by this call alone
    #[must_use]
    pub fn call_cost(&self) -> f64 {
        self.query_cost + self.response_cost
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_record_totals() {
        let now = Utc::now();
        let record = UsageRecord::new("Q1", 5, 10.0, "R1", 10, 80.0, now);

        assert_eq!(record.total_cost(), 90.0);
        assert_eq!(record.access_times(), &[now]);
        assert_eq!(record.hit_count(), 0);
        assert_eq!(record.estimated_savings(), 0.0);
    }

    #[test]
    fn test_hit_keeps_access_times_strictly_increasing() {
        let now = Utc::now();
        let mut record = UsageRecord::new("Q1", 5, 10.0, "R1", 10, 80.0, now);

        // Same instant, then a clock step backwards
        record.record_hit(2.5, now);
        record.record_hit(2.5, now - Duration::seconds(5));

        let times = record.access_times();
        assert_eq!(times.len(), 3);
        assert!(times.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(record.total_cost(), 95.0);
    }

    #[test]
    fn test_estimated_savings() {
        let now = Utc::now();
        let mut record = UsageRecord::new("Q1", 5, 10.0, "R1", 10, 80.0, now);
        record.record_hit(2.5, now + Duration::seconds(1));
        record.record_hit(2.5, now + Duration::seconds(2));

        // Two hits at 90 full price, paid 5
        assert_eq!(record.hit_count(), 2);
        assert_eq!(record.estimated_savings(), 175.0);
    }
}
