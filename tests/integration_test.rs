//! Integration tests for Tokenmeter
//!
//! These tests drive the public tokenmeter-llm API with the real tiktoken
//! counter and the built-in pricing table.

use std::sync::Arc;

use chrono::Utc;
use tokenmeter_llm::{
    default_pricing, CostTracker, Encoding, Error, ModelPricing, TokenCounter, UnitCounter,
};

const QUERY: &str = "Hello! What are tokens and how are they calculated?";
const RESPONSE: &str = "Tokens can be anything from words, character sets, or even combinations of words and punctuation. Each model calculates them differently according to its own set of rules.";

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-12
}

// ============================================================================
// Cost Tracker
// ============================================================================

#[tokio::test]
async fn test_first_seen_cost_matches_pricing() {
    let tracker = CostTracker::default();
    let counter = TokenCounter::default();

    let usage = tracker
        .record_usage(QUERY, RESPONSE, "Claude Opus 4")
        .await
        .unwrap();

    let query_tokens = counter.count_units(QUERY, "claudeopus4").unwrap();
    let response_tokens = counter.count_units(RESPONSE, "claudeopus4").unwrap();

    assert_eq!(usage.model, "claudeopus4");
    assert!(!usage.cache_hit);
    assert_eq!(usage.record.query_tokens(), query_tokens);
    assert_eq!(usage.record.response_tokens(), response_tokens);
    assert!(approx_eq(
        usage.record.query_cost(),
        query_tokens as f64 * 18.75 / 1_000_000.0
    ));
    assert!(approx_eq(
        usage.record.response_cost(),
        response_tokens as f64 * 75.0 / 1_000_000.0
    ));
    assert!(approx_eq(usage.call_cost(), usage.record.total_cost()));
}

#[tokio::test]
async fn test_repeat_is_billed_at_retrieval_rate() {
    let tracker = CostTracker::default();

    let first = tracker.record_usage(QUERY, RESPONSE, "GPT-4.1").await.unwrap();
    let started = Utc::now();
    let second = tracker.record_usage(QUERY, RESPONSE, "gpt-4.1").await.unwrap();

    let retrieval = first.record.query_tokens() as f64 * 0.5 / 1_000_000.0;
    assert!(second.cache_hit);
    assert!(approx_eq(second.call_cost(), retrieval));
    assert!(approx_eq(
        second.record.total_cost(),
        first.record.total_cost() + retrieval
    ));
    assert_eq!(second.record.access_times().len(), 2);
    assert!(second.record.access_times()[1] >= started);
}

#[tokio::test]
async fn test_same_query_across_models_is_independent() {
    let tracker = CostTracker::default();

    for model in ["claude opus 4", "Claude Sonnet 4", "GPT-4.1", "openaio3"] {
        let usage = tracker.record_usage(QUERY, RESPONSE, model).await.unwrap();
        assert!(!usage.cache_hit, "{model}");
    }

    let report = tracker.generate_report().await;
    assert_eq!(report.models.len(), 4);
    assert!(report
        .models
        .iter()
        .all(|m| m.records.len() == 1 && m.cache_hits == 0));

    tracker.clear_model("claudesonnet4").await.unwrap();
    assert!(tracker.records("claudesonnet4").await.unwrap().is_empty());
    assert_eq!(tracker.records("claudeopus4").await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_clear_all_resets_every_model() {
    let tracker = CostTracker::default();

    tracker.record_usage(QUERY, RESPONSE, "openaio3").await.unwrap();
    tracker.record_usage(QUERY, RESPONSE, "claudeopus4").await.unwrap();

    tracker.clear_all().await;

    let report = tracker.generate_report().await;
    assert!(report.models.iter().all(|m| m.records.is_empty()));
    assert_eq!(report.total_cost(), 0.0);

    let usage = tracker.record_usage(QUERY, RESPONSE, "openaio3").await.unwrap();
    assert!(!usage.cache_hit);
}

#[tokio::test]
async fn test_unknown_model_is_an_error() {
    let tracker = CostTracker::default();

    let err = tracker
        .record_usage(QUERY, RESPONSE, "openai03")
        .await
        .unwrap_err();
    assert_eq!(err, Error::UnknownModel("openai03".to_string()));

    let report = tracker.generate_report().await;
    assert!(report.models.iter().all(|m| m.records.is_empty()));
}

#[tokio::test]
async fn test_priced_model_without_encoding_is_unsupported() {
    let pricing = default_pricing()
        .with(ModelPricing::new("Mystery", "custom", 1.0, 1.0, 0.1))
        .unwrap();
    let tracker = CostTracker::new(pricing, Arc::new(TokenCounter::default()));

    let err = tracker
        .record_usage(QUERY, RESPONSE, "mystery")
        .await
        .unwrap_err();
    assert_eq!(err, Error::UnsupportedModel("mystery".to_string()));
    assert!(tracker.records("mystery").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_custom_model_end_to_end() {
    let pricing = default_pricing()
        .with(ModelPricing::new("GPT-4o", "openai", 2.5, 10.0, 1.25))
        .unwrap();
    let counter = TokenCounter::default().with_model("gpt-4o", Encoding::O200kBase);
    let tracker = CostTracker::new(pricing, Arc::new(counter));

    tracker.record_usage(QUERY, RESPONSE, "GPT-4o").await.unwrap();
    let hit = tracker.record_usage(QUERY, RESPONSE, "GPT-4o").await.unwrap();

    assert!(hit.cache_hit);
    assert_eq!(hit.response_cost, 0.0);
}

#[tokio::test]
async fn test_concurrent_calls_on_shared_tracker() {
    let tracker = Arc::new(CostTracker::default());

    let mut handles = Vec::new();
    for i in 0..8 {
        let tracker = Arc::clone(&tracker);
        let model = if i % 2 == 0 { "GPT-4.1" } else { "Claude Opus 4" };
        handles.push(tokio::spawn(async move {
            tracker.record_usage(QUERY, RESPONSE, model).await.unwrap()
        }));
    }

    let mut misses = 0;
    for handle in handles {
        if !handle.await.unwrap().cache_hit {
            misses += 1;
        }
    }

    // One first-seen call per model
    assert_eq!(misses, 2);
    for model in ["gpt-4.1", "claudeopus4"] {
        let records = tracker.records(model).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].access_times().len(), 4);
    }
}
