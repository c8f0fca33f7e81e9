//! Tokenmeter LLM - memoized usage cost accounting
//!
//! This crate provides the cost accounting core for Tokenmeter:
//! - Token: billable-unit counting via tiktoken encodings
//! - Cost: pricing table, per-model usage caches and the cost tracker
//!
//! A query is billed at full price the first time it is recorded for a
//! model and at that model's retrieval rate on every repeat.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cost;
pub mod error;
pub mod token;

pub use cost::{
    canonicalize_model, default_pricing, format_call, format_report, CostReport, CostTracker,
    ModelPricing, ModelReport, PricingTable, RecordedUsage, UsageCache, UsageRecord,
};
pub use error::{Error, Result};
pub use token::{Encoding, TokenCounter, UnitCounter};
