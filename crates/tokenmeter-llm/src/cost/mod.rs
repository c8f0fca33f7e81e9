//! Cost Tracking - memoized LLM usage accounting
//!
//! This module bills each query once at full price per model and every
//! repeat at the model's cheaper retrieval rate.
//!
//! # Module Structure
//!
//! - `pricing`: Model pricing table and model id canonicalization
//! - `record`: Cached usage records and per-call results
//! - `cache`: Per-model usage cache
//! - `tracker`: CostTracker implementation
//! - `report`: Cost reports and text formatting

mod cache;
mod pricing;
mod record;
mod report;
mod tracker;


// Re-export public types
pub use cache::UsageCache;
pub use pricing::{canonicalize_model, default_pricing, ModelPricing, PricingTable};
pub use record::{RecordedUsage, UsageRecord};
pub use report::{format_call, format_model, format_report, CostReport, ModelReport};
pub use tracker::CostTracker;
