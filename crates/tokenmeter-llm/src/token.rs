//! Token counting
//!
//! This module provides the billable-unit counter used by the cost tracker.
//! Each supported model is mapped to a tiktoken encoding; counting text for a
//! model without a registered encoding is an [`Error::UnsupportedModel`].

use crate::cost::canonicalize_model;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;
use tiktoken_rs::{cl100k_base, o200k_base, CoreBPE};

/// cl100k_base tokenizer (initialized once, thread-safe)
static CL100K: LazyLock<CoreBPE> = LazyLock::new(|| {
    cl100k_base().expect("cl100k_base tokenizer is a compile-time constant and should never fail")
});

/// o200k_base tokenizer (initialized once, thread-safe)
static O200K: LazyLock<CoreBPE> = LazyLock::new(|| {
    o200k_base().expect("o200k_base tokenizer is a compile-time constant and should never fail")
});

// ============================================================================
// Unit Counter
// ============================================================================

/// Counts billable units in a piece of text for a model
///
/// The cost tracker calls this with the canonical model id, so
/// implementations may assume `model` is already canonicalized.
#[cfg_attr(test, mockall::automock)]
pub trait UnitCounter: Send + Sync {
    /// Count units in `text` under `model`'s counting scheme
    fn count_units(&self, text: &str, model: &str) -> Result<usize>;
}

// ============================================================================
// Encodings
// ============================================================================

/// Tiktoken encoding used to count a model's tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Encoding {
    /// GPT-4 era encoding, also used as the Claude approximation
    #[serde(rename = "cl100k_base")]
    Cl100kBase,
    /// GPT-4o / o-series encoding
    #[serde(rename = "o200k_base")]
    O200kBase,
}

impl Encoding {
    fn bpe(self) -> &'static CoreBPE {
        match self {
            Self::Cl100kBase => &CL100K,
            Self::O200kBase => &O200K,
        }
    }

    /// Count tokens in `text` with this encoding
    #[must_use]
    pub fn count_tokens(self, text: &str) -> usize {
        if text.is_empty() {
            return 0;
        }
        self.bpe().encode_with_special_tokens(text).len()
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cl100kBase => write!(f, "cl100k_base"),
            Self::O200kBase => write!(f, "o200k_base"),
        }
    }
}

// ============================================================================
// Token Counter
// ============================================================================

/// Tiktoken-backed [`UnitCounter`]
///
/// Holds the model → encoding registry. `TokenCounter::default()` knows the
/// built-in models:
/// - `claudeopus4`, `claudesonnet4`: cl100k_base (approximate)
/// - `gpt-4.1`, `openaio3`: o200k_base
#[derive(Debug, Clone)]
pub struct TokenCounter {
    encodings: HashMap<String, Encoding>,
}

impl TokenCounter {
    /// Create a counter with no registered models
    #[must_use]
    pub fn empty() -> Self {
        Self {
            encodings: HashMap::new(),
        }
    }

    /// Register (or replace) the encoding for a model
    #[must_use]
    pub fn with_model(mut self, model: &str, encoding: Encoding) -> Self {
        self.encodings.insert(canonicalize_model(model), encoding);
        self
    }

    /// Encoding registered for a model, if any
    #[must_use]
    pub fn encoding_for(&self, model: &str) -> Option<Encoding> {
        self.encodings.get(&canonicalize_model(model)).copied()
    }
}

impl Default for TokenCounter {
    fn default() -> Self {
        Self::empty()
            .with_model("claudeopus4", Encoding::Cl100kBase)
            .with_model("claudesonnet4", Encoding::Cl100kBase)
            .with_model("gpt-4.1", Encoding::O200kBase)
            .with_model("openaio3", Encoding::O200kBase)
    }
}

impl UnitCounter for TokenCounter {
    fn count_units(&self, text: &str, model: &str) -> Result<usize> {
        let encoding = self
            .encoding_for(model)
            .ok_or_else(|| Error::UnsupportedModel(canonicalize_model(model)))?;
        Ok(encoding.count_tokens(text))
    }
}
