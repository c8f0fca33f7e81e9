//! Error types for tokenmeter-llm

use thiserror::Error;

/// Cost accounting error type
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// No pricing entry for the canonical model id
    #[error("unknown model: {0}")]
    UnknownModel(String),

    /// No token encoding registered for the canonical model id
    #[error("unsupported model: {0}")]
    UnsupportedModel(String),

    /// A rate is negative, NaN or infinite
    #[error("invalid pricing for {model}: {field} must be a finite, non-negative number (got {value})")]
    InvalidPricing {
        /// Canonical model id
        model: String,
        /// Offending rate field
        field: &'static str,
        /// Rejected value, as written
        value: String,
    },
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
