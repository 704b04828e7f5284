//! Explain Module - fast ranked feature contributions
//!
//! Not an attribution method: either the estimator's global importances or
//! the raw input magnitude, whichever is available.

pub mod engine;
pub mod types;

#[cfg(test)]
mod tests;

pub use engine::explain;
pub use types::{ExplainSource, Explanation, FallbackReason, FeatureContribution, TOP_FEATURES};
