//! Pipeline capability
//!
//! The trained pipeline is opaque: preprocessing plus a final classifier.
//! The core only needs these three capabilities, so stub implementations
//! can stand in for the ONNX session in tests.

use thiserror::Error;

use super::schema::FeatureValue;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("expected {expected} features, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error("feature {index} is not numeric: {value}")]
    NonNumericInput { index: usize, value: String },

    #[error("pipeline returned an empty probability distribution")]
    EmptyDistribution,

    #[error("pipeline output missing: {0}")]
    MissingOutput(String),

    #[error("feature importances unavailable: {0}")]
    Importances(String),

    #[error("inference failed: {0}")]
    Runtime(String),
}

pub trait Pipeline: Send + Sync {
    /// Per-class probabilities, in the model's class order
    fn predict_proba(&self, features: &[FeatureValue]) -> Result<Vec<f32>, PipelineError>;

    /// The pipeline's own class prediction, stringified
    fn predict_label(&self, features: &[FeatureValue]) -> Result<String, PipelineError>;

    /// Final estimator importances. `Ok(None)` when the estimator has none.
    fn feature_importances(&self) -> Result<Option<Vec<f64>>, PipelineError> {
        Ok(None)
    }

    /// Short description for logs and health output
    fn describe(&self) -> String {
        "pipeline".to_string()
    }
}
