use serde::Serialize;

/// Maximum number of contributions returned
pub const TOP_FEATURES: usize = 6;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureContribution {
    pub feature: String,
    pub importance: f64,
    pub value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExplainSource {
    ModelImportance,
    InputMagnitude,
}

/// Why the model-importance path was skipped
#[derive(Debug, Clone, PartialEq)]
pub enum FallbackReason {
    Unsupported,
    LengthMismatch { expected: usize, actual: usize },
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Explanation {
    pub source: ExplainSource,
    pub contributions: Vec<FeatureContribution>,
}
