//! Feature Schema - ordered feature layout the pipeline was trained on
//!
//! The schema defines both the set of accepted input keys and the slot
//! order of the vector handed to the pipeline. It is loaded once and never
//! changes for the lifetime of the process.

use std::collections::HashSet;
use std::fmt;

use crc32fast::Hasher;
use serde::Serialize;
use serde_json::{Map, Value};

use super::ArtifactError;

// ============================================================================
// FEATURE VALUE
// ============================================================================

/// One slot of a normalized vector
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FeatureValue {
    Number(f64),
    /// Categorical input, left for the pipeline's encoders
    Text(String),
}

impl FeatureValue {
    pub const ZERO: FeatureValue = FeatureValue::Number(0.0);

    /// Coerce an untrusted JSON value into a feature slot. Never fails.
    pub fn coerce(value: &Value) -> Self {
        match value {
            Value::Number(n) => Self::Number(n.as_f64().unwrap_or(0.0)),
            Value::Bool(b) => Self::Number(if *b { 1.0 } else { 0.0 }),
            Value::String(s) => match s.trim().parse::<f64>() {
                Ok(v) if v.is_finite() => Self::Number(v),
                _ => Self::Text(s.clone()),
            },
            // null, arrays and objects are not scalars
            Value::Null | Value::Array(_) | Value::Object(_) => Self::ZERO,
        }
    }

    /// Numeric view; text counts as 0
    pub fn as_f64(&self) -> f64 {
        match self {
            Self::Number(v) if v.is_finite() => *v,
            _ => 0.0,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(v) => Some(*v),
            Self::Text(_) => None,
        }
    }
}

impl fmt::Display for FeatureValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(v) => write!(f, "{}", v),
            Self::Text(s) => write!(f, "{:?}", s),
        }
    }
}

/// Schema-ordered, schema-length vector
pub type NormalizedVector = Vec<FeatureValue>;

// ============================================================================
// FEATURE SCHEMA
// ============================================================================

#[derive(Debug, Clone)]
pub struct FeatureSchema {
    names: Vec<String>,
    hash: u32,
}

impl FeatureSchema {
    /// Build a schema, rejecting empty or duplicated layouts
    pub fn new(names: Vec<String>) -> Result<Self, ArtifactError> {
        if names.is_empty() {
            return Err(ArtifactError::InvalidSchema("feature list is empty".to_string()));
        }

        let mut seen = HashSet::with_capacity(names.len());
        for name in &names {
            if !seen.insert(name.as_str()) {
                return Err(ArtifactError::InvalidSchema(format!("duplicate feature: {}", name)));
            }
        }

        let hash = compute_layout_hash(&names);
        Ok(Self { names, hash })
    }

    /// Parse a JSON array of feature names
    pub fn from_json(bytes: &[u8]) -> Result<Self, ArtifactError> {
        let names: Vec<String> = serde_json::from_slice(bytes)?;
        Self::new(names)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// CRC32 over the ordered names
    pub fn layout_hash(&self) -> u32 {
        self.hash
    }

    /// Map an arbitrary record onto the schema.
    ///
    /// Absent keys become 0, unknown keys are dropped, output is always in
    /// schema order with exactly `self.len()` slots.
    pub fn normalize(&self, record: &Map<String, Value>) -> NormalizedVector {
        let vector: NormalizedVector = self.names
            .iter()
            .map(|name| record.get(name).map(FeatureValue::coerce).unwrap_or(FeatureValue::ZERO))
            .collect();

        let matched = self.names.iter().filter(|n| record.contains_key(n.as_str())).count();
        let dropped = record.len() - matched;
        if dropped > 0 || matched < self.len() {
            tracing::debug!(
                dropped,
                missing = self.len() - matched,
                "Record does not match schema exactly"
            );
        }

        vector
    }
}

/// Compute CRC32 hash of the feature layout
pub fn compute_layout_hash(names: &[String]) -> u32 {
    let mut hasher = Hasher::new();
    for name in names {
        hasher.update(name.as_bytes());
        hasher.update(&[0]); // Separator
    }
    hasher.finalize()
}
