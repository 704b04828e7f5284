//! Model Module - schema, pipeline and label decoding
//!
//! The trained artifacts are opaque; this module only knows how to feed
//! them a schema-shaped vector and read back a class.

pub mod artifacts;
pub mod labels;
pub mod onnx;
pub mod pipeline;
pub mod predictor;
pub mod schema;

// Re-export common types
pub use artifacts::ArtifactError;
pub use labels::{LabelEncoder, LabelError};
pub use onnx::OnnxPipeline;
pub use pipeline::{Pipeline, PipelineError};
pub use predictor::{ClassScore, DecodedLabel, LabelSource};
pub use schema::{FeatureSchema, FeatureValue, NormalizedVector};
