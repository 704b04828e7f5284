//! Startup artifact loading
//!
//! Schema and model are required. The label encoder and importances are
//! optional: their absence only switches the request path to a fallback.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::labels::LabelEncoder;
use super::schema::FeatureSchema;

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("artifact not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read artifact: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed artifact: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid feature schema: {0}")]
    InvalidSchema(String),

    #[error("model load failed: {0}")]
    Model(String),
}

fn read(path: &Path) -> Result<Vec<u8>, ArtifactError> {
    if !path.exists() {
        return Err(ArtifactError::NotFound(path.to_path_buf()));
    }
    Ok(fs::read(path)?)
}

pub fn load_schema(path: &Path) -> Result<FeatureSchema, ArtifactError> {
    let schema = FeatureSchema::from_json(&read(path)?)?;
    tracing::info!(
        features = schema.len(),
        layout_hash = %format!("{:08x}", schema.layout_hash()),
        "Feature schema loaded from {}",
        path.display()
    );
    Ok(schema)
}

/// Missing or unreadable encoder degrades to `None`
pub fn load_label_encoder(path: &Path) -> Option<LabelEncoder> {
    match read(path).and_then(|bytes| LabelEncoder::from_json(&bytes)) {
        Ok(encoder) => {
            tracing::info!(classes = encoder.len(), "Label encoder loaded from {}", path.display());
            Some(encoder)
        }
        Err(e) => {
            tracing::warn!("Label encoder unavailable ({}), labels will come from the pipeline", e);
            None
        }
    }
}

/// Missing file means the estimator has no importances
pub fn load_importances(path: &Path) -> Result<Option<Vec<f64>>, ArtifactError> {
    match read(path) {
        Ok(bytes) => {
            let importances: Vec<f64> = serde_json::from_slice(&bytes)?;
            tracing::info!(count = importances.len(), "Feature importances loaded");
            Ok(Some(importances))
        }
        Err(ArtifactError::NotFound(_)) => {
            tracing::info!("No feature importances at {}, explanations use input magnitude", path.display());
            Ok(None)
        }
        Err(e) => Err(e),
    }
}
