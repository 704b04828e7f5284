//! Configuration module

use std::env;
use std::path::PathBuf;

/// Default request body limit (1 MB)
pub const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,

    /// Environment (development, production)
    pub environment: String,

    /// Serialized pipeline (ONNX)
    pub model_path: PathBuf,

    /// Label encoder classes (JSON)
    pub label_path: PathBuf,

    /// Ordered feature names (JSON)
    pub features_path: PathBuf,

    /// Final estimator feature importances (JSON, optional)
    pub importances_path: PathBuf,

    /// Maximum accepted request body in bytes
    pub max_body_bytes: usize,

    /// Tag explanations with the path that produced them
    pub explain_provenance: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            environment: "development".to_string(),
            model_path: PathBuf::from("artifacts/model_pipeline.onnx"),
            label_path: PathBuf::from("artifacts/label_encoder.json"),
            features_path: PathBuf::from("artifacts/feature_names.json"),
            importances_path: PathBuf::from("artifacts/feature_importances.json"),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            explain_provenance: false,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),

            environment: env::var("ENVIRONMENT")
                .unwrap_or(defaults.environment),

            model_path: env::var("MODEL_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.model_path),

            label_path: env::var("LABEL_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.label_path),

            features_path: env::var("FEATURES_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.features_path),

            importances_path: env::var("IMPORTANCES_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.importances_path),

            max_body_bytes: env::var("MAX_BODY_BYTES")
                .ok()
                .and_then(|b| b.parse().ok())
                .unwrap_or(defaults.max_body_bytes),

            explain_provenance: env::var("EXPLAIN_PROVENANCE")
                .ok()
                .map(|v| parse_flag(&v))
                .unwrap_or(defaults.explain_provenance),
        }
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}
