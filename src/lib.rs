//! CyShield Inference Server
//!
//! Realtime classification endpoint around a pre-trained pipeline.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                      CYSHIELD INFERENCE                      │
//! ├──────────────────────────────────────────────────────────────┤
//! │  raw record ──▶ Schema Normalizer ──▶ Pipeline (ONNX)        │
//! │                        │                   │                 │
//! │                        │           probabilities             │
//! │                        │                   ▼                 │
//! │                        │      argmax ──▶ Label Decoder       │
//! │                        ▼                   │                 │
//! │                    Explainer               │                 │
//! │                        └───────┬───────────┘                 │
//! │                                ▼                             │
//! │          {prediction, confidence, explanation}               │
//! └──────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod explain;
pub mod handlers;
pub mod model;
pub mod service;

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub use config::Config;
pub use error::{AppError, AppResult};
pub use service::{InferenceContext, PredictionResult};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub inference: Arc<InferenceContext>,
    pub config: Config,
}

/// Create the main router with all routes
pub fn create_router(state: AppState) -> Router {
    let max_body_bytes = state.config.max_body_bytes;

    Router::new()
        .route("/", get(handlers::health::home))
        .route("/health", get(handlers::health::check))
        .route("/predict", post(handlers::predict::predict))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
