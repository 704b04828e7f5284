//! CyShield inference server entry point

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cyshield::model::{artifacts, OnnxPipeline};
use cyshield::{AppState, Config, InferenceContext};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env before the filter reads RUST_LOG
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "cyshield=debug,tower_http=debug".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();

    tracing::info!("CyShield inference server starting...");
    tracing::info!("Environment: {}", config.environment);

    let inference = load_context(&config)?;

    let state = AppState {
        inference: Arc::new(inference),
        config: config.clone(),
    };

    let app = cyshield::create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("🚀 Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}

/// Load schema, labels and pipeline once; read-only afterwards
fn load_context(config: &Config) -> anyhow::Result<InferenceContext> {
    let schema = artifacts::load_schema(&config.features_path)
        .context("failed to load feature schema")?;

    let labels = artifacts::load_label_encoder(&config.label_path);

    let importances = artifacts::load_importances(&config.importances_path)
        .context("failed to load feature importances")?;
    if let Some(fi) = &importances {
        if fi.len() != schema.len() {
            tracing::warn!(
                importances = fi.len(),
                features = schema.len(),
                "Importance count does not match schema, explanations will use input magnitude"
            );
        }
    }

    let pipeline = OnnxPipeline::load(&config.model_path, &schema)
        .context("failed to load model pipeline")?
        .with_importances(importances);

    Ok(InferenceContext::new(schema, labels, Arc::new(pipeline)))
}
