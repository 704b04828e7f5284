//! Health check handlers

use axum::{extract::State, Json};
use serde::Serialize;

use crate::AppState;

#[derive(Serialize)]
pub struct HomeResponse {
    status: &'static str,
    predict: &'static str,
    health: &'static str,
}

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
    timestamp: i64,
    model: ModelInfo,
}

#[derive(Serialize)]
pub struct ModelInfo {
    pipeline: String,
    features: usize,
    layout_hash: String,
    classes: Option<usize>,
    importances: bool,
}

pub async fn home() -> Json<HomeResponse> {
    Json(HomeResponse {
        status: "running",
        predict: "/predict",
        health: "/health",
    })
}

pub async fn check(State(state): State<AppState>) -> Json<HealthResponse> {
    let ctx = &state.inference;
    let importances = matches!(ctx.pipeline.feature_importances(), Ok(Some(v)) if v.len() == ctx.schema.len());

    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        timestamp: chrono::Utc::now().timestamp(),
        model: ModelInfo {
            pipeline: ctx.pipeline.describe(),
            features: ctx.schema.len(),
            layout_hash: format!("{:08x}", ctx.schema.layout_hash()),
            classes: ctx.labels.as_ref().map(|l| l.len()),
            importances,
        },
    })
}
