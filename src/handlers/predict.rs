//! Predict handler

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{Map, Value};

use crate::{AppError, AppResult, AppState};

/// POST /predict
pub async fn predict(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let expose_trace = !state.config.is_production();

    match run(&state, body).await {
        Ok(mut result) => {
            if !state.config.explain_provenance {
                result.explanation_source = None;
            }
            Json(result).into_response()
        }
        Err(e) => e.into_reply(expose_trace).into_response(),
    }
}

async fn run(
    state: &AppState,
    body: Result<Bytes, BytesRejection>,
) -> AppResult<crate::service::PredictionResult> {
    let record = parse_record(&body?)?;

    // CPU-bound and not interruptible: run it whole off the async workers
    let ctx = state.inference.clone();
    tokio::task::spawn_blocking(move || ctx.predict(&record))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
        .map_err(AppError::from)
}

/// Body must be a JSON object
pub fn parse_record(bytes: &[u8]) -> AppResult<Map<String, Value>> {
    match serde_json::from_slice::<Value>(bytes)? {
        Value::Object(map) => Ok(map),
        Value::Array(_) => Err(AppError::NotAnObject("array")),
        Value::String(_) => Err(AppError::NotAnObject("string")),
        Value::Number(_) => Err(AppError::NotAnObject("number")),
        Value::Bool(_) => Err(AppError::NotAnObject("boolean")),
        Value::Null => Err(AppError::NotAnObject("null")),
    }
}
