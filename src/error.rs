//! Error handling
//!
//! Every failure that escapes the predict flow is rendered here as
//! `{error, details, trace}`. No request failure ever takes the server down.

use axum::{
    extract::rejection::BytesRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::model::PipelineError;

pub type AppResult<T> = Result<T, AppError>;

/// Short label shared by every failure response
pub const PREDICTION_FAILED: &str = "Prediction failed";

#[derive(Debug, Error)]
pub enum AppError {
    #[error("invalid JSON body: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("request body must be a JSON object, got {0}")]
    NotAnObject(&'static str),

    #[error("request body rejected: {0}")]
    BodyRejected(#[from] BytesRejection),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error("prediction task failed: {0}")]
    Internal(String),
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub details: String,
    pub trace: String,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidJson(_) | AppError::NotAnObject(_) => StatusCode::BAD_REQUEST,
            AppError::BodyRejected(rejection) => rejection.status(),
            AppError::Pipeline(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Render the body; the trace is the full cause chain unless hidden
    pub fn body(&self, expose_trace: bool) -> ErrorBody {
        let details = self.to_string();

        let trace = if expose_trace {
            let chain: Vec<String> = std::iter::successors(
                Some(self as &(dyn std::error::Error + 'static)),
                |e| e.source(),
            )
            .map(|e| e.to_string())
            .collect();
            format!("{:?}\n\n{}", self, chain.join("\nCaused by: "))
        } else {
            String::new()
        };

        ErrorBody { error: PREDICTION_FAILED, details, trace }
    }

    pub fn into_reply(self, expose_trace: bool) -> ErrorReply {
        ErrorReply { error: self, expose_trace }
    }
}

/// An `AppError` bound to the server's trace policy
#[derive(Debug)]
pub struct ErrorReply {
    error: AppError,
    expose_trace: bool,
}

impl IntoResponse for ErrorReply {
    fn into_response(self) -> Response {
        let status = self.error.status();
        if status.is_server_error() {
            tracing::error!("Prediction failed: {}", self.error);
        } else {
            tracing::warn!("Rejected request: {}", self.error);
        }

        (status, Json(self.error.body(self.expose_trace))).into_response()
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.into_reply(true).into_response()
    }
}
