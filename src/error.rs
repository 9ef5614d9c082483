//! Error handling
//!
//! Two layers: `PipelineError` for everything inside the scoring pipeline
//! (propagated unchanged to the caller, no retries), and `AppError` which
//! maps those onto HTTP responses at the service boundary.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::models::ModelError;

pub type AppResult<T> = Result<T, AppError>;

/// Errors raised by the preprocessing / training / scoring pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A required feature column is absent from the input.
    #[error("missing required column `{0}`")]
    Schema(String),

    /// A column is present but its values cannot support the requested
    /// statistic (e.g. a median over zero non-missing entries).
    #[error("column `{0}`: {1}")]
    Data(String, String),

    /// A model artifact could not be located or decoded.
    #[error("model artifact error: {0}")]
    Model(String),

    #[error(transparent)]
    Classifier(#[from] ModelError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// HTTP-facing errors.
#[derive(Debug)]
pub enum AppError {
    /// Request failed boundary validation.
    Validation(String),

    /// Required column missing from the input.
    Schema(String),

    /// Input columns present but statistically unusable.
    Data(String),

    /// Model loading or prediction failure.
    Model(String),

    /// Generic errors.
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.as_str()),
            AppError::Schema(msg) => (StatusCode::BAD_REQUEST, msg.as_str()),
            AppError::Data(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg.as_str()),
            AppError::Model(msg) => {
                tracing::error!("Model error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Model error occurred")
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };

        let body = Json(json!({
            "error": error_message,
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}

impl From<PipelineError> for AppError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::Schema(col) => {
                AppError::Schema(format!("missing required column `{}`", col))
            }
            PipelineError::Data(col, reason) => {
                AppError::Data(format!("column `{}`: {}", col, reason))
            }
            PipelineError::Model(msg) => AppError::Model(msg),
            PipelineError::Classifier(e) => AppError::Model(e.to_string()),
            other => AppError::Internal(other.to_string()),
        }
    }
}

impl From<ModelError> for AppError {
    fn from(err: ModelError) -> Self {
        AppError::Model(err.to_string())
    }
}
