use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::llm_client::json_block::JsonBlockError;
use crate::llm_client::LlmError;
use crate::validation::FieldViolation;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Invalid API key")]
    Unauthorized,

    #[error("Request validation failed")]
    Validation(Vec<FieldViolation>),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    JsonBlock(#[from] JsonBlockError),

    #[error(transparent)]
    Generation(#[from] LlmError),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Document error: {0}")]
    Document(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "message": "Invalid API key" })),
            )
                .into_response(),
            AppError::Validation(violations) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({ "detail": violations })),
            )
                .into_response(),
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "detail": msg }))).into_response()
            }
            other => {
                tracing::error!("Request failed: {other:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "detail": other.to_string() })),
                )
                    .into_response()
            }
        }
    }
}
