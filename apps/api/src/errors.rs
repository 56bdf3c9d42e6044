use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::analysis::templates::PromptError;
use crate::llm_client::{ErrorKind, LlmError};

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Unprocessable entity: {0}")]
    UnprocessableEntity(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Prompt error: {0}")]
    Prompt(#[from] PromptError),

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::PayloadTooLarge(msg) => {
                (StatusCode::PAYLOAD_TOO_LARGE, "PAYLOAD_TOO_LARGE", msg.clone())
            }
            AppError::UnprocessableEntity(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "UNPROCESSABLE_ENTITY",
                msg.clone(),
            ),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone()),
            AppError::Prompt(e) => {
                tracing::error!("Prompt error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "PROMPT_ERROR",
                    format!("Error: {e}"),
                )
            }
            AppError::Llm(e) => {
                let status = match e.kind {
                    ErrorKind::MissingCredential => StatusCode::SERVICE_UNAVAILABLE,
                    ErrorKind::UnsupportedModel | ErrorKind::InvalidParameters => {
                        StatusCode::BAD_REQUEST
                    }
                    ErrorKind::ProviderCall | ErrorKind::EmptyResponse => StatusCode::BAD_GATEWAY,
                };
                (status, e.kind.code(), e.display_text())
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
