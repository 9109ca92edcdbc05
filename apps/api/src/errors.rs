use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::persistence::PersistenceError;
use crate::recommendation::RecommendError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid request body: {0}")]
    Body(#[from] JsonRejection),

    #[error(transparent)]
    Recommendation(#[from] RecommendError),

    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Body(rejection) => (
                rejection.status(),
                "INVALID_BODY",
                rejection.body_text(),
            ),
            AppError::Recommendation(e @ RecommendError::InputFormat { .. }) => {
                (StatusCode::BAD_REQUEST, "INPUT_FORMAT_ERROR", e.to_string())
            }
            AppError::Recommendation(e @ RecommendError::KnowledgeBaseMismatch { .. }) => {
                tracing::error!("Knowledge base mismatch: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "KNOWLEDGE_BASE_MISMATCH",
                    "The career model and career table are out of sync".to_string(),
                )
            }
            AppError::Recommendation(e @ RecommendError::ClassifierOutput { .. }) => {
                tracing::error!("Classifier error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "CLASSIFIER_ERROR",
                    "The career model returned an unexpected result".to_string(),
                )
            }
            AppError::Persistence(e) => {
                tracing::error!("Persistence error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "PERSISTENCE_ERROR",
                    "A storage error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "success": false,
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
