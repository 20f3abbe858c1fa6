//! Error handling for the NovaFarm dashboard server
//!
//! Provides consistent JSON error responses

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use shared::{InputError, PipelineError};
use thiserror::Error;
use uuid::Uuid;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Validation errors
    #[error("Validation error: {message}")]
    Validation { field: String, message: String },

    #[error("Dashboard session not found: {0}")]
    SessionNotFound(Uuid),

    #[error("No recommendation available yet")]
    RecommendationUnavailable,

    // Provider failures surfaced through the pipeline
    #[error("Pipeline error: {0}")]
    Pipeline(PipelineError),
}

impl From<InputError> for AppError {
    fn from(err: InputError) -> Self {
        AppError::Validation {
            field: err.field,
            message: err.message,
        }
    }
}

impl From<PipelineError> for AppError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::InvalidUserInput { field, message } => {
                AppError::Validation { field, message }
            }
            other => AppError::Pipeline(other),
        }
    }
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_detail) = match &self {
            AppError::Validation { field, message } => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    code: "VALIDATION_ERROR".to_string(),
                    message: message.clone(),
                    field: Some(field.clone()),
                },
            ),
            AppError::SessionNotFound(id) => (
                StatusCode::NOT_FOUND,
                ErrorDetail {
                    code: "SESSION_NOT_FOUND".to_string(),
                    message: format!("Dashboard session {} not found", id),
                    field: None,
                },
            ),
            AppError::RecommendationUnavailable => (
                StatusCode::CONFLICT,
                ErrorDetail {
                    code: "RECOMMENDATION_UNAVAILABLE".to_string(),
                    message: "No recommendation has been produced for this session yet"
                        .to_string(),
                    field: None,
                },
            ),
            AppError::Pipeline(err) => (
                StatusCode::BAD_GATEWAY,
                ErrorDetail {
                    code: "PIPELINE_ERROR".to_string(),
                    message: err.to_string(),
                    field: None,
                },
            ),
        };

        // Log the error for debugging
        if status.is_server_error() {
            tracing::error!("Error: {:?}", self);
        } else {
            tracing::debug!("Request rejected: {}", self);
        }

        (status, Json(ErrorResponse { error: error_detail })).into_response()
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;
