use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use thiserror::Error;
use validator::ValidationErrors;

use crate::state::state_machine::InvalidTransition;

/// Errors that can occur in service layer operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Session, player, or game definition missing where one was expected.
    #[error("not found: {0}")]
    NotFound(String),
    /// Invalid input provided by the client.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Lifecycle command issued from a status that does not permit it.
    #[error("invalid state: {0}")]
    InvalidState(String),
    /// Stale or duplicate submission for an already-answered question.
    #[error("conflict: {0}")]
    Conflict(String),
    /// Write attempted by a kicked player.
    #[error("forbidden: {0}")]
    Forbidden(String),
}

impl From<InvalidTransition> for ServiceError {
    fn from(err: InvalidTransition) -> Self {
        ServiceError::InvalidState(err.to_string())
    }
}

impl From<ValidationErrors> for AppError {
    fn from(err: ValidationErrors) -> Self {
        AppError::BadRequest(format!("validation failed: {}", err))
    }
}

/// Application-level errors that are converted to HTTP responses.
#[derive(Debug, Error)]
pub enum AppError {
    /// Bad request with invalid input.
    #[error("bad request: {0}")]
    BadRequest(String),
    /// Write rejected by the moderation rules.
    #[error("forbidden: {0}")]
    Forbidden(String),
    /// Requested resource not found.
    #[error("not found: {0}")]
    NotFound(String),
    /// Conflict with current state.
    #[error("conflict: {0}")]
    Conflict(String),
    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::NotFound(message) => AppError::NotFound(message),
            ServiceError::InvalidInput(message) => AppError::BadRequest(message),
            ServiceError::InvalidState(message) => AppError::Conflict(message),
            ServiceError::Conflict(message) => AppError::Conflict(message),
            ServiceError::Forbidden(message) => AppError::Forbidden(message),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let payload = Json(ErrorBody {
            message: self.to_string(),
        });

        (status, payload).into_response()
    }
}
