//! Error handling module
//!
//! Provides the governance error taxonomy shared by every component of the
//! pipeline, plus the HTTP mapping used by the REST surface.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Governance-wide error type
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GovernanceError {
    /// Bad phase transition or malformed input. Recovered locally.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Forbidden agent action, communication or suggestion. Always logged.
    #[error("Policy violation: {0}")]
    PolicyViolation(String),

    /// Ledger corruption (version collision, checksum mismatch). Fatal.
    #[error("Integrity error: {0}")]
    Integrity(String),

    /// Unknown agent or partition id.
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl GovernanceError {
    /// Integrity errors are the only category that must abort the caller.
    pub fn is_fatal(&self) -> bool {
        matches!(self, GovernanceError::Integrity(_))
    }
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl IntoResponse for GovernanceError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match &self {
            GovernanceError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
            }
            GovernanceError::PolicyViolation(msg) => {
                (StatusCode::FORBIDDEN, "POLICY_VIOLATION", msg.clone())
            }
            GovernanceError::Integrity(msg) => {
                error!("Ledger integrity failure: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTEGRITY_ERROR",
                    "The version ledger failed an integrity check".to_string(),
                )
            }
            GovernanceError::Configuration(msg) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "CONFIG_ERROR", msg.clone())
            }
            GovernanceError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            GovernanceError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
            GovernanceError::Unauthorized(msg) => {
                (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone())
            }
            GovernanceError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone()),
            GovernanceError::Internal(msg) => {
                error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse {
            success: false,
            message,
            code: Some(error_code.to_string()),
        });

        (status, body).into_response()
    }
}

/// Result type alias used throughout the engine
pub type GovernanceResult<T> = Result<T, GovernanceError>;

/// Helper function to create a validation error
pub fn validation_error(msg: impl Into<String>) -> GovernanceError {
    GovernanceError::Validation(msg.into())
}

/// Helper function to create a not found error
pub fn not_found_error(msg: impl Into<String>) -> GovernanceError {
    GovernanceError::NotFound(msg.into())
}

/// Helper function to create a conflict error
pub fn conflict_error(msg: impl Into<String>) -> GovernanceError {
    GovernanceError::Conflict(msg.into())
}

impl From<validator::ValidationErrors> for GovernanceError {
    fn from(errors: validator::ValidationErrors) -> Self {
        GovernanceError::Validation(errors.to_string())
    }
}
