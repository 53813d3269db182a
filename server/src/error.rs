//! Error types for the API server
//!
//! [`ServerError`] covers startup failures. [`ApiError`] is what a request
//! handler returns; it renders the JSON error bodies of the HTTP contract.

use std::io;
use std::net::AddrParseError;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use hazard_report_core::models::IncidentStatus;
use hazard_report_core::schema::{FieldViolation, ROOT_FIELD};
use hazard_report_core::{CoreError, ViolationCode};
use serde_json::json;
use thiserror::Error;

/// Result type for server startup
pub type Result<T> = std::result::Result<T, ServerError>;

/// Startup error
#[derive(Debug, Error)]
pub enum ServerError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Address parsing error
    #[error("Address parsing error: {0}")]
    AddrParse(#[from] AddrParseError),
}

/// Error returned by a request handler
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request body or headers failed validation
    #[error("Invalid data")]
    InvalidData(Vec<FieldViolation>),

    /// The request body exceeded the configured limit
    #[error("Payload too large")]
    PayloadTooLarge,

    /// No incident with the requested id
    #[error("Incident not found")]
    NotFound,

    /// The status change would move the incident backwards
    #[error("Invalid status transition")]
    InvalidTransition {
        /// Current status
        from: IncidentStatus,
        /// Requested status
        to: IncidentStatus,
    },

    /// The request conflicts with existing data
    #[error("{0}")]
    Conflict(String),

    /// Server fault; the message is generic and safe to show
    #[error("{0}")]
    Internal(&'static str),
}

impl ApiError {
    /// Translate a core error.
    ///
    /// `failure` is the generic message used for server faults; details of
    /// those were already logged by the submission service.
    pub fn from_core(err: CoreError, failure: &'static str) -> Self {
        match err {
            CoreError::Validation(errors) => ApiError::InvalidData(errors.violations().to_vec()),
            CoreError::NotFound(_) => ApiError::NotFound,
            CoreError::InvalidStatusTransition { from, to } => ApiError::InvalidTransition { from, to },
            CoreError::DuplicateUsername(name) => {
                ApiError::Conflict(format!("Username already exists: {}", name))
            }
            CoreError::Storage(_) => ApiError::Internal(failure),
        }
    }

    /// A single violation on the request body as a whole
    pub fn malformed_body(message: impl Into<String>) -> Self {
        ApiError::InvalidData(vec![FieldViolation::new(
            ROOT_FIELD,
            ViolationCode::InvalidType,
            message,
        )])
    }

    /// HTTP status for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidData(_) => StatusCode::BAD_REQUEST,
            ApiError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::InvalidTransition { .. } | ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match &self {
            ApiError::InvalidData(details) => json!({
                "error": self.to_string(),
                "details": details,
            }),
            ApiError::InvalidTransition { from, to } => json!({
                "error": self.to_string(),
                "from": from,
                "to": to,
            }),
            _ => json!({ "error": self.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}
