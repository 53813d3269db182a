//! Error types for the core crate
//!
//! This module provides a consolidated error type for the core crate,
//! covering validation, lookup, lifecycle and storage failures.

use thiserror::Error;

use crate::models::IncidentStatus;
use crate::schema::ValidationErrors;

/// Core error type
#[derive(Error, Debug)]
pub enum CoreError {
    /// Submitted data failed schema validation
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationErrors),

    /// Requested record does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Status change that would move an incident backwards
    #[error("Invalid status transition from {from} to {to}")]
    InvalidStatusTransition {
        /// Current status
        from: IncidentStatus,
        /// Requested status
        to: IncidentStatus,
    },

    /// Username already taken
    #[error("Username already exists: {0}")]
    DuplicateUsername(String),

    /// Unexpected failure inside the store
    #[error("Storage error: {0}")]
    Storage(String),
}

impl CoreError {
    /// Whether the error was caused by the caller rather than the service
    pub fn is_client_fault(&self) -> bool {
        matches!(
            self,
            CoreError::Validation(_)
                | CoreError::NotFound(_)
                | CoreError::InvalidStatusTransition { .. }
                | CoreError::DuplicateUsername(_)
        )
    }
}

/// Result type for the core crate
pub type Result<T> = std::result::Result<T, CoreError>;

/// Convert any displayable error to a StorageError
pub fn to_storage_error<E: std::fmt::Display>(err: E) -> CoreError {
    CoreError::Storage(err.to_string())
}
