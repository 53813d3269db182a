//! Error type for client operations

use hazard_report_core::FieldViolation;
use thiserror::Error;

/// Error type for client operations
#[derive(Error, Debug)]
pub enum ClientError {
    /// The request never got a response
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The server refused the submission; resending it will not help
    #[error("Submission rejected: {} invalid field(s)", .0.len())]
    Rejected(Vec<FieldViolation>),

    /// The requested incident does not exist
    #[error("Incident not found")]
    NotFound,

    /// The request conflicts with the incident's current state
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Any other unsuccessful response
    #[error("Server error ({status}): {message}")]
    Server {
        /// HTTP status code
        status: u16,
        /// Error message from the response body
        message: String,
    },

    /// The photo exceeds the upload limit
    #[error("Image too large: {size} bytes (limit {max})")]
    ImageTooLarge {
        /// Size of the rejected image
        size: usize,
        /// Upload limit
        max: usize,
    },

    /// Offline queue file could not be read or written
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ClientError {
    /// Whether sending the same request again might succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            ClientError::Network(_) => true,
            ClientError::Server { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

/// Result type for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        let server_fault = ClientError::Server {
            status: 503,
            message: "unavailable".into(),
        };
        assert!(server_fault.is_retryable());

        let client_fault = ClientError::Server {
            status: 405,
            message: "method not allowed".into(),
        };
        assert!(!client_fault.is_retryable());

        assert!(!ClientError::Rejected(vec![]).is_retryable());
        assert!(!ClientError::NotFound.is_retryable());
        assert!(!ClientError::ImageTooLarge { size: 2, max: 1 }.is_retryable());
    }
}
