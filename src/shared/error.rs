//! Shared Error Types
//!
//! Errors raised while decoding or validating wire payloads. They are
//! produced on the boundary before any collaboration state is touched, so
//! every variant maps to the `invalid-payload` error kind on the socket.
//!
//! # Usage
//!
//! ```rust
//! use nextgen_collab::shared::error::SharedError;
//!
//! let error = SharedError::validation("content", "Message content cannot be empty");
//! assert!(error.to_string().contains("content"));
//! ```
use thiserror::Error;

/// Payload errors shared by the socket and REST surfaces
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SharedError {
    /// The frame was not valid JSON or did not match any known event
    #[error("Malformed payload: {message}")]
    MalformedPayload {
        /// Human-readable error message
        message: String,
    },

    /// A field was present but its value was rejected
    #[error("Validation error in field '{field}': {message}")]
    ValidationError {
        /// The field that failed validation
        field: String,
        /// Human-readable error message
        message: String,
    },
}

impl SharedError {
    /// Create a new malformed payload error
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedPayload {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ValidationError {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Name of the offending field, if the error is field-specific
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::ValidationError { field, .. } => Some(field),
            Self::MalformedPayload { .. } => None,
        }
    }
}

impl From<serde_json::Error> for SharedError {
    fn from(err: serde_json::Error) -> Self {
        Self::malformed(err.to_string())
    }
}
