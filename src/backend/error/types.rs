/**
 * Backend Error Types
 *
 * One taxonomy for every failure the collaboration service reports, on
 * either surface. Each variant knows its HTTP status (REST) and its
 * `ErrorKind` (WebSocket `error` event).
 *
 * # Error Categories
 *
 * - `AuthError` - missing, malformed, expired or unverifiable credential
 * - `AuthorizationError` - caller is not a member of the workspace, or lacks
 *   the right to edit/delete a specific message
 * - `NotFoundError` - message (or reply/thread target) does not exist, or has
 *   been deleted where that matters
 * - `PersistError` - the ledger rejected or failed a write; never retried
 * - `UnavailableError` - the membership oracle could not answer
 * - `SharedError` - malformed or invalid payload
 */

use thiserror::Error;
use axum::http::StatusCode;
use crate::shared::event::{ErrorKind, ServerEvent};
use crate::shared::SharedError;

/// Backend-specific error types
///
/// # Usage
///
/// ```rust
/// use nextgen_collab::backend::error::BackendError;
/// use axum::http::StatusCode;
///
/// let err = BackendError::forbidden("not a member of workspace w1");
/// assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
/// ```
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("Authentication failed: {message}")]
    AuthError {
        message: String,
    },

    #[error("Access denied: {message}")]
    AuthorizationError {
        message: String,
    },

    #[error("Not found: {message}")]
    NotFoundError {
        message: String,
    },

    /// The ledger failed a write. Clients see a generic message; the
    /// underlying cause is logged where it happens.
    #[error("Persistence failed: {message}")]
    PersistError {
        message: String,
    },

    #[error("Service unavailable: {message}")]
    UnavailableError {
        message: String,
    },

    #[error(transparent)]
    SharedError(#[from] SharedError),
}

impl BackendError {
    pub fn auth(message: impl Into<String>) -> Self {
        Self::AuthError {
            message: message.into(),
        }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::AuthorizationError {
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFoundError {
            message: message.into(),
        }
    }

    pub fn persist(message: impl Into<String>) -> Self {
        Self::PersistError {
            message: message.into(),
        }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::UnavailableError {
            message: message.into(),
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::AuthError { .. } => StatusCode::UNAUTHORIZED,
            Self::AuthorizationError { .. } => StatusCode::FORBIDDEN,
            Self::NotFoundError { .. } => StatusCode::NOT_FOUND,
            Self::PersistError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Self::UnavailableError { .. } => StatusCode::SERVICE_UNAVAILABLE,
            Self::SharedError(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Error category reported on the socket
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::AuthError { .. } => ErrorKind::Unauthenticated,
            Self::AuthorizationError { .. } => ErrorKind::Forbidden,
            Self::NotFoundError { .. } => ErrorKind::NotFound,
            Self::PersistError { .. } => ErrorKind::PersistFailed,
            Self::UnavailableError { .. } => ErrorKind::Unavailable,
            Self::SharedError(_) => ErrorKind::InvalidPayload,
        }
    }

    /// Get the error message
    pub fn message(&self) -> String {
        match self {
            Self::AuthError { message }
            | Self::AuthorizationError { message }
            | Self::NotFoundError { message }
            | Self::PersistError { message }
            | Self::UnavailableError { message } => message.clone(),
            Self::SharedError(err) => err.to_string(),
        }
    }

    /// `error` event addressed to the initiator of `action`
    pub fn to_event(&self, action: Option<&str>) -> ServerEvent {
        ServerEvent::error(action, self.kind(), self.message())
    }
}
