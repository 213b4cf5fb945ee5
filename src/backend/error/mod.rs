//! Backend Error Module
//!
//! - **`types`** - `BackendError` definition, status and event-kind mapping
//! - **`conversion`** - `IntoResponse` and adapter error conversions
//!
//! Handlers and coordinator operations return `Result<_, BackendError>`. On
//! the REST side the error renders as a JSON body; on the socket side it is
//! turned into an `error` event addressed only to the initiating session.

/// Error type definitions
pub mod types;

/// Error conversion implementations
pub mod conversion;

// Re-export commonly used types
pub use types::BackendError;
