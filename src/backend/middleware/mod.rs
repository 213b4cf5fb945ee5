//! Middleware Module
//!
//! - **`auth`** - bearer-token authentication for the REST routes, and the
//!   `AuthUser` extractor handlers use to read the verified identity

pub mod auth;

pub use auth::{auth_middleware, bearer_token, AuthUser, AuthenticatedUser};
