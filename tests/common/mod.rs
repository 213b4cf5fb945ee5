//! Common test utilities and helpers
//!
//! - Custom assertion macros
//! - Token helpers
//! - A coordinator harness over the in-memory adapters
//! - PostgreSQL fixtures, active when `DATABASE_URL` is set

#[macro_use]
pub mod assertions;
#[cfg(feature = "ssr")]
pub mod auth_helpers;
#[cfg(feature = "ssr")]
pub mod harness;
#[cfg(feature = "ssr")]
pub mod database;

#[cfg(feature = "ssr")]
pub use auth_helpers::*;
#[cfg(feature = "ssr")]
pub use harness::*;
