//! Authentication Module
//!
//! - **`sessions`** - JWT claims, minting and verification
//! - **`verifier`** - `IdentityVerifier` seam used by the coordinator and the
//!   REST auth middleware, with the JWT-backed implementation
//!
//! Account management (signup, login, passwords) lives in the upstream
//! account service; this service only verifies the tokens it issues.

/// JWT token management
pub mod sessions;

/// Credential verification
pub mod verifier;

pub use sessions::{create_token, verify_token, Claims};
pub use verifier::{IdentityVerifier, JwtIdentityVerifier};
