//! Authentication test helpers
//!
//! Token minting with the secret the test harness verifies against.

use nextgen_collab::backend::auth::create_token;
use nextgen_collab::shared::Identity;

pub const TEST_SECRET: &str = "integration-test-secret";

/// Generate a token for `identity`, valid for one hour
pub fn token_for(identity: &Identity) -> String {
    create_token(TEST_SECRET, identity, chrono::Duration::hours(1))
        .expect("Failed to generate test token")
}

/// Create authorization header value
pub fn auth_header(token: &str) -> String {
    format!("Bearer {}", token)
}
