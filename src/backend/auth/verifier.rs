//! Identity verification for incoming connections and API calls.

use async_trait::async_trait;
use uuid::Uuid;

use crate::backend::auth::sessions::verify_token;
use crate::backend::error::BackendError;
use crate::shared::Identity;

/// Turns a handshake credential into a verified identity
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    async fn verify(&self, credential: &str) -> Result<Identity, BackendError>;
}

/// Verifies HS256 session tokens signed with a shared secret
pub struct JwtIdentityVerifier {
    secret: String,
}

impl JwtIdentityVerifier {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }
}

#[async_trait]
impl IdentityVerifier for JwtIdentityVerifier {
    async fn verify(&self, credential: &str) -> Result<Identity, BackendError> {
        let claims = verify_token(&self.secret, credential).map_err(|e| {
            tracing::warn!("[Auth] Invalid token: {}", e);
            BackendError::auth("invalid or expired token")
        })?;

        let id = Uuid::parse_str(&claims.sub).map_err(|e| {
            tracing::warn!("[Auth] Invalid identity id in token: {}", e);
            BackendError::auth("token subject is not a valid identity")
        })?;

        // Older tokens carry only an email
        let display_name = claims
            .name
            .filter(|name| !name.trim().is_empty())
            .or(claims.email)
            .unwrap_or_else(|| id.to_string());

        Ok(Identity::new(id, display_name))
    }
}
