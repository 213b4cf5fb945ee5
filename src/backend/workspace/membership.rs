/**
 * Workspace Membership
 *
 * The collaboration layer never owns membership data. It asks a
 * `MembershipOracle` on every join and every mutating action, without
 * caching, so a revoked member loses access on their next attempt.
 */

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::shared::WorkspaceId;

/// Role of an identity inside a workspace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkspaceRole {
    Owner,
    Admin,
    Member,
}

impl WorkspaceRole {
    /// Owners and admins may delete other members' messages
    pub fn can_moderate(&self) -> bool {
        matches!(self, Self::Owner | Self::Admin)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Owner => "owner",
            Self::Admin => "admin",
            Self::Member => "member",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "owner" => Some(Self::Owner),
            "admin" => Some(Self::Admin),
            "member" => Some(Self::Member),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum MembershipError {
    #[error("membership backend error: {0}")]
    Backend(String),
}

impl From<sqlx::Error> for MembershipError {
    fn from(err: sqlx::Error) -> Self {
        Self::Backend(err.to_string())
    }
}

/// External source of truth for workspace membership
#[async_trait]
pub trait MembershipOracle: Send + Sync {
    /// Role of `identity` in `workspace`, `None` when not a member
    async fn role_of(
        &self,
        identity: Uuid,
        workspace: &WorkspaceId,
    ) -> Result<Option<WorkspaceRole>, MembershipError>;

    /// Every workspace `identity` belongs to
    async fn workspaces_of(&self, identity: Uuid) -> Result<Vec<WorkspaceId>, MembershipError>;
}
