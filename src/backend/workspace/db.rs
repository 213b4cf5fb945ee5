//! Database-backed membership oracle
//!
//! Reads the `workspace_members` table maintained by the workspace service.

use async_trait::async_trait;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use super::membership::{MembershipError, MembershipOracle, WorkspaceRole};
use crate::shared::WorkspaceId;

#[derive(Clone)]
pub struct PgMembership {
    pool: PgPool,
}

impl PgMembership {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert or update a membership row (used to apply config seeds)
    pub async fn grant(
        &self,
        workspace: &WorkspaceId,
        identity: Uuid,
        role: WorkspaceRole,
    ) -> Result<(), MembershipError> {
        sqlx::query(
            r#"
            INSERT INTO workspace_members (workspace_id, user_id, role)
            VALUES ($1, $2, $3)
            ON CONFLICT (workspace_id, user_id) DO UPDATE SET role = EXCLUDED.role
            "#,
        )
        .bind(workspace.as_str())
        .bind(identity)
        .bind(role.as_str())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl MembershipOracle for PgMembership {
    async fn role_of(
        &self,
        identity: Uuid,
        workspace: &WorkspaceId,
    ) -> Result<Option<WorkspaceRole>, MembershipError> {
        let row = sqlx::query(
            r#"
            SELECT role
            FROM workspace_members
            WHERE workspace_id = $1 AND user_id = $2
            "#,
        )
        .bind(workspace.as_str())
        .bind(identity)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let role: String = row.try_get("role")?;
        match WorkspaceRole::parse(&role) {
            Some(role) => Ok(Some(role)),
            None => Err(MembershipError::Backend(format!("unknown role '{role}'"))),
        }
    }

    async fn workspaces_of(&self, identity: Uuid) -> Result<Vec<WorkspaceId>, MembershipError> {
        let rows = sqlx::query(
            r#"
            SELECT workspace_id
            FROM workspace_members
            WHERE user_id = $1
            ORDER BY workspace_id
            "#,
        )
        .bind(identity)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                row.try_get::<String, _>("workspace_id")
                    .map(WorkspaceId::from)
                    .map_err(MembershipError::from)
            })
            .collect()
    }
}
