//! In-process membership table, seeded from config or by tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use uuid::Uuid;

use super::membership::{MembershipError, MembershipOracle, WorkspaceRole};
use crate::shared::WorkspaceId;

#[derive(Debug, Default)]
pub struct InMemoryMembership {
    workspaces: RwLock<HashMap<WorkspaceId, HashMap<Uuid, WorkspaceRole>>>,
}

impl InMemoryMembership {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or change a member's role
    pub fn grant(&self, workspace: &WorkspaceId, identity: Uuid, role: WorkspaceRole) {
        let mut workspaces = self.workspaces.write().unwrap_or_else(PoisonError::into_inner);
        workspaces
            .entry(workspace.clone())
            .or_default()
            .insert(identity, role);
    }

    /// Remove a member; returns whether they were a member
    pub fn revoke(&self, workspace: &WorkspaceId, identity: Uuid) -> bool {
        let mut workspaces = self.workspaces.write().unwrap_or_else(PoisonError::into_inner);
        let Some(members) = workspaces.get_mut(workspace) else {
            return false;
        };
        let removed = members.remove(&identity).is_some();
        if members.is_empty() {
            workspaces.remove(workspace);
        }
        removed
    }
}

#[async_trait]
impl MembershipOracle for InMemoryMembership {
    async fn role_of(
        &self,
        identity: Uuid,
        workspace: &WorkspaceId,
    ) -> Result<Option<WorkspaceRole>, MembershipError> {
        let workspaces = self.workspaces.read().unwrap_or_else(PoisonError::into_inner);
        Ok(workspaces
            .get(workspace)
            .and_then(|members| members.get(&identity))
            .copied())
    }

    async fn workspaces_of(&self, identity: Uuid) -> Result<Vec<WorkspaceId>, MembershipError> {
        let workspaces = self.workspaces.read().unwrap_or_else(PoisonError::into_inner);
        let mut ids: Vec<WorkspaceId> = workspaces
            .iter()
            .filter(|(_, members)| members.contains_key(&identity))
            .map(|(id, _)| id.clone())
            .collect();
        ids.sort();
        Ok(ids)
    }
}
