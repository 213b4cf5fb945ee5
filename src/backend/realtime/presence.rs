//! Presence announcements derived from registry transitions.
//!
//! Announcements are made from inside `RoomRegistry::join_with` /
//! `leave_with`, against the room as the transition left it.

use std::sync::Arc;
use uuid::Uuid;

use super::broadcast::BroadcastBus;
use super::registry::{RoomView, SessionId};
use crate::shared::{Identity, ServerEvent, WorkspaceId};

pub struct PresenceTracker {
    bus: Arc<BroadcastBus>,
}

impl PresenceTracker {
    pub fn new(bus: Arc<BroadcastBus>) -> Self {
        Self { bus }
    }

    /// `user-online` to everyone in the room but the joining session
    pub fn announce_online(
        &self,
        workspace: &WorkspaceId,
        room: RoomView<'_>,
        identity: &Identity,
        joined: SessionId,
    ) -> usize {
        tracing::info!("[Presence] {} online in {}", identity.id, workspace);
        let event = ServerEvent::UserOnline {
            identity_id: identity.id,
            display_name: identity.display_name.clone(),
            workspace_id: workspace.clone(),
        };
        self.bus.deliver(workspace, room.sessions(), event, Some(joined))
    }

    /// `user-offline` to whoever is left in the room
    pub fn announce_offline(&self, workspace: &WorkspaceId, room: RoomView<'_>, identity_id: Uuid) -> usize {
        tracing::info!("[Presence] {} offline in {}", identity_id, workspace);
        let event = ServerEvent::UserOffline {
            identity_id,
            workspace_id: workspace.clone(),
        };
        self.bus.deliver(workspace, room.sessions(), event, None)
    }

    pub fn snapshot(&self, workspace: &WorkspaceId, room: RoomView<'_>) -> ServerEvent {
        ServerEvent::PresenceSnapshot {
            workspace_id: workspace.clone(),
            online: room.online_identities(),
        }
    }
}
