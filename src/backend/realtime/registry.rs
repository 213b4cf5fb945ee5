/**
 * Room Registry
 *
 * Maps each workspace room to the sessions currently joined to it, and
 * each session to the identity it belongs to. It is the single source for
 * fan-out targets and for presence transitions:
 *
 * - an identity comes online in a room when its first session joins
 * - it goes offline when its last session leaves
 *
 * Every operation takes the lock once and releases it before returning, so
 * a transition and the membership change that caused it are observed
 * together by concurrent callers. `join_with` and `leave_with` also run a
 * callback before the lock is released; presence announcements are queued
 * there, so two sessions of one identity racing in and out of a room can
 * never leave peers with the opposite of the registry's view.
 */

use std::collections::{BTreeSet, HashMap};
use std::sync::{PoisonError, RwLock};
use uuid::Uuid;

use crate::shared::WorkspaceId;

/// Per-connection identifier
pub type SessionId = Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JoinTransition {
    /// The session was not in the room before
    pub newly_joined: bool,
    /// No other session of the same identity was in the room
    pub came_online: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeaveTransition {
    /// The departing session was the identity's last one in the room
    pub went_offline: bool,
}

/// A room's members as seen from inside a registry update
#[derive(Debug, Clone, Copy)]
pub struct RoomView<'a> {
    members: &'a HashMap<SessionId, Uuid>,
}

impl<'a> RoomView<'a> {
    pub fn sessions(&self) -> impl Iterator<Item = SessionId> + 'a {
        self.members.keys().copied()
    }

    pub fn online_identities(&self) -> Vec<Uuid> {
        online(self.members)
    }
}

#[derive(Debug, Default)]
pub struct RoomRegistry {
    rooms: RwLock<HashMap<WorkspaceId, HashMap<SessionId, Uuid>>>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn join(&self, workspace: &WorkspaceId, session: SessionId, identity: Uuid) -> JoinTransition {
        self.join_with(workspace, session, identity, |_, _| {})
    }

    /// Join, then run `on_join` with the room as it now stands while the
    /// registry is still locked
    pub fn join_with<F>(
        &self,
        workspace: &WorkspaceId,
        session: SessionId,
        identity: Uuid,
        on_join: F,
    ) -> JoinTransition
    where
        F: FnOnce(JoinTransition, RoomView<'_>),
    {
        let mut rooms = self.rooms.write().unwrap_or_else(PoisonError::into_inner);
        let room = rooms.entry(workspace.clone()).or_default();
        let transition = if room.contains_key(&session) {
            JoinTransition {
                newly_joined: false,
                came_online: false,
            }
        } else {
            let came_online = !room.values().any(|id| *id == identity);
            room.insert(session, identity);
            JoinTransition {
                newly_joined: true,
                came_online,
            }
        };
        on_join(transition, RoomView { members: room });
        transition
    }

    /// `None` when the session was not in the room
    pub fn leave(&self, workspace: &WorkspaceId, session: SessionId) -> Option<LeaveTransition> {
        self.leave_with(workspace, session, |_, _| {})
    }

    /// Leave, then run `on_leave` with the remaining members while the
    /// registry is still locked. `on_leave` is not called when the session
    /// was not in the room.
    pub fn leave_with<F>(&self, workspace: &WorkspaceId, session: SessionId, on_leave: F) -> Option<LeaveTransition>
    where
        F: FnOnce(LeaveTransition, RoomView<'_>),
    {
        let mut rooms = self.rooms.write().unwrap_or_else(PoisonError::into_inner);
        let room = rooms.get_mut(workspace)?;
        let identity = room.remove(&session)?;
        let transition = LeaveTransition {
            went_offline: !room.values().any(|id| *id == identity),
        };
        on_leave(transition, RoomView { members: room });
        if room.is_empty() {
            rooms.remove(workspace);
        }
        Some(transition)
    }

    /// Sessions currently joined to the room, the fan-out target set
    pub fn sessions_in(&self, workspace: &WorkspaceId) -> Vec<SessionId> {
        let rooms = self.rooms.read().unwrap_or_else(PoisonError::into_inner);
        rooms
            .get(workspace)
            .map(|room| room.keys().copied().collect())
            .unwrap_or_default()
    }

    pub fn contains(&self, workspace: &WorkspaceId, session: SessionId) -> bool {
        let rooms = self.rooms.read().unwrap_or_else(PoisonError::into_inner);
        rooms
            .get(workspace)
            .is_some_and(|room| room.contains_key(&session))
    }

    /// Distinct identities with at least one session in the room, sorted
    pub fn online_identities(&self, workspace: &WorkspaceId) -> Vec<Uuid> {
        let rooms = self.rooms.read().unwrap_or_else(PoisonError::into_inner);
        rooms
            .get(workspace)
            .map(online)
            .unwrap_or_default()
    }

    pub fn is_online(&self, workspace: &WorkspaceId, identity: Uuid) -> bool {
        let rooms = self.rooms.read().unwrap_or_else(PoisonError::into_inner);
        rooms
            .get(workspace)
            .is_some_and(|room| room.values().any(|id| *id == identity))
    }

    pub fn room_size(&self, workspace: &WorkspaceId) -> usize {
        let rooms = self.rooms.read().unwrap_or_else(PoisonError::into_inner);
        rooms.get(workspace).map_or(0, HashMap::len)
    }

    /// Number of non-empty rooms
    pub fn room_count(&self) -> usize {
        self.rooms.read().unwrap_or_else(PoisonError::into_inner).len()
    }
}

fn online(room: &HashMap<SessionId, Uuid>) -> Vec<Uuid> {
    room.values().copied().collect::<BTreeSet<_>>().into_iter().collect()
}
