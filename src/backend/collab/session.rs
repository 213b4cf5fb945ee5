//! Connection Session
//!
//! One per live WebSocket. The identity is fixed at handshake time; the
//! set of joined rooms changes as the client joins and leaves. Room-set
//! changes run the matching registry update under the session's own lock,
//! so the session's view and the registry never disagree, and a session
//! that has been closed can never be re-added to a room.

use std::collections::BTreeSet;
use std::sync::{Mutex, MutexGuard, PoisonError};
use uuid::Uuid;

use crate::backend::realtime::{JoinTransition, LeaveTransition, SessionId};
use crate::shared::{Identity, WorkspaceId};

#[derive(Debug, Default)]
struct RoomState {
    joined: BTreeSet<WorkspaceId>,
    closed: bool,
}

#[derive(Debug)]
pub struct ConnectionSession {
    id: SessionId,
    identity: Identity,
    rooms: Mutex<RoomState>,
}

impl ConnectionSession {
    pub fn new(identity: Identity) -> Self {
        Self {
            id: Uuid::new_v4(),
            identity,
            rooms: Mutex::new(RoomState::default()),
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn is_joined(&self, workspace: &WorkspaceId) -> bool {
        self.lock_rooms().joined.contains(workspace)
    }

    pub fn joined_rooms(&self) -> Vec<WorkspaceId> {
        self.lock_rooms().joined.iter().cloned().collect()
    }

    pub fn is_closed(&self) -> bool {
        self.lock_rooms().closed
    }

    /// Record the room and run `register` against the registry.
    /// `None` once the session has been closed.
    pub(crate) fn enter_room<F>(&self, workspace: &WorkspaceId, register: F) -> Option<JoinTransition>
    where
        F: FnOnce() -> JoinTransition,
    {
        let mut rooms = self.lock_rooms();
        if rooms.closed {
            return None;
        }
        rooms.joined.insert(workspace.clone());
        Some(register())
    }

    /// `None` when the session was not in the room
    pub(crate) fn exit_room<F>(&self, workspace: &WorkspaceId, unregister: F) -> Option<LeaveTransition>
    where
        F: FnOnce() -> Option<LeaveTransition>,
    {
        let mut rooms = self.lock_rooms();
        if !rooms.joined.remove(workspace) {
            return None;
        }
        unregister()
    }

    /// Close the session and leave every room. Idempotent.
    pub(crate) fn close<F>(&self, mut unregister: F) -> Vec<(WorkspaceId, Option<LeaveTransition>)>
    where
        F: FnMut(&WorkspaceId) -> Option<LeaveTransition>,
    {
        let mut rooms = self.lock_rooms();
        rooms.closed = true;
        let joined = std::mem::take(&mut rooms.joined);
        joined
            .into_iter()
            .map(|workspace| {
                let transition = unregister(&workspace);
                (workspace, transition)
            })
            .collect()
    }

    fn lock_rooms(&self) -> MutexGuard<'_, RoomState> {
        self.rooms.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
