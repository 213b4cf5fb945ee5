//! Per-room ordering
//!
//! A room's sequencer is held from the ledger write until the resulting
//! event has been pushed into every outbox, so two concurrent mutations in
//! the same room reach every client in the order they were persisted.
//! Different rooms never wait on each other.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use crate::shared::WorkspaceId;

#[derive(Debug, Default)]
pub struct RoomSequencers {
    locks: Mutex<HashMap<WorkspaceId, Arc<AsyncMutex<()>>>>,
}

/// Exclusive turn in one room. Dropping it releases the room and forgets
/// the room's lock once nobody else holds or awaits it.
#[derive(Debug)]
pub struct RoomTurn<'a> {
    guard: Option<OwnedMutexGuard<()>>,
    workspace: WorkspaceId,
    owner: &'a RoomSequencers,
}

impl RoomSequencers {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, workspace: &WorkspaceId) -> RoomTurn<'_> {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(locks.entry(workspace.clone()).or_default())
        };
        RoomTurn {
            guard: Some(lock.lock_owned().await),
            workspace: workspace.clone(),
            owner: self,
        }
    }

    /// Rooms with a live lock
    pub fn len(&self) -> usize {
        self.locks.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn release(&self, workspace: &WorkspaceId) {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        // Waiters hold a clone, so a count of one means the map is the only owner
        if locks.get(workspace).is_some_and(|lock| Arc::strong_count(lock) == 1) {
            locks.remove(workspace);
        }
    }
}

impl Drop for RoomTurn<'_> {
    fn drop(&mut self) {
        drop(self.guard.take());
        self.owner.release(&self.workspace);
    }
}
