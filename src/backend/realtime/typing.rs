/**
 * Typing Tracker
 *
 * Tracks which sessions are typing in which rooms, each with a deadline.
 * A `typing-start` sets or refreshes the deadline; the sweeper expires
 * entries whose deadline passed so a client that vanished mid-sentence does
 * not leave a stale indicator behind.
 */

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};
use uuid::Uuid;

use super::registry::SessionId;
use crate::shared::WorkspaceId;

#[derive(Debug, Clone, Copy)]
struct TypingEntry {
    identity_id: Uuid,
    deadline: Instant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpiredTyping {
    pub workspace_id: WorkspaceId,
    pub session_id: SessionId,
    pub identity_id: Uuid,
}

#[derive(Debug)]
pub struct TypingTracker {
    timeout: Duration,
    entries: Mutex<HashMap<(WorkspaceId, SessionId), TypingEntry>>,
}

impl TypingTracker {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Returns `true` when the session was not already typing in the room
    pub fn start(&self, workspace: &WorkspaceId, session: SessionId, identity_id: Uuid, now: Instant) -> bool {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let entry = TypingEntry {
            identity_id,
            deadline: now + self.timeout,
        };
        entries.insert((workspace.clone(), session), entry).is_none()
    }

    /// Clears the entry and returns the identity that was typing
    pub fn stop(&self, workspace: &WorkspaceId, session: SessionId) -> Option<Uuid> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries
            .remove(&(workspace.clone(), session))
            .map(|entry| entry.identity_id)
    }

    /// Remove and return every entry whose deadline is at or before `now`
    pub fn expire(&self, now: Instant) -> Vec<ExpiredTyping> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let expired: Vec<(WorkspaceId, SessionId)> = entries
            .iter()
            .filter(|(_, entry)| entry.deadline <= now)
            .map(|(key, _)| key.clone())
            .collect();

        expired
            .into_iter()
            .filter_map(|key| {
                entries.remove(&key).map(|entry| ExpiredTyping {
                    workspace_id: key.0,
                    session_id: key.1,
                    identity_id: entry.identity_id,
                })
            })
            .collect()
    }

    pub fn is_typing(&self, workspace: &WorkspaceId, session: SessionId) -> bool {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.contains_key(&(workspace.clone(), session))
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
