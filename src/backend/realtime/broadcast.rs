/**
 * Real-time Event Broadcasting
 *
 * Every connected session owns an unbounded outbox. Publishing to a room
 * resolves the room's sessions from the `RoomRegistry` at publish time and
 * pushes one copy of the event into each outbox, in call order. A session's
 * writer task drains its outbox onto the socket, so per-session delivery
 * order equals publish order.
 *
 * A send into an outbox whose writer has gone away is not an error: the
 * session is disconnecting and will be cleaned up.
 */

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use tokio::sync::mpsc;

use super::registry::{RoomRegistry, SessionId};
use crate::shared::{ServerEvent, WorkspaceId};

pub type Outbox = mpsc::UnboundedSender<ServerEvent>;
pub type Inbox = mpsc::UnboundedReceiver<ServerEvent>;

#[derive(Debug, Default)]
pub struct BroadcastBus {
    outboxes: Mutex<HashMap<SessionId, Outbox>>,
}

impl BroadcastBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the session's outbox and return its receiving end
    pub fn register(&self, session: SessionId) -> Inbox {
        let (tx, rx) = mpsc::unbounded_channel();
        self.outboxes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(session, tx);
        rx
    }

    /// Drop the session's outbox; its writer sees the channel close
    pub fn unregister(&self, session: SessionId) -> bool {
        self.outboxes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&session)
            .is_some()
    }

    /// Deliver to a single session
    pub fn send_to(&self, session: SessionId, event: ServerEvent) -> bool {
        let outboxes = self.outboxes.lock().unwrap_or_else(PoisonError::into_inner);
        match outboxes.get(&session) {
            Some(outbox) => outbox.send(event).is_ok(),
            None => false,
        }
    }

    /// Deliver to every session joined to `workspace`, except `exclude`
    ///
    /// Returns the number of outboxes that accepted the event.
    pub fn publish(
        &self,
        registry: &RoomRegistry,
        workspace: &WorkspaceId,
        event: ServerEvent,
        exclude: Option<SessionId>,
    ) -> usize {
        self.deliver(workspace, registry.sessions_in(workspace), event, exclude)
    }

    /// Deliver to an already resolved set of `workspace` sessions
    pub fn deliver<I>(&self, workspace: &WorkspaceId, targets: I, event: ServerEvent, exclude: Option<SessionId>) -> usize
    where
        I: IntoIterator<Item = SessionId>,
    {
        let outboxes = self.outboxes.lock().unwrap_or_else(PoisonError::into_inner);

        let mut delivered = 0;
        for session in targets.into_iter().filter(|s| Some(*s) != exclude) {
            match outboxes.get(&session) {
                Some(outbox) if outbox.send(event.clone()).is_ok() => delivered += 1,
                _ => {
                    tracing::debug!(
                        "[Realtime] Skipping closed outbox for session {} in {}",
                        session,
                        workspace
                    );
                }
            }
        }

        tracing::debug!(
            "[Realtime] {} broadcast to {} sessions in {}",
            event.name(),
            delivered,
            workspace
        );
        delivered
    }

    pub fn outbox_count(&self) -> usize {
        self.outboxes.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}
