/**
 * Collaboration Coordinator
 *
 * Orchestrates everything that happens in a workspace room:
 *
 * 1. **Gatekeeping** - verifies the handshake credential and opens a session
 * 2. **Rooms** - join/leave with membership checks, presence transitions
 * 3. **Messages** - send, edit, soft delete, each persisted then broadcast
 * 4. **Annotations** - reactions and read receipts via atomic ledger ops
 * 5. **Typing** - ephemeral indicators with expiry
 *
 * Socket commands arrive through `dispatch`, which returns the events
 * addressed to the caller alone (acknowledgements and errors). Room events
 * go out through the broadcast bus. REST handlers call the same operations
 * with `Origin::Api`, so both surfaces share one set of rules.
 *
 * # Ordering
 *
 * Each mutating operation holds its room's sequencer from the ledger write
 * until the event has been queued for every session in the room.
 *
 * Presence events, and the joiner's own `workspace-joined` and
 * `presence-snapshot`, are queued while the registry is still locked for
 * the join or leave that caused them. Peers therefore see presence in
 * registry order, and a joiner sees its acknowledgement before any room
 * event that could only reach it after joining.
 *
 * # Authorization
 *
 * The membership oracle is asked on every join and every mutation. If it
 * reports that a session's identity is no longer a member of a room the
 * session is in, the session is evicted from that room and told so with
 * `workspace-left`.
 */

use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

use super::session::ConnectionSession;
use crate::backend::auth::IdentityVerifier;
use crate::backend::error::BackendError;
use crate::backend::ledger::MessageLedger;
use crate::backend::realtime::{
    BroadcastBus, Inbox, LeaveTransition, PresenceTracker, RoomRegistry, RoomSequencers, RoomView,
    TypingTracker,
};
use crate::backend::workspace::{MembershipOracle, WorkspaceRole};
use crate::shared::event::{normalize_content, validate_emoji, validate_workspace_id};
use crate::shared::message::{MessageDraft, MessageQuery, ReadReceipt};
use crate::shared::{
    ClientCommand, CollabSettings, Identity, Message, SendMessagePayload, ServerEvent, WorkspaceId,
};

/// Collaborators injected into the coordinator
pub struct CollabDeps {
    pub verifier: Arc<dyn IdentityVerifier>,
    pub membership: Arc<dyn MembershipOracle>,
    pub ledger: Arc<dyn MessageLedger>,
    pub registry: Arc<RoomRegistry>,
}

/// Who is performing an operation
#[derive(Debug, Clone, Copy)]
pub enum Origin<'a> {
    /// A live WebSocket session
    Session(&'a ConnectionSession),
    /// An authenticated REST call
    Api(&'a Identity),
}

impl<'a> Origin<'a> {
    pub fn identity(&self) -> &'a Identity {
        match self {
            Origin::Session(session) => session.identity(),
            Origin::Api(identity) => identity,
        }
    }
}

/// A freshly opened session and the receiving end of its outbox
#[derive(Debug)]
pub struct OpenSession {
    pub session: Arc<ConnectionSession>,
    pub events: Inbox,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinOutcome {
    pub workspace_id: WorkspaceId,
    /// `false` when the session was already in the room
    pub newly_joined: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceStats {
    pub total_messages: u64,
    pub today_messages: u64,
    pub unread_count: u64,
}

pub struct Coordinator {
    verifier: Arc<dyn IdentityVerifier>,
    membership: Arc<dyn MembershipOracle>,
    ledger: Arc<dyn MessageLedger>,
    registry: Arc<RoomRegistry>,
    bus: Arc<BroadcastBus>,
    presence: PresenceTracker,
    typing: TypingTracker,
    sequencers: RoomSequencers,
    settings: CollabSettings,
}

impl Coordinator {
    pub fn new(deps: CollabDeps, settings: CollabSettings) -> Self {
        let bus = Arc::new(BroadcastBus::new());
        let presence = PresenceTracker::new(Arc::clone(&bus));
        Self {
            verifier: deps.verifier,
            membership: deps.membership,
            ledger: deps.ledger,
            registry: deps.registry,
            bus,
            presence,
            typing: TypingTracker::new(settings.typing_timeout()),
            sequencers: RoomSequencers::new(),
            settings,
        }
    }

    pub fn settings(&self) -> &CollabSettings {
        &self.settings
    }

    pub fn registry(&self) -> &Arc<RoomRegistry> {
        &self.registry
    }

    /// Number of sessions with a live outbox
    pub fn session_count(&self) -> usize {
        self.bus.outbox_count()
    }

    // ----- Gatekeeper -----

    pub async fn authenticate(&self, credential: Option<&str>) -> Result<Identity, BackendError> {
        let credential = credential
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .ok_or_else(|| BackendError::auth("missing credential"))?;
        self.verifier.verify(credential).await
    }

    /// Create a session bound to `identity` with an empty room set
    pub fn open_session(&self, identity: Identity) -> OpenSession {
        let session = Arc::new(ConnectionSession::new(identity));
        let events = self.bus.register(session.id());
        tracing::info!(
            "[Collab] Session {} opened for {} ({})",
            session.id(),
            session.identity().id,
            session.identity().display_name
        );
        OpenSession { session, events }
    }

    pub async fn connect(&self, credential: Option<&str>) -> Result<OpenSession, BackendError> {
        let identity = self.authenticate(credential).await?;
        Ok(self.open_session(identity))
    }

    /// Tear down a session: leave every room, clear typing, drop the outbox.
    /// Safe to call more than once.
    pub fn disconnect(&self, session: &ConnectionSession) {
        let departed = session.close(|workspace| {
            self.registry.leave_with(workspace, session.id(), |transition, room| {
                self.after_leave(session, workspace, transition, room);
            })
        });
        for (workspace, transition) in &departed {
            if transition.is_none() {
                self.typing.stop(workspace, session.id());
            }
        }
        self.bus.unregister(session.id());
        tracing::info!(
            "[Collab] Session {} closed for {} (left {} rooms)",
            session.id(),
            session.identity().id,
            departed.len()
        );
    }

    // ----- Socket protocol -----

    /// Decode and dispatch one text frame
    pub async fn handle_frame(&self, session: &ConnectionSession, frame: &str) -> Vec<ServerEvent> {
        match ClientCommand::parse(frame) {
            Ok(command) => self.dispatch(session, command).await,
            Err(err) => {
                tracing::warn!("[Collab] Rejected frame from session {}: {}", session.id(), err);
                vec![BackendError::from(err).to_event(None)]
            }
        }
    }

    /// Run a command and return the events addressed to the caller only
    pub async fn dispatch(&self, session: &ConnectionSession, command: ClientCommand) -> Vec<ServerEvent> {
        let action = command.name();
        if let Err(err) = command.validate(&self.settings) {
            return vec![BackendError::from(err).to_event(Some(action))];
        }

        let origin = Origin::Session(session);
        let result = match command {
            ClientCommand::JoinWorkspace { workspace_id } => self
                .admit(session, &workspace_id, true)
                .await
                .map(|_| Vec::new()),
            ClientCommand::JoinWorkspaces => self
                .join_known_workspaces(session)
                .await
                .map(|workspaces| vec![ServerEvent::WorkspacesJoined { workspaces }]),
            ClientCommand::LeaveWorkspace { workspace_id } => {
                self.leave_room(session, &workspace_id);
                Ok(vec![ServerEvent::WorkspaceLeft { workspace_id }])
            }
            ClientCommand::SendMessage(payload) => {
                self.send_message(origin, payload).await.map(|_| Vec::new())
            }
            ClientCommand::EditMessage { message_id, content } => self
                .edit_message(origin, message_id, &content)
                .await
                .map(|_| Vec::new()),
            ClientCommand::DeleteMessage { message_id } => {
                self.delete_message(origin, message_id).await.map(|_| Vec::new())
            }
            ClientCommand::TypingStart { workspace_id } => {
                self.typing_start(session, &workspace_id).map(|_| Vec::new())
            }
            ClientCommand::TypingStop { workspace_id } => {
                self.typing_stop(session, &workspace_id).map(|_| Vec::new())
            }
            ClientCommand::MarkRead { message_id } => {
                self.mark_read(origin, message_id).await.map(|_| Vec::new())
            }
            ClientCommand::AddReaction { message_id, emoji } => self
                .add_reaction(origin, message_id, &emoji)
                .await
                .map(|_| Vec::new()),
            ClientCommand::RemoveReaction { message_id, emoji } => self
                .remove_reaction(origin, message_id, &emoji)
                .await
                .map(|_| Vec::new()),
        };

        result.unwrap_or_else(|err| {
            tracing::debug!(
                "[Collab] {} from {} failed: {}",
                action,
                session.identity().id,
                err
            );
            vec![err.to_event(Some(action))]
        })
    }

    /// Queue events on the session's own outbox, behind any room events
    /// already queued for it
    pub fn deliver(&self, session: &ConnectionSession, events: Vec<ServerEvent>) {
        for event in events {
            self.bus.send_to(session.id(), event);
        }
    }

    // ----- Rooms -----

    /// Join without an acknowledgement, as auto-join does
    pub async fn join_room(
        &self,
        session: &ConnectionSession,
        workspace: &WorkspaceId,
    ) -> Result<JoinOutcome, BackendError> {
        self.admit(session, workspace, false).await
    }

    /// With `acknowledge`, `workspace-joined` and `presence-snapshot` are
    /// queued for the session before any room event can follow the join
    async fn admit(
        &self,
        session: &ConnectionSession,
        workspace: &WorkspaceId,
        acknowledge: bool,
    ) -> Result<JoinOutcome, BackendError> {
        validate_workspace_id(workspace)?;
        let identity = session.identity();

        if self.membership.role_of(identity.id, workspace).await?.is_none() {
            tracing::info!("[Collab] {} denied join to {}", identity.id, workspace);
            return Err(BackendError::forbidden(format!(
                "not a member of workspace {workspace}"
            )));
        }

        let transition = session
            .enter_room(workspace, || {
                self.registry.join_with(workspace, session.id(), identity.id, |transition, room| {
                    if acknowledge {
                        self.bus.send_to(
                            session.id(),
                            ServerEvent::WorkspaceJoined {
                                workspace_id: workspace.clone(),
                            },
                        );
                        self.bus.send_to(session.id(), self.presence.snapshot(workspace, room));
                    }
                    if transition.came_online {
                        self.presence.announce_online(workspace, room, identity, session.id());
                    }
                })
            })
            .ok_or_else(|| BackendError::unavailable("session is closing"))?;

        if transition.newly_joined {
            tracing::info!("[Collab] Session {} joined {}", session.id(), workspace);
        }

        Ok(JoinOutcome {
            workspace_id: workspace.clone(),
            newly_joined: transition.newly_joined,
        })
    }

    /// Join every workspace the oracle lists for the session's identity
    pub async fn join_known_workspaces(
        &self,
        session: &ConnectionSession,
    ) -> Result<Vec<WorkspaceId>, BackendError> {
        let identity = session.identity();
        let workspaces = self.membership.workspaces_of(identity.id).await?;

        let mut joined = Vec::with_capacity(workspaces.len());
        for workspace in workspaces {
            match self.join_room(session, &workspace).await {
                Ok(outcome) => joined.push(outcome.workspace_id),
                Err(err) => {
                    tracing::warn!(
                        "[Collab] Auto-join of {} failed for {}: {}",
                        workspace,
                        identity.id,
                        err
                    );
                }
            }
        }
        Ok(joined)
    }

    /// Returns whether the session was in the room
    pub fn leave_room(&self, session: &ConnectionSession, workspace: &WorkspaceId) -> bool {
        let left = session.exit_room(workspace, || {
            self.registry.leave_with(workspace, session.id(), |transition, room| {
                self.after_leave(session, workspace, transition, room);
            })
        });
        if left.is_none() {
            return false;
        }
        tracing::info!("[Collab] Session {} left {}", session.id(), workspace);
        true
    }

    /// Runs under the registry lock, against the members left in the room
    fn after_leave(
        &self,
        session: &ConnectionSession,
        workspace: &WorkspaceId,
        transition: LeaveTransition,
        room: RoomView<'_>,
    ) {
        if let Some(identity_id) = self.typing.stop(workspace, session.id()) {
            let event = ServerEvent::UserStoppedTyping {
                identity_id,
                workspace_id: workspace.clone(),
            };
            self.bus.deliver(workspace, room.sessions(), event, None);
        }
        if transition.went_offline {
            self.presence.announce_offline(workspace, room, session.identity().id);
        }
    }

    fn require_joined(&self, session: &ConnectionSession, workspace: &WorkspaceId) -> Result<(), BackendError> {
        if session.is_joined(workspace) {
            Ok(())
        } else {
            Err(BackendError::forbidden(format!(
                "join workspace {workspace} first"
            )))
        }
    }

    /// Ask the oracle for the caller's role, evicting a session whose
    /// membership has been revoked
    async fn authorize(
        &self,
        origin: Origin<'_>,
        workspace: &WorkspaceId,
    ) -> Result<WorkspaceRole, BackendError> {
        let identity = origin.identity();
        if let Some(role) = self.membership.role_of(identity.id, workspace).await? {
            return Ok(role);
        }

        if let Origin::Session(session) = origin {
            if self.leave_room(session, workspace) {
                tracing::info!(
                    "[Collab] Evicted session {} from {}: membership revoked",
                    session.id(),
                    workspace
                );
                self.bus.send_to(
                    session.id(),
                    ServerEvent::WorkspaceLeft {
                        workspace_id: workspace.clone(),
                    },
                );
            }
        }
        Err(BackendError::forbidden(format!(
            "not a member of workspace {workspace}"
        )))
    }

    async fn load_message(&self, message_id: Uuid) -> Result<Message, BackendError> {
        self.ledger
            .get(message_id)
            .await?
            .ok_or_else(|| BackendError::not_found(format!("message {message_id} not found")))
    }

    /// Reply and thread targets must be live messages of the same workspace
    async fn load_reference(&self, message_id: Uuid, workspace: &WorkspaceId) -> Result<Message, BackendError> {
        match self.ledger.get(message_id).await? {
            Some(message) if &message.workspace_id == workspace && !message.is_deleted() => Ok(message),
            _ => Err(BackendError::not_found(format!(
                "message {message_id} not found in workspace {workspace}"
            ))),
        }
    }

    // ----- Messages -----

    pub async fn send_message(
        &self,
        origin: Origin<'_>,
        payload: SendMessagePayload,
    ) -> Result<Message, BackendError> {
        validate_workspace_id(&payload.workspace_id)?;
        let content = normalize_content(&payload.content, self.settings.max_message_len)?;
        let identity = origin.identity();
        let workspace = payload.workspace_id;

        if let Origin::Session(session) = origin {
            self.require_joined(session, &workspace)?;
        }
        self.authorize(origin, &workspace).await?;

        let reply_to = match payload.reply_to_id {
            Some(id) => Some(self.load_reference(id, &workspace).await?.preview()),
            None => None,
        };
        if let Some(thread_id) = payload.thread_id {
            self.load_reference(thread_id, &workspace).await?;
        }

        let draft = MessageDraft {
            workspace_id: workspace.clone(),
            sender_id: identity.id,
            sender_name: identity.display_name.clone(),
            content,
            kind: payload.kind,
            metadata: payload.metadata,
            reply_to_id: payload.reply_to_id,
            thread_id: payload.thread_id,
            mentions: payload.mentions,
        };

        let turn = self.sequencers.acquire(&workspace).await;
        let message = self.ledger.append(draft).await?;
        let event = ServerEvent::NewMessage {
            message: message.clone(),
            reply_to,
        };
        self.bus.publish(&self.registry, &workspace, event, None);
        drop(turn);

        tracing::info!(
            "[Collab] Message {} sent by {} in {}",
            message.id,
            identity.id,
            workspace
        );
        Ok(message)
    }

    pub async fn edit_message(
        &self,
        origin: Origin<'_>,
        message_id: Uuid,
        content: &str,
    ) -> Result<Message, BackendError> {
        let content = normalize_content(content, self.settings.max_message_len)?;
        let identity = origin.identity();
        let current = self.load_message(message_id).await?;
        let workspace = current.workspace_id.clone();

        self.authorize(origin, &workspace).await?;
        if current.sender_id != identity.id {
            return Err(BackendError::forbidden("only the sender can edit a message"));
        }
        if current.is_deleted() {
            return Err(BackendError::not_found(format!("message {message_id} was deleted")));
        }

        let turn = self.sequencers.acquire(&workspace).await;
        let updated = self
            .ledger
            .edit_content(message_id, identity.id, &content, Utc::now())
            .await?
            .ok_or_else(|| BackendError::not_found(format!("message {message_id} was deleted")))?;
        let event = ServerEvent::MessageUpdated {
            message: updated.clone(),
        };
        self.bus.publish(&self.registry, &workspace, event, None);
        drop(turn);

        Ok(updated)
    }

    /// Soft delete. Deleting an already-deleted message succeeds without a
    /// second broadcast.
    pub async fn delete_message(&self, origin: Origin<'_>, message_id: Uuid) -> Result<Message, BackendError> {
        let identity = origin.identity();
        let current = self.load_message(message_id).await?;
        let workspace = current.workspace_id.clone();

        let role = self.authorize(origin, &workspace).await?;
        if current.sender_id != identity.id && !role.can_moderate() {
            return Err(BackendError::forbidden(
                "only the sender or a workspace admin can delete a message",
            ));
        }

        let turn = self.sequencers.acquire(&workspace).await;
        let update = self
            .ledger
            .soft_delete(message_id, identity.id, Utc::now())
            .await?
            .ok_or_else(|| BackendError::not_found(format!("message {message_id} not found")))?;
        let message = update.message.redacted();
        if update.changed {
            let event = ServerEvent::MessageDeleted {
                message: message.clone(),
            };
            self.bus.publish(&self.registry, &workspace, event, None);
            tracing::info!("[Collab] Message {} deleted by {}", message_id, identity.id);
        } else {
            tracing::debug!("[Collab] Message {} was already deleted", message_id);
        }
        drop(turn);

        Ok(message)
    }

    // ----- Reactions and read receipts -----

    pub async fn add_reaction(
        &self,
        origin: Origin<'_>,
        message_id: Uuid,
        emoji: &str,
    ) -> Result<Message, BackendError> {
        validate_emoji(emoji, self.settings.max_emoji_len)?;
        let identity = origin.identity();
        let current = self.load_message(message_id).await?;
        let workspace = current.workspace_id.clone();

        self.authorize(origin, &workspace).await?;
        if current.is_deleted() {
            return Err(BackendError::not_found(format!("message {message_id} was deleted")));
        }

        let turn = self.sequencers.acquire(&workspace).await;
        let update = self
            .ledger
            .add_reaction(message_id, identity.id, emoji, Utc::now())
            .await?
            .ok_or_else(|| BackendError::not_found(format!("message {message_id} not found")))?;
        let event = ServerEvent::ReactionAdded {
            message_id,
            workspace_id: workspace.clone(),
            identity_id: identity.id,
            emoji: emoji.to_string(),
        };
        self.bus.publish(&self.registry, &workspace, event, None);
        drop(turn);

        Ok(update.message.redacted())
    }

    pub async fn remove_reaction(
        &self,
        origin: Origin<'_>,
        message_id: Uuid,
        emoji: &str,
    ) -> Result<Message, BackendError> {
        validate_emoji(emoji, self.settings.max_emoji_len)?;
        let identity = origin.identity();
        let current = self.load_message(message_id).await?;
        let workspace = current.workspace_id.clone();

        self.authorize(origin, &workspace).await?;

        let turn = self.sequencers.acquire(&workspace).await;
        let update = self
            .ledger
            .remove_reaction(message_id, identity.id, emoji)
            .await?
            .ok_or_else(|| BackendError::not_found(format!("message {message_id} not found")))?;
        let event = ServerEvent::ReactionRemoved {
            message_id,
            workspace_id: workspace.clone(),
            identity_id: identity.id,
            emoji: emoji.to_string(),
        };
        self.bus.publish(&self.registry, &workspace, event, None);
        drop(turn);

        Ok(update.message.redacted())
    }

    pub async fn mark_read(&self, origin: Origin<'_>, message_id: Uuid) -> Result<ReadReceipt, BackendError> {
        let identity = origin.identity();
        let current = self.load_message(message_id).await?;
        let workspace = current.workspace_id.clone();

        self.authorize(origin, &workspace).await?;

        let turn = self.sequencers.acquire(&workspace).await;
        let update = self
            .ledger
            .mark_read(message_id, identity.id, Utc::now())
            .await?
            .ok_or_else(|| BackendError::not_found(format!("message {message_id} not found")))?;
        let receipt = update
            .message
            .read_by
            .iter()
            .find(|r| r.identity_id == identity.id)
            .cloned()
            .ok_or_else(|| BackendError::persist("read receipt was not recorded"))?;
        let event = ServerEvent::MessageRead {
            message_id,
            workspace_id: workspace.clone(),
            identity_id: identity.id,
            read_at: receipt.read_at,
        };
        self.bus.publish(&self.registry, &workspace, event, None);
        drop(turn);

        Ok(receipt)
    }

    // ----- Typing -----

    pub fn typing_start(&self, session: &ConnectionSession, workspace: &WorkspaceId) -> Result<(), BackendError> {
        validate_workspace_id(workspace)?;
        self.require_joined(session, workspace)?;
        let identity = session.identity();

        if self.typing.start(workspace, session.id(), identity.id, Instant::now()) {
            let event = ServerEvent::UserTyping {
                identity_id: identity.id,
                display_name: identity.display_name.clone(),
                workspace_id: workspace.clone(),
            };
            self.bus.publish(&self.registry, workspace, event, Some(session.id()));
        }
        Ok(())
    }

    pub fn typing_stop(&self, session: &ConnectionSession, workspace: &WorkspaceId) -> Result<(), BackendError> {
        validate_workspace_id(workspace)?;
        self.require_joined(session, workspace)?;

        if let Some(identity_id) = self.typing.stop(workspace, session.id()) {
            let event = ServerEvent::UserStoppedTyping {
                identity_id,
                workspace_id: workspace.clone(),
            };
            self.bus.publish(&self.registry, workspace, event, Some(session.id()));
        }
        Ok(())
    }

    /// Expire stale typing indicators; returns how many were cleared
    pub fn sweep_typing(&self) -> usize {
        let expired = self.typing.expire(Instant::now());
        for entry in &expired {
            let event = ServerEvent::UserStoppedTyping {
                identity_id: entry.identity_id,
                workspace_id: entry.workspace_id.clone(),
            };
            self.bus
                .publish(&self.registry, &entry.workspace_id, event, Some(entry.session_id));
        }
        if !expired.is_empty() {
            tracing::debug!("[Collab] Expired {} typing indicators", expired.len());
        }
        expired.len()
    }

    // ----- Queries -----

    pub async fn list_messages(
        &self,
        identity: &Identity,
        workspace: &WorkspaceId,
        query: &MessageQuery,
    ) -> Result<Vec<Message>, BackendError> {
        validate_workspace_id(workspace)?;
        self.authorize(Origin::Api(identity), workspace).await?;
        Ok(self.ledger.list(workspace, query).await?)
    }

    pub async fn get_message(&self, identity: &Identity, message_id: Uuid) -> Result<Message, BackendError> {
        let message = self.load_message(message_id).await?;
        self.authorize(Origin::Api(identity), &message.workspace_id).await?;
        Ok(message.redacted())
    }

    /// Replies of a thread, oldest first
    pub async fn thread(
        &self,
        identity: &Identity,
        thread_id: Uuid,
        limit: Option<usize>,
    ) -> Result<Vec<Message>, BackendError> {
        let root = self.load_message(thread_id).await?;
        self.authorize(Origin::Api(identity), &root.workspace_id).await?;

        let limit = MessageQuery {
            limit,
            ..Default::default()
        }
        .effective_limit();
        let replies = self.ledger.thread(thread_id, limit).await?;
        if replies.is_empty() {
            return Err(BackendError::not_found(format!("thread {thread_id} has no replies")));
        }
        Ok(replies)
    }

    pub async fn unread_count(&self, identity: &Identity, workspace: &WorkspaceId) -> Result<u64, BackendError> {
        validate_workspace_id(workspace)?;
        self.authorize(Origin::Api(identity), workspace).await?;
        Ok(self.ledger.unread_count(workspace, identity.id).await?)
    }

    pub async fn stats(&self, identity: &Identity, workspace: &WorkspaceId) -> Result<WorkspaceStats, BackendError> {
        validate_workspace_id(workspace)?;
        self.authorize(Origin::Api(identity), workspace).await?;

        let start_of_day = Utc::now()
            .date_naive()
            .and_hms_opt(0, 0, 0)
            .map(|midnight| midnight.and_utc());

        Ok(WorkspaceStats {
            total_messages: self.ledger.count(workspace, None).await?,
            today_messages: self.ledger.count(workspace, start_of_day).await?,
            unread_count: self.ledger.unread_count(workspace, identity.id).await?,
        })
    }

    /// Identities with at least one session in the room
    pub async fn presence(&self, identity: &Identity, workspace: &WorkspaceId) -> Result<Vec<Uuid>, BackendError> {
        validate_workspace_id(workspace)?;
        self.authorize(Origin::Api(identity), workspace).await?;
        Ok(self.registry.online_identities(workspace))
    }
}
