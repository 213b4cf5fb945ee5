//! Coordinator harness
//!
//! Wires a `Coordinator` over the in-memory ledger and membership oracle,
//! with helpers to mint members, open sessions and drain their outboxes.

use async_trait::async_trait;
use axum::Router;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use uuid::Uuid;

use nextgen_collab::backend::auth::JwtIdentityVerifier;
use nextgen_collab::backend::collab::{CollabDeps, Coordinator, OpenSession};
use nextgen_collab::backend::ledger::{InMemoryLedger, LedgerError, LedgerUpdate, MessageLedger};
use nextgen_collab::backend::realtime::{Inbox, RoomRegistry};
use nextgen_collab::backend::routes::create_router;
use nextgen_collab::backend::server::{AppState, ServerConfig};
use nextgen_collab::backend::workspace::{InMemoryMembership, WorkspaceRole};
use nextgen_collab::shared::message::{MessageDraft, MessageQuery};
use nextgen_collab::shared::{CollabSettings, Identity, Message, ServerEvent, WorkspaceId};

use super::auth_helpers::{token_for, TEST_SECRET};

pub struct TestHarness {
    pub coordinator: Arc<Coordinator>,
    pub membership: Arc<InMemoryMembership>,
    pub ledger: Arc<FailingLedger>,
}

impl TestHarness {
    pub fn new() -> Self {
        Self::with_settings(CollabSettings::default())
    }

    pub fn with_settings(settings: CollabSettings) -> Self {
        let membership = Arc::new(InMemoryMembership::new());
        let ledger = Arc::new(FailingLedger::new());
        let coordinator = Coordinator::new(
            CollabDeps {
                verifier: Arc::new(JwtIdentityVerifier::new(TEST_SECRET)),
                membership: membership.clone(),
                ledger: ledger.clone(),
                registry: Arc::new(RoomRegistry::new()),
            },
            settings,
        );

        Self {
            coordinator: Arc::new(coordinator),
            membership,
            ledger,
        }
    }

    /// A fresh identity granted `role` in `workspace`
    pub fn member(&self, name: &str, workspace: &WorkspaceId, role: WorkspaceRole) -> Identity {
        let identity = Identity::new(Uuid::new_v4(), name);
        self.membership.grant(workspace, identity.id, role);
        identity
    }

    /// A fresh identity with no memberships
    pub fn outsider(&self, name: &str) -> Identity {
        Identity::new(Uuid::new_v4(), name)
    }

    /// Open a session through the handshake, as the socket endpoint does
    pub async fn connect(&self, identity: &Identity) -> OpenSession {
        let token = token_for(identity);
        self.coordinator
            .connect(Some(&token))
            .await
            .expect("handshake with a valid token should succeed")
    }

    /// Open a session and join `workspace`, discarding the join chatter
    pub async fn connect_joined(&self, identity: &Identity, workspace: &WorkspaceId) -> OpenSession {
        let mut opened = self.connect(identity).await;
        self.coordinator
            .join_room(&opened.session, workspace)
            .await
            .expect("member should be able to join");
        drain(&mut opened.events);
        opened
    }

    /// Router over this harness' coordinator, for REST tests
    pub fn app(&self) -> Router {
        let config = ServerConfig {
            jwt_secret: TEST_SECRET.to_string(),
            ..ServerConfig::default()
        };
        create_router(AppState {
            coordinator: Arc::clone(&self.coordinator),
            config: Arc::new(config),
            db_pool: None,
        })
    }
}

/// Everything currently queued in an outbox
pub fn drain(inbox: &mut Inbox) -> Vec<ServerEvent> {
    let mut events = Vec::new();
    while let Ok(event) = inbox.try_recv() {
        events.push(event);
    }
    events
}

/// Messages carried by `new-message` events
pub fn new_messages(events: &[ServerEvent]) -> Vec<&Message> {
    events
        .iter()
        .filter_map(|event| match event {
            ServerEvent::NewMessage { message, .. } => Some(message),
            _ => None,
        })
        .collect()
}

/// In-memory ledger that can be switched into a failing mode
#[derive(Default)]
pub struct FailingLedger {
    inner: InMemoryLedger,
    failing: AtomicBool,
}

impl FailingLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    fn check(&self) -> Result<(), LedgerError> {
        if self.failing.load(Ordering::SeqCst) {
            Err(LedgerError::Storage("simulated outage".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl MessageLedger for FailingLedger {
    async fn append(&self, draft: MessageDraft) -> Result<Message, LedgerError> {
        self.check()?;
        self.inner.append(draft).await
    }

    async fn get(&self, id: Uuid) -> Result<Option<Message>, LedgerError> {
        self.inner.get(id).await
    }

    async fn edit_content(
        &self,
        id: Uuid,
        editor: Uuid,
        content: &str,
        at: DateTime<Utc>,
    ) -> Result<Option<Message>, LedgerError> {
        self.check()?;
        self.inner.edit_content(id, editor, content, at).await
    }

    async fn soft_delete(
        &self,
        id: Uuid,
        deleted_by: Uuid,
        at: DateTime<Utc>,
    ) -> Result<Option<LedgerUpdate>, LedgerError> {
        self.check()?;
        self.inner.soft_delete(id, deleted_by, at).await
    }

    async fn add_reaction(
        &self,
        id: Uuid,
        identity: Uuid,
        emoji: &str,
        at: DateTime<Utc>,
    ) -> Result<Option<LedgerUpdate>, LedgerError> {
        self.check()?;
        self.inner.add_reaction(id, identity, emoji, at).await
    }

    async fn remove_reaction(
        &self,
        id: Uuid,
        identity: Uuid,
        emoji: &str,
    ) -> Result<Option<LedgerUpdate>, LedgerError> {
        self.check()?;
        self.inner.remove_reaction(id, identity, emoji).await
    }

    async fn mark_read(
        &self,
        id: Uuid,
        identity: Uuid,
        at: DateTime<Utc>,
    ) -> Result<Option<LedgerUpdate>, LedgerError> {
        self.check()?;
        self.inner.mark_read(id, identity, at).await
    }

    async fn list(&self, workspace: &WorkspaceId, query: &MessageQuery) -> Result<Vec<Message>, LedgerError> {
        self.inner.list(workspace, query).await
    }

    async fn thread(&self, thread_id: Uuid, limit: usize) -> Result<Vec<Message>, LedgerError> {
        self.inner.thread(thread_id, limit).await
    }

    async fn unread_count(&self, workspace: &WorkspaceId, identity: Uuid) -> Result<u64, LedgerError> {
        self.inner.unread_count(workspace, identity).await
    }

    async fn count(&self, workspace: &WorkspaceId, since: Option<DateTime<Utc>>) -> Result<u64, LedgerError> {
        self.inner.count(workspace, since).await
    }
}
