/**
 * Message Ledger
 *
 * Durable store of workspace messages. Every mutation is a single atomic
 * operation on the store (conditional update, add-to-set, remove-from-set,
 * upsert), so concurrent reactions or read receipts from different
 * sessions never lose each other's writes. Callers never read, modify and
 * write back a whole message.
 *
 * Implementations:
 * - `InMemoryLedger` - process-local, used when no database is configured
 * - `PgLedger` - PostgreSQL via sqlx
 */

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::shared::message::{Message, MessageDraft, MessageQuery, WorkspaceId};

pub mod memory;
pub mod db;

pub use memory::InMemoryLedger;
pub use db::PgLedger;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("storage error: {0}")]
    Storage(String),
    #[error("stored row is invalid: {0}")]
    Corrupt(String),
}

impl From<sqlx::Error> for LedgerError {
    fn from(err: sqlx::Error) -> Self {
        Self::Storage(err.to_string())
    }
}

/// Result of a mutation that may be a no-op
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerUpdate {
    pub message: Message,
    /// `false` when the call left the record unchanged
    pub changed: bool,
}

#[async_trait]
pub trait MessageLedger: Send + Sync {
    /// Persist a new message, assigning its id and creation time
    async fn append(&self, draft: MessageDraft) -> Result<Message, LedgerError>;

    /// Fetch a message, deleted or not
    async fn get(&self, id: Uuid) -> Result<Option<Message>, LedgerError>;

    /// Replace content if `editor` is the sender and the message is not
    /// deleted. `None` when no such message exists.
    async fn edit_content(
        &self,
        id: Uuid,
        editor: Uuid,
        content: &str,
        at: DateTime<Utc>,
    ) -> Result<Option<Message>, LedgerError>;

    /// Flag as deleted; a second deletion leaves the first one in place
    async fn soft_delete(
        &self,
        id: Uuid,
        deleted_by: Uuid,
        at: DateTime<Utc>,
    ) -> Result<Option<LedgerUpdate>, LedgerError>;

    async fn add_reaction(
        &self,
        id: Uuid,
        identity: Uuid,
        emoji: &str,
        at: DateTime<Utc>,
    ) -> Result<Option<LedgerUpdate>, LedgerError>;

    async fn remove_reaction(
        &self,
        id: Uuid,
        identity: Uuid,
        emoji: &str,
    ) -> Result<Option<LedgerUpdate>, LedgerError>;

    /// Upsert the identity's read receipt, keeping the newest timestamp
    async fn mark_read(
        &self,
        id: Uuid,
        identity: Uuid,
        at: DateTime<Utc>,
    ) -> Result<Option<LedgerUpdate>, LedgerError>;

    /// Non-deleted messages of a workspace, newest first
    async fn list(
        &self,
        workspace: &WorkspaceId,
        query: &MessageQuery,
    ) -> Result<Vec<Message>, LedgerError>;

    /// Non-deleted replies of a thread, oldest first
    async fn thread(&self, thread_id: Uuid, limit: usize) -> Result<Vec<Message>, LedgerError>;

    /// Others' non-deleted messages the identity has not read
    async fn unread_count(&self, workspace: &WorkspaceId, identity: Uuid) -> Result<u64, LedgerError>;

    /// Non-deleted messages, optionally only those created since `since`
    async fn count(
        &self,
        workspace: &WorkspaceId,
        since: Option<DateTime<Utc>>,
    ) -> Result<u64, LedgerError>;
}
