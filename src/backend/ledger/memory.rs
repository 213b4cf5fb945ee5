//! Process-local ledger
//!
//! Each operation runs under one write lock, which gives the same
//! per-message atomicity the SQL statements give `PgLedger`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use uuid::Uuid;

use super::{LedgerError, LedgerUpdate, MessageLedger};
use crate::shared::message::{Message, MessageDraft, MessageQuery, WorkspaceId};

#[derive(Debug, Default)]
struct Store {
    /// Insertion sequence breaks ties between equal timestamps
    messages: HashMap<Uuid, (u64, Message)>,
    next_seq: u64,
}

#[derive(Debug, Default)]
pub struct InMemoryLedger {
    store: RwLock<Store>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.store.read().unwrap_or_else(PoisonError::into_inner).messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn update<F>(&self, id: Uuid, mutate: F) -> Option<LedgerUpdate>
    where
        F: FnOnce(&mut Message) -> bool,
    {
        let mut store = self.store.write().unwrap_or_else(PoisonError::into_inner);
        let (_, message) = store.messages.get_mut(&id)?;
        let changed = mutate(message);
        Some(LedgerUpdate {
            message: message.clone(),
            changed,
        })
    }

    fn select<F>(&self, filter: F) -> Vec<(u64, Message)>
    where
        F: Fn(&Message) -> bool,
    {
        let store = self.store.read().unwrap_or_else(PoisonError::into_inner);
        store
            .messages
            .values()
            .filter(|(_, message)| filter(message))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl MessageLedger for InMemoryLedger {
    async fn append(&self, draft: MessageDraft) -> Result<Message, LedgerError> {
        let message = Message::from_draft(draft, Uuid::new_v4(), Utc::now());
        let mut store = self.store.write().unwrap_or_else(PoisonError::into_inner);
        let seq = store.next_seq;
        store.next_seq += 1;
        store.messages.insert(message.id, (seq, message.clone()));
        Ok(message)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Message>, LedgerError> {
        let store = self.store.read().unwrap_or_else(PoisonError::into_inner);
        Ok(store.messages.get(&id).map(|(_, message)| message.clone()))
    }

    async fn edit_content(
        &self,
        id: Uuid,
        editor: Uuid,
        content: &str,
        at: DateTime<Utc>,
    ) -> Result<Option<Message>, LedgerError> {
        let mut store = self.store.write().unwrap_or_else(PoisonError::into_inner);
        match store.messages.get_mut(&id) {
            Some((_, message)) if message.sender_id == editor && !message.is_deleted() => {
                message.apply_edit(content, at);
                Ok(Some(message.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn soft_delete(
        &self,
        id: Uuid,
        deleted_by: Uuid,
        at: DateTime<Utc>,
    ) -> Result<Option<LedgerUpdate>, LedgerError> {
        Ok(self.update(id, |message| message.apply_soft_delete(deleted_by, at)))
    }

    async fn add_reaction(
        &self,
        id: Uuid,
        identity: Uuid,
        emoji: &str,
        at: DateTime<Utc>,
    ) -> Result<Option<LedgerUpdate>, LedgerError> {
        Ok(self.update(id, |message| message.add_reaction(identity, emoji, at)))
    }

    async fn remove_reaction(
        &self,
        id: Uuid,
        identity: Uuid,
        emoji: &str,
    ) -> Result<Option<LedgerUpdate>, LedgerError> {
        Ok(self.update(id, |message| message.remove_reaction(identity, emoji)))
    }

    async fn mark_read(
        &self,
        id: Uuid,
        identity: Uuid,
        at: DateTime<Utc>,
    ) -> Result<Option<LedgerUpdate>, LedgerError> {
        Ok(self.update(id, |message| message.record_read(identity, at)))
    }

    async fn list(
        &self,
        workspace: &WorkspaceId,
        query: &MessageQuery,
    ) -> Result<Vec<Message>, LedgerError> {
        let mut rows = self.select(|m| {
            &m.workspace_id == workspace && !m.is_deleted() && query.matches(m)
        });
        rows.sort_by(|(a_seq, a), (b_seq, b)| {
            b.created_at.cmp(&a.created_at).then(b_seq.cmp(a_seq))
        });
        Ok(rows
            .into_iter()
            .take(query.effective_limit())
            .map(|(_, message)| message)
            .collect())
    }

    async fn thread(&self, thread_id: Uuid, limit: usize) -> Result<Vec<Message>, LedgerError> {
        let mut rows = self.select(|m| m.thread_id == Some(thread_id) && !m.is_deleted());
        rows.sort_by(|(a_seq, a), (b_seq, b)| {
            a.created_at.cmp(&b.created_at).then(a_seq.cmp(b_seq))
        });
        Ok(rows.into_iter().take(limit).map(|(_, message)| message).collect())
    }

    async fn unread_count(&self, workspace: &WorkspaceId, identity: Uuid) -> Result<u64, LedgerError> {
        let rows = self.select(|m| {
            &m.workspace_id == workspace
                && m.sender_id != identity
                && !m.is_deleted()
                && !m.has_read(identity)
        });
        Ok(rows.len() as u64)
    }

    async fn count(
        &self,
        workspace: &WorkspaceId,
        since: Option<DateTime<Utc>>,
    ) -> Result<u64, LedgerError> {
        let rows = self.select(|m| {
            &m.workspace_id == workspace
                && !m.is_deleted()
                && since.map_or(true, |since| m.created_at >= since)
        });
        Ok(rows.len() as u64)
    }
}
