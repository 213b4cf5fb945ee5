//! PostgreSQL ledger
//!
//! Messages live in `messages`; read receipts and reactions in their own
//! tables keyed by (message, user) and (message, user, emoji), so upserts
//! and add/remove-from-set are single statements with `ON CONFLICT`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::types::Json;
use sqlx::{PgPool, Row};
use std::collections::HashMap;
use uuid::Uuid;

use super::{LedgerError, LedgerUpdate, MessageLedger};
use crate::shared::message::{
    Message, MessageDraft, MessageKind, MessageMetadata, MessageQuery, Reaction, ReadReceipt,
    WorkspaceId,
};

const MESSAGE_COLUMNS: &str = "id, workspace_id, sender_id, sender_name, content, kind, metadata, \
     reply_to_id, thread_id, mentions, created_at, edited_at, deleted_at, deleted_by";

#[derive(Clone)]
pub struct PgLedger {
    pool: PgPool,
}

impl PgLedger {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Attach read receipts and reactions to freshly loaded rows
    async fn hydrate(&self, rows: Vec<PgRow>) -> Result<Vec<Message>, LedgerError> {
        let mut messages = rows
            .iter()
            .map(message_from_row)
            .collect::<Result<Vec<_>, _>>()?;
        if messages.is_empty() {
            return Ok(messages);
        }

        let ids: Vec<Uuid> = messages.iter().map(|m| m.id).collect();

        let read_rows = sqlx::query(
            r#"
            SELECT message_id, user_id, read_at
            FROM message_reads
            WHERE message_id = ANY($1)
            ORDER BY read_at
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let mut reads: HashMap<Uuid, Vec<ReadReceipt>> = HashMap::new();
        for row in read_rows {
            let message_id: Uuid = row.try_get("message_id")?;
            reads.entry(message_id).or_default().push(ReadReceipt {
                identity_id: row.try_get("user_id")?,
                read_at: row.try_get("read_at")?,
            });
        }

        let reaction_rows = sqlx::query(
            r#"
            SELECT message_id, user_id, emoji, created_at
            FROM message_reactions
            WHERE message_id = ANY($1)
            ORDER BY created_at
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let mut reactions: HashMap<Uuid, Vec<Reaction>> = HashMap::new();
        for row in reaction_rows {
            let message_id: Uuid = row.try_get("message_id")?;
            reactions.entry(message_id).or_default().push(Reaction {
                identity_id: row.try_get("user_id")?,
                emoji: row.try_get("emoji")?,
                created_at: row.try_get("created_at")?,
            });
        }

        for message in &mut messages {
            message.read_by = reads.remove(&message.id).unwrap_or_default();
            message.reactions = reactions.remove(&message.id).unwrap_or_default();
        }
        Ok(messages)
    }

    async fn fetch_one(&self, id: Uuid) -> Result<Option<Message>, LedgerError> {
        let sql = format!("SELECT {MESSAGE_COLUMNS} FROM messages WHERE id = $1");
        let row = sqlx::query(&sql).bind(id).fetch_optional(&self.pool).await?;
        match row {
            Some(row) => Ok(self.hydrate(vec![row]).await?.into_iter().next()),
            None => Ok(None),
        }
    }

    async fn fetch_update(&self, id: Uuid, changed: bool) -> Result<Option<LedgerUpdate>, LedgerError> {
        Ok(self
            .fetch_one(id)
            .await?
            .map(|message| LedgerUpdate { message, changed }))
    }
}

fn message_from_row(row: &PgRow) -> Result<Message, LedgerError> {
    let kind: String = row.try_get("kind")?;
    let kind = MessageKind::parse(&kind)
        .ok_or_else(|| LedgerError::Corrupt(format!("unknown message kind '{kind}'")))?;
    let metadata: Option<Json<MessageMetadata>> = row.try_get("metadata")?;
    let mentions: Vec<Uuid> = row.try_get("mentions")?;
    let workspace_id: String = row.try_get("workspace_id")?;

    Ok(Message {
        id: row.try_get("id")?,
        workspace_id: WorkspaceId::from(workspace_id),
        sender_id: row.try_get("sender_id")?,
        sender_name: row.try_get("sender_name")?,
        content: row.try_get("content")?,
        kind,
        metadata: metadata.map(|json| json.0).unwrap_or_default(),
        created_at: row.try_get("created_at")?,
        edited_at: row.try_get("edited_at")?,
        deleted_at: row.try_get("deleted_at")?,
        deleted_by: row.try_get("deleted_by")?,
        reply_to_id: row.try_get("reply_to_id")?,
        thread_id: row.try_get("thread_id")?,
        mentions: mentions.into_iter().collect(),
        read_by: Vec::new(),
        reactions: Vec::new(),
    })
}

#[async_trait]
impl MessageLedger for PgLedger {
    async fn append(&self, draft: MessageDraft) -> Result<Message, LedgerError> {
        let message = Message::from_draft(draft, Uuid::new_v4(), Utc::now());
        let mentions: Vec<Uuid> = message.mentions.iter().copied().collect();

        sqlx::query(
            r#"
            INSERT INTO messages (id, workspace_id, sender_id, sender_name, content, kind, metadata,
                                  reply_to_id, thread_id, mentions, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(message.id)
        .bind(message.workspace_id.as_str())
        .bind(message.sender_id)
        .bind(&message.sender_name)
        .bind(&message.content)
        .bind(message.kind.as_str())
        .bind(Json(&message.metadata))
        .bind(message.reply_to_id)
        .bind(message.thread_id)
        .bind(&mentions)
        .bind(message.created_at)
        .execute(&self.pool)
        .await?;

        tracing::debug!("[Ledger] Appended message {} to {}", message.id, message.workspace_id);
        Ok(message)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Message>, LedgerError> {
        self.fetch_one(id).await
    }

    async fn edit_content(
        &self,
        id: Uuid,
        editor: Uuid,
        content: &str,
        at: DateTime<Utc>,
    ) -> Result<Option<Message>, LedgerError> {
        let result = sqlx::query(
            r#"
            UPDATE messages
            SET content = $1, edited_at = $2
            WHERE id = $3 AND sender_id = $4 AND deleted_at IS NULL
            "#,
        )
        .bind(content)
        .bind(at)
        .bind(id)
        .bind(editor)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.fetch_one(id).await
    }

    async fn soft_delete(
        &self,
        id: Uuid,
        deleted_by: Uuid,
        at: DateTime<Utc>,
    ) -> Result<Option<LedgerUpdate>, LedgerError> {
        let result = sqlx::query(
            r#"
            UPDATE messages
            SET deleted_at = $1, deleted_by = $2
            WHERE id = $3 AND deleted_at IS NULL
            "#,
        )
        .bind(at)
        .bind(deleted_by)
        .bind(id)
        .execute(&self.pool)
        .await?;

        self.fetch_update(id, result.rows_affected() > 0).await
    }

    async fn add_reaction(
        &self,
        id: Uuid,
        identity: Uuid,
        emoji: &str,
        at: DateTime<Utc>,
    ) -> Result<Option<LedgerUpdate>, LedgerError> {
        let result = sqlx::query(
            r#"
            INSERT INTO message_reactions (message_id, user_id, emoji, created_at)
            SELECT $1, $2, $3, $4
            WHERE EXISTS (SELECT 1 FROM messages WHERE id = $1)
            ON CONFLICT (message_id, user_id, emoji) DO NOTHING
            "#,
        )
        .bind(id)
        .bind(identity)
        .bind(emoji)
        .bind(at)
        .execute(&self.pool)
        .await?;

        self.fetch_update(id, result.rows_affected() > 0).await
    }

    async fn remove_reaction(
        &self,
        id: Uuid,
        identity: Uuid,
        emoji: &str,
    ) -> Result<Option<LedgerUpdate>, LedgerError> {
        let result = sqlx::query(
            r#"
            DELETE FROM message_reactions
            WHERE message_id = $1 AND user_id = $2 AND emoji = $3
            "#,
        )
        .bind(id)
        .bind(identity)
        .bind(emoji)
        .execute(&self.pool)
        .await?;

        self.fetch_update(id, result.rows_affected() > 0).await
    }

    async fn mark_read(
        &self,
        id: Uuid,
        identity: Uuid,
        at: DateTime<Utc>,
    ) -> Result<Option<LedgerUpdate>, LedgerError> {
        let result = sqlx::query(
            r#"
            INSERT INTO message_reads (message_id, user_id, read_at)
            SELECT $1, $2, $3
            WHERE EXISTS (SELECT 1 FROM messages WHERE id = $1)
            ON CONFLICT (message_id, user_id)
            DO UPDATE SET read_at = EXCLUDED.read_at
            WHERE message_reads.read_at < EXCLUDED.read_at
            "#,
        )
        .bind(id)
        .bind(identity)
        .bind(at)
        .execute(&self.pool)
        .await?;

        self.fetch_update(id, result.rows_affected() > 0).await
    }

    async fn list(
        &self,
        workspace: &WorkspaceId,
        query: &MessageQuery,
    ) -> Result<Vec<Message>, LedgerError> {
        let sql = format!(
            r#"
            SELECT {MESSAGE_COLUMNS}
            FROM messages
            WHERE workspace_id = $1
              AND deleted_at IS NULL
              AND ($2::timestamptz IS NULL OR created_at < $2)
              AND ($3::timestamptz IS NULL OR created_at > $3)
              AND ($4::uuid IS NULL OR thread_id = $4)
            ORDER BY created_at DESC
            LIMIT $5
            "#
        );
        let rows = sqlx::query(&sql)
            .bind(workspace.as_str())
            .bind(query.before)
            .bind(query.after)
            .bind(query.thread_id)
            .bind(query.effective_limit() as i64)
            .fetch_all(&self.pool)
            .await?;

        self.hydrate(rows).await
    }

    async fn thread(&self, thread_id: Uuid, limit: usize) -> Result<Vec<Message>, LedgerError> {
        let sql = format!(
            r#"
            SELECT {MESSAGE_COLUMNS}
            FROM messages
            WHERE thread_id = $1 AND deleted_at IS NULL
            ORDER BY created_at ASC
            LIMIT $2
            "#
        );
        let rows = sqlx::query(&sql)
            .bind(thread_id)
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await?;

        self.hydrate(rows).await
    }

    async fn unread_count(&self, workspace: &WorkspaceId, identity: Uuid) -> Result<u64, LedgerError> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM messages m
            WHERE m.workspace_id = $1
              AND m.sender_id <> $2
              AND m.deleted_at IS NULL
              AND NOT EXISTS (
                  SELECT 1 FROM message_reads r
                  WHERE r.message_id = m.id AND r.user_id = $2
              )
            "#,
        )
        .bind(workspace.as_str())
        .bind(identity)
        .fetch_one(&self.pool)
        .await?;

        Ok(count.max(0) as u64)
    }

    async fn count(
        &self,
        workspace: &WorkspaceId,
        since: Option<DateTime<Utc>>,
    ) -> Result<u64, LedgerError> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM messages
            WHERE workspace_id = $1
              AND deleted_at IS NULL
              AND ($2::timestamptz IS NULL OR created_at >= $2)
            "#,
        )
        .bind(workspace.as_str())
        .bind(since)
        .fetch_one(&self.pool)
        .await?;

        Ok(count.max(0) as u64)
    }
}
