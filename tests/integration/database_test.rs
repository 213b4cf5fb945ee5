//! PostgreSQL adapter tests
//!
//! Exercise the SQL behind `PgLedger` and `PgMembership` against a real
//! database. Skipped when `DATABASE_URL` is unset.

use chrono::{DateTime, TimeZone, Utc};
use pretty_assertions::assert_eq;
use uuid::Uuid;

use nextgen_collab::backend::ledger::{MessageLedger, PgLedger};
use nextgen_collab::backend::workspace::{MembershipOracle, PgMembership, WorkspaceRole};
use nextgen_collab::shared::{Message, MessageDraft, WorkspaceId};

use crate::common::database::{count_rows, run_migrations, test_pool};

const REACTION_ROWS: &str = "SELECT COUNT(*) FROM message_reactions WHERE message_id = $1";
const READ_ROWS: &str = "SELECT COUNT(*) FROM message_reads WHERE message_id = $1";

fn at(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
}

fn workspace() -> WorkspaceId {
    WorkspaceId::new(format!("db-{}", Uuid::new_v4()))
}

async fn posted(ledger: &PgLedger, sender: Uuid) -> Message {
    ledger
        .append(MessageDraft::text(workspace(), sender, "Sender", "hello"))
        .await
        .unwrap()
}

#[tokio::test]
async fn test_migrations_are_idempotent() {
    let Some(pool) = test_pool().await else { return };

    assert!(run_migrations(&pool).await.is_ok());
    for table in ["workspace_members", "messages", "message_reads", "message_reactions"] {
        let result = sqlx::query(&format!("SELECT 1 FROM {table} LIMIT 1"))
            .execute(&pool)
            .await;
        assert!(result.is_ok(), "{table} should exist");
    }
}

#[tokio::test]
async fn test_reaction_is_stored_once() {
    let Some(pool) = test_pool().await else { return };
    let ledger = PgLedger::new(pool.clone());
    let message = posted(&ledger, Uuid::new_v4()).await;
    let reactor = Uuid::new_v4();

    let first = ledger.add_reaction(message.id, reactor, "👍", at(1)).await.unwrap().unwrap();
    let again = ledger.add_reaction(message.id, reactor, "👍", at(2)).await.unwrap().unwrap();

    assert!(first.changed);
    assert!(!again.changed);
    assert_eq!(again.message.reactions.len(), 1);
    assert_eq!(count_rows(&pool, REACTION_ROWS, message.id).await, 1);

    let missing = ledger.add_reaction(Uuid::new_v4(), reactor, "👍", at(3)).await.unwrap();
    assert!(missing.is_none());
}

#[tokio::test]
async fn test_removing_absent_reaction_is_a_no_op() {
    let Some(pool) = test_pool().await else { return };
    let ledger = PgLedger::new(pool.clone());
    let message = posted(&ledger, Uuid::new_v4()).await;
    let reactor = Uuid::new_v4();
    ledger.add_reaction(message.id, reactor, "👍", at(1)).await.unwrap();

    let absent = ledger.remove_reaction(message.id, reactor, "🎉").await.unwrap().unwrap();
    assert!(!absent.changed);
    assert_eq!(absent.message.reactions.len(), 1);

    let removed = ledger.remove_reaction(message.id, reactor, "👍").await.unwrap().unwrap();
    assert!(removed.changed);
    assert!(removed.message.reactions.is_empty());
    assert_eq!(count_rows(&pool, REACTION_ROWS, message.id).await, 0);
}

#[tokio::test]
async fn test_read_receipt_keeps_newest_timestamp() {
    let Some(pool) = test_pool().await else { return };
    let ledger = PgLedger::new(pool.clone());
    let message = posted(&ledger, Uuid::new_v4()).await;
    let reader = Uuid::new_v4();

    assert!(ledger.mark_read(message.id, reader, at(20)).await.unwrap().unwrap().changed);

    let older = ledger.mark_read(message.id, reader, at(10)).await.unwrap().unwrap();
    assert!(!older.changed);
    assert_eq!(older.message.read_by.len(), 1);
    assert_eq!(older.message.read_by[0].read_at, at(20));

    let newer = ledger.mark_read(message.id, reader, at(30)).await.unwrap().unwrap();
    assert!(newer.changed);
    assert_eq!(newer.message.read_by[0].read_at, at(30));
    assert_eq!(count_rows(&pool, READ_ROWS, message.id).await, 1);
}

#[tokio::test]
async fn test_delete_is_idempotent_and_blocks_edits() {
    let Some(pool) = test_pool().await else { return };
    let ledger = PgLedger::new(pool);
    let sender = Uuid::new_v4();
    let message = posted(&ledger, sender).await;

    let stranger = ledger.edit_content(message.id, Uuid::new_v4(), "hijack", at(1)).await.unwrap();
    assert!(stranger.is_none());

    let edited = ledger.edit_content(message.id, sender, "edited", at(2)).await.unwrap().unwrap();
    assert_eq!(edited.content, "edited");
    assert_eq!(edited.edited_at, Some(at(2)));

    let first = ledger.soft_delete(message.id, sender, at(3)).await.unwrap().unwrap();
    assert!(first.changed);
    assert_eq!(first.message.deleted_at, Some(at(3)));

    let second = ledger.soft_delete(message.id, sender, at(4)).await.unwrap().unwrap();
    assert!(!second.changed);
    assert_eq!(second.message.deleted_at, Some(at(3)));

    let after_delete = ledger.edit_content(message.id, sender, "too late", at(5)).await.unwrap();
    assert!(after_delete.is_none());

    let listed = ledger.list(&message.workspace_id, &Default::default()).await.unwrap();
    assert!(listed.is_empty());
}

#[tokio::test]
async fn test_membership_roles_and_workspaces() {
    let Some(pool) = test_pool().await else { return };
    let membership = PgMembership::new(pool);
    let identity = Uuid::new_v4();
    let (w1, w2) = (workspace(), workspace());

    assert_eq!(membership.role_of(identity, &w1).await.unwrap(), None);

    membership.grant(&w1, identity, WorkspaceRole::Member).await.unwrap();
    membership.grant(&w2, identity, WorkspaceRole::Owner).await.unwrap();
    membership.grant(&w1, identity, WorkspaceRole::Admin).await.unwrap();

    assert_eq!(membership.role_of(identity, &w1).await.unwrap(), Some(WorkspaceRole::Admin));
    let mut expected = vec![w1, w2];
    expected.sort();
    assert_eq!(membership.workspaces_of(identity).await.unwrap(), expected);
}
