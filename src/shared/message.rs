/**
 * Workspace Message Model
 *
 * This module defines the canonical `Message` record used by the ledger,
 * the collaboration coordinator and both wire surfaces (WebSocket events
 * and the REST API).
 *
 * A message is never physically removed. Its lifecycle is:
 * created on send, edited by its sender, soft-deleted by its sender or a
 * workspace admin/owner, and annotated with read receipts and reactions.
 *
 * The mutation helpers here are pure: they describe how a single record
 * changes and report whether anything changed. Atomicity across
 * concurrent callers is the ledger's job.
 */
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use uuid::Uuid;

/// Number of characters kept in a reply preview
pub const PREVIEW_CHARS: usize = 140;

/// Opaque identifier of a workspace (and of its room)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkspaceId(String);

impl WorkspaceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Blank ids are rejected at the protocol boundary
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for WorkspaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for WorkspaceId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for WorkspaceId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// What a message carries
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MessageKind {
    #[default]
    Text,
    Image,
    File,
    #[serde(alias = "task")]
    TaskReference,
    System,
    #[serde(alias = "reaction")]
    ReactionEcho,
}

impl MessageKind {
    /// Storage representation, identical to the wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Image => "image",
            Self::File => "file",
            Self::TaskReference => "task-reference",
            Self::System => "system",
            Self::ReactionEcho => "reaction-echo",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "text" => Some(Self::Text),
            "image" => Some(Self::Image),
            "file" => Some(Self::File),
            "task-reference" | "task" => Some(Self::TaskReference),
            "system" => Some(Self::System),
            "reaction-echo" | "reaction" => Some(Self::ReactionEcho),
            _ => None,
        }
    }
}

/// Optional attachment details
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,
}

impl MessageMetadata {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// One identity's read marker on a message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadReceipt {
    pub identity_id: Uuid,
    pub read_at: DateTime<Utc>,
}

/// One identity's reaction on a message, unique per (identity, emoji)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reaction {
    pub identity_id: Uuid,
    pub emoji: String,
    pub created_at: DateTime<Utc>,
}

/// A persisted workspace message
///
/// # Example
/// ```rust
/// use chrono::Utc;
/// use nextgen_collab::shared::message::{Message, MessageDraft};
/// use uuid::Uuid;
///
/// let sender = Uuid::new_v4();
/// let draft = MessageDraft::text("design-team", sender, "Alice", "hello");
/// let mut message = Message::from_draft(draft, Uuid::new_v4(), Utc::now());
///
/// assert!(message.add_reaction(sender, "👍", Utc::now()));
/// assert!(!message.add_reaction(sender, "👍", Utc::now()));
/// assert_eq!(message.reaction_count(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: Uuid,
    pub workspace_id: WorkspaceId,
    pub sender_id: Uuid,
    pub sender_name: String,
    pub content: String,
    #[serde(default)]
    pub kind: MessageKind,
    #[serde(default, skip_serializing_if = "MessageMetadata::is_empty")]
    pub metadata: MessageMetadata,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub edited_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub deleted_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub deleted_by: Option<Uuid>,
    #[serde(default)]
    pub reply_to_id: Option<Uuid>,
    #[serde(default)]
    pub thread_id: Option<Uuid>,
    #[serde(default)]
    pub mentions: BTreeSet<Uuid>,
    #[serde(default)]
    pub read_by: Vec<ReadReceipt>,
    #[serde(default)]
    pub reactions: Vec<Reaction>,
}

impl Message {
    /// Materialize a draft with a ledger-assigned id and timestamp
    pub fn from_draft(draft: MessageDraft, id: Uuid, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            workspace_id: draft.workspace_id,
            sender_id: draft.sender_id,
            sender_name: draft.sender_name,
            content: draft.content,
            kind: draft.kind,
            metadata: draft.metadata,
            created_at,
            edited_at: None,
            deleted_at: None,
            deleted_by: None,
            reply_to_id: draft.reply_to_id,
            thread_id: draft.thread_id,
            mentions: draft.mentions,
            read_by: Vec::new(),
            reactions: Vec::new(),
        }
    }

    pub fn is_edited(&self) -> bool {
        self.edited_at.is_some()
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    pub fn read_count(&self) -> usize {
        self.read_by.len()
    }

    pub fn reaction_count(&self) -> usize {
        self.reactions.len()
    }

    pub fn has_read(&self, identity_id: Uuid) -> bool {
        self.read_by.iter().any(|r| r.identity_id == identity_id)
    }

    pub fn has_reaction(&self, identity_id: Uuid, emoji: &str) -> bool {
        self.reactions
            .iter()
            .any(|r| r.identity_id == identity_id && r.emoji == emoji)
    }

    /// Emoji to the identities that used it, in first-reaction order
    pub fn reaction_summary(&self) -> BTreeMap<String, Vec<Uuid>> {
        let mut summary: BTreeMap<String, Vec<Uuid>> = BTreeMap::new();
        for reaction in &self.reactions {
            summary
                .entry(reaction.emoji.clone())
                .or_default()
                .push(reaction.identity_id);
        }
        summary
    }

    /// Upsert the identity's read receipt. The newest `read_at` wins.
    ///
    /// Returns `true` when the receipt was inserted or moved forward.
    pub fn record_read(&mut self, identity_id: Uuid, at: DateTime<Utc>) -> bool {
        match self.read_by.iter_mut().find(|r| r.identity_id == identity_id) {
            Some(receipt) if receipt.read_at >= at => false,
            Some(receipt) => {
                receipt.read_at = at;
                true
            }
            None => {
                self.read_by.push(ReadReceipt {
                    identity_id,
                    read_at: at,
                });
                true
            }
        }
    }

    /// Add-to-set; a repeated (identity, emoji) pair is a no-op
    pub fn add_reaction(&mut self, identity_id: Uuid, emoji: &str, at: DateTime<Utc>) -> bool {
        if self.has_reaction(identity_id, emoji) {
            return false;
        }
        self.reactions.push(Reaction {
            identity_id,
            emoji: emoji.to_string(),
            created_at: at,
        });
        true
    }

    /// Remove-from-set; removing an absent pair is a no-op
    pub fn remove_reaction(&mut self, identity_id: Uuid, emoji: &str) -> bool {
        let before = self.reactions.len();
        self.reactions
            .retain(|r| !(r.identity_id == identity_id && r.emoji == emoji));
        self.reactions.len() != before
    }

    pub fn apply_edit(&mut self, content: impl Into<String>, at: DateTime<Utc>) {
        self.content = content.into();
        self.edited_at = Some(at);
    }

    /// Flag the message as deleted. The first deletion sticks.
    pub fn apply_soft_delete(&mut self, deleted_by: Uuid, at: DateTime<Utc>) -> bool {
        if self.is_deleted() {
            return false;
        }
        self.deleted_at = Some(at);
        self.deleted_by = Some(deleted_by);
        true
    }

    /// Outbound form: deleted messages never leak their content
    pub fn redacted(mut self) -> Self {
        if self.is_deleted() {
            self.content.clear();
            self.metadata = MessageMetadata::default();
        }
        self
    }

    pub fn preview(&self) -> ReplyPreview {
        let content = if self.is_deleted() {
            String::new()
        } else {
            self.content.chars().take(PREVIEW_CHARS).collect()
        };
        ReplyPreview {
            id: self.id,
            sender_id: self.sender_id,
            sender_name: self.sender_name.clone(),
            content,
        }
    }
}

/// Short form of a replied-to message carried with `new-message`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplyPreview {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub sender_name: String,
    pub content: String,
}

/// Everything needed to append a message, before the ledger assigns an id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageDraft {
    pub workspace_id: WorkspaceId,
    pub sender_id: Uuid,
    pub sender_name: String,
    pub content: String,
    pub kind: MessageKind,
    pub metadata: MessageMetadata,
    pub reply_to_id: Option<Uuid>,
    pub thread_id: Option<Uuid>,
    pub mentions: BTreeSet<Uuid>,
}

impl MessageDraft {
    /// Plain text draft with no reply, thread or mentions
    pub fn text(
        workspace_id: impl Into<WorkspaceId>,
        sender_id: Uuid,
        sender_name: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            workspace_id: workspace_id.into(),
            sender_id,
            sender_name: sender_name.into(),
            content: content.into(),
            kind: MessageKind::Text,
            metadata: MessageMetadata::default(),
            reply_to_id: None,
            thread_id: None,
            mentions: BTreeSet::new(),
        }
    }
}

/// Paging and filtering for history reads
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageQuery {
    #[serde(default)]
    pub limit: Option<usize>,
    #[serde(default)]
    pub before: Option<DateTime<Utc>>,
    #[serde(default)]
    pub after: Option<DateTime<Utc>>,
    #[serde(default, alias = "thread")]
    pub thread_id: Option<Uuid>,
}

impl MessageQuery {
    pub const DEFAULT_LIMIT: usize = 50;
    pub const MAX_LIMIT: usize = 200;

    /// Requested limit clamped to `1..=MAX_LIMIT`
    pub fn effective_limit(&self) -> usize {
        self.limit
            .unwrap_or(Self::DEFAULT_LIMIT)
            .clamp(1, Self::MAX_LIMIT)
    }

    /// Whether a message passes the time and thread filters
    pub fn matches(&self, message: &Message) -> bool {
        if self.before.is_some_and(|before| message.created_at >= before) {
            return false;
        }
        if self.after.is_some_and(|after| message.created_at <= after) {
            return false;
        }
        match self.thread_id {
            Some(thread) => message.thread_id == Some(thread),
            None => true,
        }
    }
}
