/**
 * Real-time Event Protocol
 *
 * This module defines the closed set of commands a client may send over
 * the WebSocket and the events the server pushes back. Both directions use
 * adjacently tagged JSON frames:
 *
 * ```json
 * {"event": "send-message", "data": {"workspaceId": "w1", "content": "hi"}}
 * ```
 *
 * Event names are kebab-case and payload fields camelCase. Unknown event
 * names and malformed payloads are rejected at decode time, before any
 * collaboration state is touched.
 */
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

use crate::shared::config::CollabSettings;
use crate::shared::error::SharedError;
use crate::shared::message::{Message, MessageKind, MessageMetadata, ReplyPreview, WorkspaceId};

/// Payload of `send-message`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessagePayload {
    pub workspace_id: WorkspaceId,
    pub content: String,
    #[serde(default)]
    pub kind: MessageKind,
    #[serde(default)]
    pub reply_to_id: Option<Uuid>,
    #[serde(default)]
    pub thread_id: Option<Uuid>,
    #[serde(default)]
    pub mentions: BTreeSet<Uuid>,
    #[serde(default)]
    pub metadata: MessageMetadata,
}

impl SendMessagePayload {
    pub fn text(workspace_id: impl Into<WorkspaceId>, content: impl Into<String>) -> Self {
        Self {
            workspace_id: workspace_id.into(),
            content: content.into(),
            kind: MessageKind::Text,
            reply_to_id: None,
            thread_id: None,
            mentions: BTreeSet::new(),
            metadata: MessageMetadata::default(),
        }
    }
}

/// Commands accepted from a connected client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    tag = "event",
    content = "data",
    rename_all = "kebab-case",
    rename_all_fields = "camelCase"
)]
pub enum ClientCommand {
    JoinWorkspace { workspace_id: WorkspaceId },
    JoinWorkspaces,
    LeaveWorkspace { workspace_id: WorkspaceId },
    SendMessage(SendMessagePayload),
    EditMessage { message_id: Uuid, content: String },
    DeleteMessage { message_id: Uuid },
    TypingStart { workspace_id: WorkspaceId },
    TypingStop { workspace_id: WorkspaceId },
    MarkRead { message_id: Uuid },
    AddReaction { message_id: Uuid, emoji: String },
    RemoveReaction { message_id: Uuid, emoji: String },
}

impl ClientCommand {
    /// Decode one text frame
    pub fn parse(frame: &str) -> Result<Self, SharedError> {
        Ok(serde_json::from_str(frame)?)
    }

    /// Wire name, echoed back as `action` on error events
    pub fn name(&self) -> &'static str {
        match self {
            Self::JoinWorkspace { .. } => "join-workspace",
            Self::JoinWorkspaces => "join-workspaces",
            Self::LeaveWorkspace { .. } => "leave-workspace",
            Self::SendMessage(_) => "send-message",
            Self::EditMessage { .. } => "edit-message",
            Self::DeleteMessage { .. } => "delete-message",
            Self::TypingStart { .. } => "typing-start",
            Self::TypingStop { .. } => "typing-stop",
            Self::MarkRead { .. } => "mark-read",
            Self::AddReaction { .. } => "add-reaction",
            Self::RemoveReaction { .. } => "remove-reaction",
        }
    }

    /// Field-level checks that do not need any server state
    pub fn validate(&self, settings: &CollabSettings) -> Result<(), SharedError> {
        match self {
            Self::JoinWorkspace { workspace_id }
            | Self::LeaveWorkspace { workspace_id }
            | Self::TypingStart { workspace_id }
            | Self::TypingStop { workspace_id } => validate_workspace_id(workspace_id),
            Self::SendMessage(payload) => {
                validate_workspace_id(&payload.workspace_id)?;
                normalize_content(&payload.content, settings.max_message_len).map(|_| ())
            }
            Self::EditMessage { content, .. } => {
                normalize_content(content, settings.max_message_len).map(|_| ())
            }
            Self::AddReaction { emoji, .. } | Self::RemoveReaction { emoji, .. } => {
                validate_emoji(emoji, settings.max_emoji_len)
            }
            Self::JoinWorkspaces | Self::DeleteMessage { .. } | Self::MarkRead { .. } => Ok(()),
        }
    }
}

pub fn validate_workspace_id(workspace_id: &WorkspaceId) -> Result<(), SharedError> {
    if workspace_id.is_blank() {
        return Err(SharedError::validation("workspaceId", "Workspace id cannot be empty"));
    }
    Ok(())
}

/// Trim message content and enforce the length bounds
pub fn normalize_content(content: &str, max_len: usize) -> Result<String, SharedError> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(SharedError::validation("content", "Message content cannot be empty"));
    }
    if trimmed.chars().count() > max_len {
        return Err(SharedError::validation(
            "content",
            format!("Message content exceeds {max_len} characters"),
        ));
    }
    Ok(trimmed.to_string())
}

pub fn validate_emoji(emoji: &str, max_len: usize) -> Result<(), SharedError> {
    if emoji.trim().is_empty() {
        return Err(SharedError::validation("emoji", "Emoji cannot be empty"));
    }
    if emoji.chars().count() > max_len {
        return Err(SharedError::validation(
            "emoji",
            format!("Emoji exceeds {max_len} characters"),
        ));
    }
    Ok(())
}

/// Error category carried by `error` events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorKind {
    Unauthenticated,
    Forbidden,
    NotFound,
    PersistFailed,
    InvalidPayload,
    Unavailable,
}

/// Events pushed to connected clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    tag = "event",
    content = "data",
    rename_all = "kebab-case",
    rename_all_fields = "camelCase"
)]
pub enum ServerEvent {
    WorkspaceJoined {
        workspace_id: WorkspaceId,
    },
    WorkspacesJoined {
        workspaces: Vec<WorkspaceId>,
    },
    WorkspaceLeft {
        workspace_id: WorkspaceId,
    },
    PresenceSnapshot {
        workspace_id: WorkspaceId,
        online: Vec<Uuid>,
    },
    NewMessage {
        message: Message,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reply_to: Option<ReplyPreview>,
    },
    MessageUpdated {
        message: Message,
    },
    MessageDeleted {
        message: Message,
    },
    UserTyping {
        identity_id: Uuid,
        display_name: String,
        workspace_id: WorkspaceId,
    },
    UserStoppedTyping {
        identity_id: Uuid,
        workspace_id: WorkspaceId,
    },
    MessageRead {
        message_id: Uuid,
        workspace_id: WorkspaceId,
        identity_id: Uuid,
        read_at: DateTime<Utc>,
    },
    ReactionAdded {
        message_id: Uuid,
        workspace_id: WorkspaceId,
        identity_id: Uuid,
        emoji: String,
    },
    ReactionRemoved {
        message_id: Uuid,
        workspace_id: WorkspaceId,
        identity_id: Uuid,
        emoji: String,
    },
    UserOnline {
        identity_id: Uuid,
        display_name: String,
        workspace_id: WorkspaceId,
    },
    UserOffline {
        identity_id: Uuid,
        workspace_id: WorkspaceId,
    },
    Error {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        action: Option<String>,
        kind: ErrorKind,
        message: String,
    },
}

impl ServerEvent {
    pub fn error(action: Option<&str>, kind: ErrorKind, message: impl Into<String>) -> Self {
        Self::Error {
            action: action.map(str::to_string),
            kind,
            message: message.into(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::WorkspaceJoined { .. } => "workspace-joined",
            Self::WorkspacesJoined { .. } => "workspaces-joined",
            Self::WorkspaceLeft { .. } => "workspace-left",
            Self::PresenceSnapshot { .. } => "presence-snapshot",
            Self::NewMessage { .. } => "new-message",
            Self::MessageUpdated { .. } => "message-updated",
            Self::MessageDeleted { .. } => "message-deleted",
            Self::UserTyping { .. } => "user-typing",
            Self::UserStoppedTyping { .. } => "user-stopped-typing",
            Self::MessageRead { .. } => "message-read",
            Self::ReactionAdded { .. } => "reaction-added",
            Self::ReactionRemoved { .. } => "reaction-removed",
            Self::UserOnline { .. } => "user-online",
            Self::UserOffline { .. } => "user-offline",
            Self::Error { .. } => "error",
        }
    }

    pub fn to_json(&self) -> Result<String, SharedError> {
        Ok(serde_json::to_string(self)?)
    }
}
