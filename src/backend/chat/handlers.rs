//! Chat REST Handlers
//!
//! HTTP counterparts of the socket commands, mounted under `/api/chat`.
//! Every handler runs behind `auth_middleware` and goes through the same
//! coordinator operations as the socket, so a REST mutation is persisted and
//! broadcast to the room exactly like one sent over a live connection.

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;
use uuid::Uuid;

use crate::backend::collab::{Coordinator, Origin, WorkspaceStats};
use crate::backend::error::BackendError;
use crate::backend::middleware::AuthUser;
use crate::shared::message::{MessageMetadata, ReadReceipt};
use crate::shared::{Message, MessageKind, MessageQuery, SendMessagePayload, SharedError, WorkspaceId};

/// Body of `POST /api/chat/workspace/{ws}`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMessageBody {
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

#[derive(Debug, Deserialize)]
pub struct EditBody {
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct ReactionBody {
    pub emoji: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ThreadQuery {
    #[serde(default)]
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnreadResponse {
    pub unread_count: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PresenceResponse {
    pub workspace_id: WorkspaceId,
    pub online: Vec<Uuid>,
}

/// Turn axum's body rejection into our JSON error shape
fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, BackendError> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| SharedError::malformed(rejection.body_text()).into())
}

/// GET /api/chat/workspace/{ws}
pub async fn list_workspace_messages(
    State(coordinator): State<Arc<Coordinator>>,
    AuthUser(identity): AuthUser,
    Path(workspace_id): Path<WorkspaceId>,
    Query(query): Query<MessageQuery>,
) -> Result<Json<Vec<Message>>, BackendError> {
    let messages = coordinator
        .list_messages(&identity, &workspace_id, &query)
        .await?;
    Ok(Json(messages))
}

/// POST /api/chat/workspace/{ws}
pub async fn post_workspace_message(
    State(coordinator): State<Arc<Coordinator>>,
    AuthUser(identity): AuthUser,
    Path(workspace_id): Path<WorkspaceId>,
    payload: Result<Json<NewMessageBody>, JsonRejection>,
) -> Result<(StatusCode, Json<Message>), BackendError> {
    let body = body(payload)?;
    let payload = SendMessagePayload {
        workspace_id,
        content: body.content,
        kind: body.kind,
        reply_to_id: body.reply_to_id,
        thread_id: body.thread_id,
        mentions: body.mentions,
        metadata: body.metadata,
    };

    let message = coordinator.send_message(Origin::Api(&identity), payload).await?;
    Ok((StatusCode::CREATED, Json(message)))
}

/// GET /api/chat/workspace/{ws}/unread
pub async fn get_unread_count(
    State(coordinator): State<Arc<Coordinator>>,
    AuthUser(identity): AuthUser,
    Path(workspace_id): Path<WorkspaceId>,
) -> Result<Json<UnreadResponse>, BackendError> {
    let unread_count = coordinator.unread_count(&identity, &workspace_id).await?;
    Ok(Json(UnreadResponse { unread_count }))
}

/// GET /api/chat/workspace/{ws}/stats
pub async fn get_workspace_stats(
    State(coordinator): State<Arc<Coordinator>>,
    AuthUser(identity): AuthUser,
    Path(workspace_id): Path<WorkspaceId>,
) -> Result<Json<WorkspaceStats>, BackendError> {
    Ok(Json(coordinator.stats(&identity, &workspace_id).await?))
}

/// GET /api/chat/workspace/{ws}/presence
pub async fn get_presence(
    State(coordinator): State<Arc<Coordinator>>,
    AuthUser(identity): AuthUser,
    Path(workspace_id): Path<WorkspaceId>,
) -> Result<Json<PresenceResponse>, BackendError> {
    let online = coordinator.presence(&identity, &workspace_id).await?;
    Ok(Json(PresenceResponse { workspace_id, online }))
}

/// GET /api/chat/thread/{id}
pub async fn get_thread(
    State(coordinator): State<Arc<Coordinator>>,
    AuthUser(identity): AuthUser,
    Path(thread_id): Path<Uuid>,
    Query(query): Query<ThreadQuery>,
) -> Result<Json<Vec<Message>>, BackendError> {
    let replies = coordinator.thread(&identity, thread_id, query.limit).await?;
    Ok(Json(replies))
}

/// GET /api/chat/{id}
pub async fn get_message(
    State(coordinator): State<Arc<Coordinator>>,
    AuthUser(identity): AuthUser,
    Path(message_id): Path<Uuid>,
) -> Result<Json<Message>, BackendError> {
    Ok(Json(coordinator.get_message(&identity, message_id).await?))
}

/// PUT /api/chat/{id}
pub async fn edit_message(
    State(coordinator): State<Arc<Coordinator>>,
    AuthUser(identity): AuthUser,
    Path(message_id): Path<Uuid>,
    payload: Result<Json<EditBody>, JsonRejection>,
) -> Result<Json<Message>, BackendError> {
    let EditBody { content } = body(payload)?;
    let message = coordinator
        .edit_message(Origin::Api(&identity), message_id, &content)
        .await?;
    Ok(Json(message))
}

/// DELETE /api/chat/{id}
///
/// Responds with the redacted message; repeating the call is harmless.
pub async fn delete_message(
    State(coordinator): State<Arc<Coordinator>>,
    AuthUser(identity): AuthUser,
    Path(message_id): Path<Uuid>,
) -> Result<Json<Message>, BackendError> {
    let message = coordinator
        .delete_message(Origin::Api(&identity), message_id)
        .await?;
    Ok(Json(message))
}

/// POST /api/chat/{id}/read
pub async fn mark_read(
    State(coordinator): State<Arc<Coordinator>>,
    AuthUser(identity): AuthUser,
    Path(message_id): Path<Uuid>,
) -> Result<Json<ReadReceipt>, BackendError> {
    let receipt = coordinator.mark_read(Origin::Api(&identity), message_id).await?;
    Ok(Json(receipt))
}

/// POST /api/chat/{id}/reactions
pub async fn add_reaction(
    State(coordinator): State<Arc<Coordinator>>,
    AuthUser(identity): AuthUser,
    Path(message_id): Path<Uuid>,
    payload: Result<Json<ReactionBody>, JsonRejection>,
) -> Result<Json<Message>, BackendError> {
    let ReactionBody { emoji } = body(payload)?;
    let message = coordinator
        .add_reaction(Origin::Api(&identity), message_id, &emoji)
        .await?;
    Ok(Json(message))
}

/// DELETE /api/chat/{id}/reactions/{emoji}
pub async fn remove_reaction(
    State(coordinator): State<Arc<Coordinator>>,
    AuthUser(identity): AuthUser,
    Path((message_id, emoji)): Path<(Uuid, String)>,
) -> Result<Json<Message>, BackendError> {
    let message = coordinator
        .remove_reaction(Origin::Api(&identity), message_id, &emoji)
        .await?;
    Ok(Json(message))
}
