/**
 * WebSocket Transport
 *
 * `GET /ws` upgrades to a WebSocket speaking the JSON event protocol.
 *
 * # Handshake
 *
 * The credential is read from the `token` query parameter or from an
 * `Authorization: Bearer` header. Verification happens before the upgrade;
 * a refused handshake gets a 401 JSON body and no session is created.
 *
 * # Connection lifecycle
 *
 * 1. Open a session and its outbox
 * 2. Spawn the writer task that drains the outbox onto the socket
 * 3. Auto-join every workspace the identity belongs to (`workspaces-joined`)
 * 4. Read frames one at a time, so a session's own commands apply in order
 * 5. On close or error, disconnect: leave all rooms, clear typing, drop outbox
 */

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    http::HeaderMap,
    response::{IntoResponse, Response},
};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use std::sync::Arc;

use super::coordinator::{Coordinator, OpenSession};
use crate::backend::middleware::auth::bearer_token;
use crate::shared::{Identity, ServerEvent};

#[derive(Debug, Default, Deserialize)]
pub struct SocketParams {
    #[serde(default)]
    pub token: Option<String>,
}

/// Handle WebSocket upgrade (GET /ws)
pub async fn handle_socket_upgrade(
    ws: WebSocketUpgrade,
    State(coordinator): State<Arc<Coordinator>>,
    Query(params): Query<SocketParams>,
    headers: HeaderMap,
) -> Response {
    let credential = params.token.as_deref().or_else(|| bearer_token(&headers));

    let identity = match coordinator.authenticate(credential).await {
        Ok(identity) => identity,
        Err(err) => {
            tracing::warn!("[Socket] Handshake refused: {}", err);
            return err.into_response();
        }
    };

    ws.on_upgrade(move |socket| run_connection(socket, coordinator, identity))
}

async fn run_connection(socket: WebSocket, coordinator: Arc<Coordinator>, identity: Identity) {
    let OpenSession { session, mut events } = coordinator.open_session(identity);
    let (mut sink, mut stream) = socket.split();

    let session_id = session.id();
    let writer = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            let text = match event.to_json() {
                Ok(text) => text,
                Err(e) => {
                    tracing::error!("[Socket] Failed to encode {}: {}", event.name(), e);
                    continue;
                }
            };
            if sink.send(Message::Text(text.into())).await.is_err() {
                tracing::debug!("[Socket] Writer for session {} lost its socket", session_id);
                break;
            }
        }
        let _ = sink.close().await;
    });

    let greeting = match coordinator.join_known_workspaces(&session).await {
        Ok(workspaces) => ServerEvent::WorkspacesJoined { workspaces },
        Err(err) => err.to_event(Some("join-workspaces")),
    };
    coordinator.deliver(&session, vec![greeting]);

    while let Some(frame) = stream.next().await {
        match frame {
            Ok(Message::Text(text)) => {
                let replies = coordinator.handle_frame(&session, text.as_str()).await;
                coordinator.deliver(&session, replies);
            }
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(e) => {
                tracing::debug!("[Socket] Read error on session {}: {}", session_id, e);
                break;
            }
        }
    }

    coordinator.disconnect(&session);
    if let Err(e) = writer.await {
        tracing::warn!("[Socket] Writer task for session {} failed: {}", session_id, e);
    }
}
