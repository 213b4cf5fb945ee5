//! WebSocket transport tests
//!
//! Serves the full router on an ephemeral port and talks to it with a real
//! WebSocket client.

use futures_util::{SinkExt, StreamExt};
use pretty_assertions::assert_eq;
use std::net::SocketAddr;
use tokio::net::{TcpListener, TcpStream};
use tokio::time::{timeout, Duration};
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use nextgen_collab::backend::workspace::WorkspaceRole;
use nextgen_collab::shared::{ClientCommand, Identity, SendMessagePayload, ServerEvent, WorkspaceId};

use crate::common::{drain, token_for, TestHarness};

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

const WAIT: Duration = Duration::from_secs(5);

async fn serve(harness: &TestHarness) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = harness.app();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

async fn open(addr: SocketAddr, identity: &Identity) -> Client {
    let url = format!("ws://{addr}/ws?token={}", token_for(identity));
    let (client, _) = connect_async(url).await.expect("handshake should be accepted");
    client
}

/// Next server event, skipping control frames
async fn next_event(client: &mut Client) -> ServerEvent {
    loop {
        let frame = timeout(WAIT, client.next())
            .await
            .expect("timed out waiting for a frame")
            .expect("socket closed")
            .expect("socket error");
        if let Message::Text(text) = frame {
            return serde_json::from_str(text.as_str()).expect("server frames are events");
        }
    }
}

async fn send(client: &mut Client, command: &ClientCommand) {
    let text = serde_json::to_string(command).unwrap();
    client.send(Message::Text(text.into())).await.unwrap();
}

/// Poll until `check` holds; the server side runs on other tasks
async fn eventually<F: Fn() -> bool>(check: F) {
    timeout(WAIT, async {
        while !check() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("condition not reached in time");
}

#[tokio::test]
async fn test_bad_credentials_refused_before_upgrade() {
    let harness = TestHarness::new();
    let addr = serve(&harness).await;

    for url in [format!("ws://{addr}/ws"), format!("ws://{addr}/ws?token=not-a-token")] {
        match connect_async(url).await {
            Err(tungstenite::Error::Http(response)) => assert_eq!(response.status().as_u16(), 401),
            Err(other) => panic!("expected an HTTP refusal, got {other}"),
            Ok(_) => panic!("handshake should have been refused"),
        }
    }
    assert_eq!(harness.coordinator.session_count(), 0);
}

#[tokio::test]
async fn test_connect_greets_with_joined_workspaces() {
    let harness = TestHarness::new();
    let ws = WorkspaceId::new("proj-42");
    let alice = harness.member("Alice", &ws, WorkspaceRole::Member);
    let addr = serve(&harness).await;

    let mut client = open(addr, &alice).await;

    assert_eq!(
        next_event(&mut client).await,
        ServerEvent::WorkspacesJoined {
            workspaces: vec![ws.clone()]
        }
    );
    assert_eq!(harness.coordinator.registry().room_size(&ws), 1);

    send(&mut client, &ClientCommand::SendMessage(SendMessagePayload::text(ws.clone(), "over the wire"))).await;
    match next_event(&mut client).await {
        ServerEvent::NewMessage { message, .. } => {
            assert_eq!(message.content, "over the wire");
            assert_eq!(message.sender_id, alice.id);
        }
        other => panic!("expected new-message, got {other:?}"),
    }

    client.send(Message::Text("{\"event\":\"no-such-event\"}".into())).await.unwrap();
    assert_matches::assert_matches!(next_event(&mut client).await, ServerEvent::Error { .. });
}

#[tokio::test]
async fn test_closing_socket_disconnects_session() {
    let harness = TestHarness::new();
    let ws = WorkspaceId::new("proj-42");
    let alice = harness.member("Alice", &ws, WorkspaceRole::Member);
    let bob = harness.member("Bob", &ws, WorkspaceRole::Member);
    let mut watcher = harness.connect_joined(&bob, &ws).await;
    let addr = serve(&harness).await;

    let mut client = open(addr, &alice).await;
    next_event(&mut client).await;
    assert_eq!(harness.coordinator.session_count(), 2);

    client.close(None).await.unwrap();
    let coordinator = &harness.coordinator;
    eventually(|| coordinator.session_count() == 1).await;

    assert_eq!(
        drain(&mut watcher.events),
        vec![
            ServerEvent::UserOnline {
                identity_id: alice.id,
                display_name: "Alice".to_string(),
                workspace_id: ws.clone(),
            },
            ServerEvent::UserOffline {
                identity_id: alice.id,
                workspace_id: ws.clone(),
            },
        ]
    );
    assert!(!coordinator.registry().is_online(&ws, alice.id));
}

#[tokio::test]
async fn test_dropped_connection_disconnects_session() {
    let harness = TestHarness::new();
    let ws = WorkspaceId::new("proj-42");
    let alice = harness.member("Alice", &ws, WorkspaceRole::Member);
    let addr = serve(&harness).await;

    let mut client = open(addr, &alice).await;
    next_event(&mut client).await;
    drop(client);

    let coordinator = &harness.coordinator;
    eventually(|| coordinator.session_count() == 0).await;
    assert_eq!(coordinator.registry().room_size(&ws), 0);
}
