//! REST API integration tests
//!
//! Requests go through the full router (auth middleware included) with
//! `tower::ServiceExt::oneshot`.

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tower::ServiceExt;

use nextgen_collab::backend::collab::Origin;
use nextgen_collab::backend::workspace::WorkspaceRole;
use nextgen_collab::shared::{Identity, SendMessagePayload, ServerEvent, WorkspaceId};

use crate::common::{auth_header, drain, new_messages, token_for, TestHarness};

async fn call(app: &Router, method: Method, uri: &str, who: Option<&Identity>, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(identity) = who {
        builder = builder.header(header::AUTHORIZATION, auth_header(&token_for(identity)));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

#[tokio::test]
async fn test_health_is_public() {
    let harness = TestHarness::new();
    let (status, body) = call(&harness.app(), Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok" }));
}

#[tokio::test]
async fn test_missing_or_bad_token_is_unauthorized() {
    let harness = TestHarness::new();
    let app = harness.app();

    let (status, body) = call(&app, Method::GET, "/api/chat/workspace/proj-42", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["kind"], "unauthenticated");

    let request = Request::builder()
        .uri("/api/chat/workspace/proj-42")
        .header(header::AUTHORIZATION, "Bearer not-a-token")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_post_message_is_broadcast_to_live_sessions() {
    let harness = TestHarness::new();
    let ws = WorkspaceId::new("proj-42");
    let alice = harness.member("Alice", &ws, WorkspaceRole::Member);
    let bob = harness.member("Bob", &ws, WorkspaceRole::Member);
    let mut live = harness.connect_joined(&bob, &ws).await;

    let (status, body) = call(
        &harness.app(),
        Method::POST,
        "/api/chat/workspace/proj-42",
        Some(&alice),
        Some(json!({ "content": "  from the web  " })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["content"], "from the web");
    assert_eq!(body["senderId"], alice.id.to_string());

    let events = drain(&mut live.events);
    let received = new_messages(&events);
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].id.to_string(), body["id"].as_str().unwrap());
}

#[tokio::test]
async fn test_list_requires_membership_and_hides_deleted() {
    let harness = TestHarness::new();
    let ws = WorkspaceId::new("proj-42");
    let alice = harness.member("Alice", &ws, WorkspaceRole::Member);
    let outsider = harness.outsider("Mallory");

    let mut ids = Vec::new();
    for content in ["one", "two", "three"] {
        let message = harness
            .coordinator
            .send_message(Origin::Api(&alice), SendMessagePayload::text(ws.clone(), content))
            .await
            .unwrap();
        ids.push(message.id);
    }
    harness
        .coordinator
        .delete_message(Origin::Api(&alice), ids[1])
        .await
        .unwrap();

    let app = harness.app();
    let (status, body) = call(&app, Method::GET, "/api/chat/workspace/proj-42", Some(&alice), None).await;
    assert_eq!(status, StatusCode::OK);
    let contents: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["content"].as_str().unwrap())
        .collect();
    assert_eq!(contents, vec!["three", "one"]);

    let (status, _) = call(&app, Method::GET, "/api/chat/workspace/proj-42?limit=1", Some(&alice), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = call(&app, Method::GET, "/api/chat/workspace/proj-42", Some(&outsider), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["kind"], "forbidden");
}

#[tokio::test]
async fn test_edit_delete_and_fetch_by_id() {
    let harness = TestHarness::new();
    let ws = WorkspaceId::new("proj-42");
    let alice = harness.member("Alice", &ws, WorkspaceRole::Member);
    let bob = harness.member("Bob", &ws, WorkspaceRole::Member);
    let message = harness
        .coordinator
        .send_message(Origin::Api(&alice), SendMessagePayload::text(ws.clone(), "draft"))
        .await
        .unwrap();
    let app = harness.app();
    let uri = format!("/api/chat/{}", message.id);

    let (status, _) = call(&app, Method::PUT, &uri, Some(&bob), Some(json!({ "content": "mine now" }))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = call(&app, Method::PUT, &uri, Some(&alice), Some(json!({ "content": "final" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["content"], "final");
    assert!(body["editedAt"].is_string());

    let (status, body) = call(&app, Method::PUT, &uri, Some(&alice), Some(json!({ "text": "wrong field" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "invalid-payload");

    let (status, body) = call(&app, Method::DELETE, &uri, Some(&alice), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["content"], "");
    assert!(body["deletedAt"].is_string());

    let (status, body) = call(&app, Method::GET, &uri, Some(&bob), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["content"], "");

    let missing = format!("/api/chat/{}", uuid::Uuid::new_v4());
    let (status, body) = call(&app, Method::GET, &missing, Some(&bob), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["kind"], "not-found");
}

#[tokio::test]
async fn test_reactions_reads_and_counters() {
    let harness = TestHarness::new();
    let ws = WorkspaceId::new("proj-42");
    let alice = harness.member("Alice", &ws, WorkspaceRole::Member);
    let bob = harness.member("Bob", &ws, WorkspaceRole::Member);
    let message = harness
        .coordinator
        .send_message(Origin::Api(&alice), SendMessagePayload::text(ws.clone(), "lunch?"))
        .await
        .unwrap();
    let app = harness.app();

    let (status, body) = call(&app, Method::GET, "/api/chat/workspace/proj-42/unread", Some(&bob), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "unreadCount": 1 }));

    let reactions = format!("/api/chat/{}/reactions", message.id);
    for _ in 0..2 {
        let (status, body) = call(&app, Method::POST, &reactions, Some(&bob), Some(json!({ "emoji": "👍" }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["reactions"].as_array().unwrap().len(), 1);
    }

    // 👍 percent-encoded
    let remove = format!("/api/chat/{}/reactions/%F0%9F%91%8D", message.id);
    let (status, body) = call(&app, Method::DELETE, &remove, Some(&bob), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["reactions"].as_array().unwrap().is_empty());

    let read = format!("/api/chat/{}/read", message.id);
    let (status, body) = call(&app, Method::POST, &read, Some(&bob), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["identityId"], bob.id.to_string());

    let (_, body) = call(&app, Method::GET, "/api/chat/workspace/proj-42/unread", Some(&bob), None).await;
    assert_eq!(body, json!({ "unreadCount": 0 }));

    let (status, body) = call(&app, Method::GET, "/api/chat/workspace/proj-42/stats", Some(&alice), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalMessages"], 1);
    assert_eq!(body["todayMessages"], 1);
    assert_eq!(body["unreadCount"], 0);
}

#[tokio::test]
async fn test_presence_and_threads() {
    let harness = TestHarness::new();
    let ws = WorkspaceId::new("proj-42");
    let alice = harness.member("Alice", &ws, WorkspaceRole::Member);
    let bob = harness.member("Bob", &ws, WorkspaceRole::Member);
    let mut live = harness.connect_joined(&bob, &ws).await;
    let app = harness.app();

    let (status, body) = call(&app, Method::GET, "/api/chat/workspace/proj-42/presence", Some(&alice), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "workspaceId": "proj-42", "online": [bob.id.to_string()] }));

    let root = harness
        .coordinator
        .send_message(Origin::Api(&alice), SendMessagePayload::text(ws.clone(), "topic"))
        .await
        .unwrap();
    let thread_uri = format!("/api/chat/thread/{}", root.id);

    let (status, _) = call(&app, Method::GET, &thread_uri, Some(&alice), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = call(
        &app,
        Method::POST,
        "/api/chat/workspace/proj-42",
        Some(&bob),
        Some(json!({ "content": "reply", "threadId": root.id })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = call(&app, Method::GET, &thread_uri, Some(&alice), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["threadId"], root.id.to_string());

    let events = drain(&mut live.events);
    assert_event_count!(events, ServerEvent::NewMessage { .. }, 2);
}
