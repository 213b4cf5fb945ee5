/**
 * API Route Handlers
 *
 * REST endpoints for workspace messages. Every route here requires a
 * bearer token; `create_router` wraps them in `auth_middleware`.
 *
 * # Routes
 *
 * ## Workspace
 * - `GET  /api/chat/workspace/{workspace_id}` - list messages (newest first)
 * - `POST /api/chat/workspace/{workspace_id}` - send a message
 * - `GET  /api/chat/workspace/{workspace_id}/unread` - unread count
 * - `GET  /api/chat/workspace/{workspace_id}/stats` - message statistics
 * - `GET  /api/chat/workspace/{workspace_id}/presence` - online identities
 *
 * ## Messages
 * - `GET    /api/chat/thread/{message_id}` - thread replies (oldest first)
 * - `GET    /api/chat/{message_id}` - fetch one message
 * - `PUT    /api/chat/{message_id}` - edit
 * - `DELETE /api/chat/{message_id}` - soft delete
 * - `POST   /api/chat/{message_id}/read` - mark read
 * - `POST   /api/chat/{message_id}/reactions` - add reaction
 * - `DELETE /api/chat/{message_id}/reactions/{emoji}` - remove reaction
 */

use axum::{
    routing::{get, post},
    Router,
};

use crate::backend::chat::handlers::{
    add_reaction, delete_message, edit_message, get_message, get_presence, get_thread,
    get_unread_count, get_workspace_stats, list_workspace_messages, mark_read,
    post_workspace_message, remove_reaction,
};
use crate::backend::server::state::AppState;

/// Configure the authenticated chat API routes
pub fn configure_api_routes(router: Router<AppState>) -> Router<AppState> {
    router
        .route(
            "/api/chat/workspace/{workspace_id}",
            get(list_workspace_messages).post(post_workspace_message),
        )
        .route("/api/chat/workspace/{workspace_id}/unread", get(get_unread_count))
        .route("/api/chat/workspace/{workspace_id}/stats", get(get_workspace_stats))
        .route("/api/chat/workspace/{workspace_id}/presence", get(get_presence))
        .route("/api/chat/thread/{message_id}", get(get_thread))
        .route(
            "/api/chat/{message_id}",
            get(get_message).put(edit_message).delete(delete_message),
        )
        .route("/api/chat/{message_id}/read", post(mark_read))
        .route("/api/chat/{message_id}/reactions", post(add_reaction))
        .route(
            "/api/chat/{message_id}/reactions/{emoji}",
            axum::routing::delete(remove_reaction),
        )
}
