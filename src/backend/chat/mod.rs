//! Chat Backend Module
//!
//! REST access to workspace messages, the HTTP counterpart of the socket
//! protocol served by `backend::collab`.
//!
//! - **`handlers`** - axum handlers for `/api/chat/...`

/// REST handlers for workspace messages
pub mod handlers;

pub use handlers::{
    add_reaction, delete_message, edit_message, get_message, get_presence, get_thread,
    get_unread_count, get_workspace_stats, list_workspace_messages, mark_read,
    post_workspace_message, remove_reaction,
};
