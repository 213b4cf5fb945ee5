//! NextGen Collab - workspace real-time collaboration server
//!
//! Members of a workspace share a room: they see who is online and who is
//! typing, exchange messages, react to them, mark them read, and edit or
//! delete their own. Every change is persisted before it is broadcast to
//! the room.
//!
//! # Module Structure
//!
//! - **`shared`** - types shared with clients
//!   - Message model, WebSocket event protocol
//!   - Payload validation errors, collaboration settings
//!
//! - **`backend`** - server-side code (only compiled with `ssr` feature)
//!   - Axum server with the `/ws` endpoint and the `/api/chat` REST API
//!   - Room registry, broadcast bus, presence and typing trackers
//!   - Message ledger and membership oracle (in-memory or PostgreSQL)
//!
//! # Feature Flags
//!
//! - **`ssr`** (default) - the server runtime: axum, sqlx, jsonwebtoken
//!
//! # Usage
//!
//! ```rust,no_run
//! use nextgen_collab::backend::server::{create_app, ServerConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let app = create_app(ServerConfig::load()?).await?;
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:3001").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Protocol
//!
//! Clients speak JSON text frames of the form
//! `{"event": "send-message", "data": {...}}`; see `shared::event` for the
//! full command and event catalogue.

/// Shared types and data structures
pub mod shared;

/// Backend server-side code
#[cfg(feature = "ssr")]
pub mod backend;
