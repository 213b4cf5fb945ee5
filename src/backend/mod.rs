//! Backend Module
//!
//! Server-side code for the workspace collaboration service: the axum
//! HTTP/WebSocket server, the room coordinator and its storage adapters.
//! Only compiled when the `ssr` feature is enabled.
//!
//! # Architecture
//!
//! - **`server`** - configuration, application state, initialization
//! - **`routes`** - router assembly and layers
//! - **`chat`** - REST handlers for workspace messages
//! - **`collab`** - sessions, the coordinator and the WebSocket endpoint
//! - **`realtime`** - room registry, broadcast bus, presence, typing
//! - **`ledger`** - message persistence (in-memory and PostgreSQL)
//! - **`workspace`** - membership oracle (in-memory and PostgreSQL)
//! - **`auth`** - JWT tokens and identity verification
//! - **`middleware`** - bearer-token middleware and extractor
//! - **`error`** - `BackendError` and its HTTP/event mappings
//!
//! ```text
//! backend/
//! ├── mod.rs
//! ├── main.rs         - collab-server binary
//! ├── server/
//! ├── routes/
//! ├── chat/
//! ├── collab/
//! ├── realtime/
//! ├── ledger/
//! ├── workspace/
//! ├── auth/
//! ├── middleware/
//! └── error/
//! ```
//!
//! # Thread Safety
//!
//! Room, outbox and typing tables sit behind `std::sync` locks that are
//! never held across an `.await`. Each room has an async sequencer that
//! orders a mutation's persistence and its fan-out.

/// Server setup and configuration
pub mod server;

/// Route configuration
pub mod routes;

/// REST handlers for workspace messages
pub mod chat;

/// Workspace collaboration over WebSockets
pub mod collab;

/// Rooms, fan-out, presence and typing
pub mod realtime;

/// Message persistence
pub mod ledger;

/// Workspace membership
pub mod workspace;

/// Backend error types
pub mod error;

/// Token issuing and identity verification
pub mod auth;

/// Middleware for request processing
pub mod middleware;

pub use server::{create_app, AppState, ServerConfig};
pub use collab::Coordinator;
pub use error::BackendError;
