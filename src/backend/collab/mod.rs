//! Workspace Collaboration Module
//!
//! Server-side real-time collaboration for workspace rooms.
//!
//! - **`session`** - per-connection state (identity, joined rooms)
//! - **`coordinator`** - gatekeeping, rooms, messages, reactions, read
//!   receipts, typing and the socket command dispatcher
//! - **`socket`** - the axum WebSocket endpoint (`GET /ws`)
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use nextgen_collab::backend::auth::JwtIdentityVerifier;
//! use nextgen_collab::backend::collab::{CollabDeps, Coordinator};
//! use nextgen_collab::backend::ledger::InMemoryLedger;
//! use nextgen_collab::backend::realtime::RoomRegistry;
//! use nextgen_collab::backend::workspace::InMemoryMembership;
//! use nextgen_collab::shared::CollabSettings;
//!
//! let coordinator = Coordinator::new(
//!     CollabDeps {
//!         verifier: Arc::new(JwtIdentityVerifier::new("secret")),
//!         membership: Arc::new(InMemoryMembership::new()),
//!         ledger: Arc::new(InMemoryLedger::new()),
//!         registry: Arc::new(RoomRegistry::new()),
//!     },
//!     CollabSettings::default(),
//! );
//! ```

pub mod session;
pub mod coordinator;
pub mod socket;

pub use session::ConnectionSession;
pub use coordinator::{CollabDeps, Coordinator, JoinOutcome, OpenSession, Origin, WorkspaceStats};
pub use socket::handle_socket_upgrade;
