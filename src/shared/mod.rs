//! Shared Module
//!
//! Types shared by every surface of the collaboration service: the message
//! model, the WebSocket event protocol, payload errors and tunables. None of
//! these depend on the server runtime, so they compile without the `ssr`
//! feature and can be reused by clients.

/// Message data structure
pub mod message;

/// Real-time event protocol
pub mod event;

/// Shared error types
pub mod error;

/// Authenticated principal
pub mod identity;

/// Collaboration configuration
pub mod config;

/// Re-export commonly used types for convenience
pub use message::{Message, MessageDraft, MessageKind, MessageQuery, WorkspaceId};
pub use event::{ClientCommand, ErrorKind, SendMessagePayload, ServerEvent};
pub use error::SharedError;
pub use identity::Identity;
pub use config::{CollabSettings, CollabSettingsBuilder, ConfigError};
