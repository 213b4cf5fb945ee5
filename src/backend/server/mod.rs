//! Server Module
//!
//! Everything needed to stand up the HTTP/WebSocket server.
//!
//! - **`state`** - `AppState` and its `FromRef` implementations
//! - **`config`** - TOML and environment configuration, database pool
//! - **`init`** - adapter selection, coordinator creation, background tasks
//!
//! ```text
//! server/
//! ├── mod.rs
//! ├── state.rs
//! ├── config.rs
//! └── init.rs
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use nextgen_collab::backend::server::{create_app, ServerConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ServerConfig::load()?;
//! let app = create_app(config).await?;
//! # Ok(())
//! # }
//! ```

/// Application state management
pub mod state;

/// Server configuration loading
pub mod config;

/// Server initialization
pub mod init;

pub use state::AppState;
pub use config::{DatabaseError, ServerConfig, WorkspaceSeed};
pub use init::{build_state, create_app};
