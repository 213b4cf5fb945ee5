//! Route Configuration Module
//!
//! - **`router`** - main router: health, WebSocket endpoint, layers
//! - **`api_routes`** - authenticated REST endpoints under `/api/chat`
//!
//! ```text
//! routes/
//! ├── mod.rs
//! ├── router.rs
//! └── api_routes.rs
//! ```

/// Main router creation
pub mod router;

/// API endpoint handlers
pub mod api_routes;

pub use router::create_router;
