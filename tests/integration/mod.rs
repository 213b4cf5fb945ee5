//! Integration tests
//!
//! - **`collab_test`** - rooms, messages, reactions, receipts, authorization
//! - **`realtime_test`** - presence and typing across sessions
//! - **`api_test`** - the REST surface through the axum router
//! - **`database_test`** - the PostgreSQL adapters, when `DATABASE_URL` is set
//! - **`socket_test`** - the WebSocket endpoint over a real connection

mod api_test;
mod database_test;
mod socket_test;
