/**
 * Application State Management
 *
 * `AppState` is the central state container handed to every axum handler:
 * - the collaboration coordinator (rooms, sessions, ledger, oracle)
 * - the loaded server configuration
 * - the database pool, when one is configured
 *
 * The `FromRef` implementations let handlers extract just the part they
 * need, e.g. `State<Arc<Coordinator>>`.
 */

use axum::extract::FromRef;
use sqlx::PgPool;
use std::sync::Arc;

use crate::backend::collab::Coordinator;
use crate::backend::server::config::ServerConfig;

#[derive(Clone)]
pub struct AppState {
    pub coordinator: Arc<Coordinator>,
    pub config: Arc<ServerConfig>,
    pub db_pool: Option<PgPool>,
}

impl FromRef<AppState> for Arc<Coordinator> {
    fn from_ref(state: &AppState) -> Self {
        Arc::clone(&state.coordinator)
    }
}

impl FromRef<AppState> for Arc<ServerConfig> {
    fn from_ref(state: &AppState) -> Self {
        Arc::clone(&state.config)
    }
}
