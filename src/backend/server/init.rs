/**
 * Server Initialization
 *
 * Builds the application state and the router.
 *
 * # Initialization Process
 *
 * 1. Open the database pool if `DATABASE_URL` is configured; failing to
 *    reach a configured database aborts startup
 * 2. Pick the ledger and membership adapters (PostgreSQL or in-memory)
 * 3. Apply the workspace seeds from the config file
 * 4. Create the coordinator and the router
 * 5. Start the typing sweeper
 */

use axum::Router;
use std::sync::Arc;

use crate::backend::auth::JwtIdentityVerifier;
use crate::backend::collab::{CollabDeps, Coordinator};
use crate::backend::ledger::{InMemoryLedger, MessageLedger, PgLedger};
use crate::backend::realtime::RoomRegistry;
use crate::backend::routes::router::create_router;
use crate::backend::server::config::{load_database, DatabaseError, ServerConfig, WorkspaceSeed};
use crate::backend::server::state::AppState;
use crate::backend::workspace::{InMemoryMembership, MembershipOracle, PgMembership};

/// Create the application state from a loaded configuration
pub async fn build_state(config: ServerConfig) -> Result<AppState, DatabaseError> {
    let db_pool = load_database(config.database_url.as_deref()).await?;

    let (ledger, membership): (Arc<dyn MessageLedger>, Arc<dyn MembershipOracle>) = match &db_pool {
        Some(pool) => {
            let membership = PgMembership::new(pool.clone());
            seed_database(&membership, &config.workspaces).await;
            (Arc::new(PgLedger::new(pool.clone())), Arc::new(membership))
        }
        None => {
            let membership = InMemoryMembership::new();
            seed_memory(&membership, &config.workspaces);
            (Arc::new(InMemoryLedger::new()), Arc::new(membership))
        }
    };

    let coordinator = Coordinator::new(
        CollabDeps {
            verifier: Arc::new(JwtIdentityVerifier::new(config.jwt_secret.clone())),
            membership,
            ledger,
            registry: Arc::new(RoomRegistry::new()),
        },
        config.collab.clone(),
    );

    Ok(AppState {
        coordinator: Arc::new(coordinator),
        config: Arc::new(config),
        db_pool,
    })
}

fn seed_memory(membership: &InMemoryMembership, seeds: &[WorkspaceSeed]) {
    for seed in seeds {
        for member in &seed.members {
            membership.grant(&seed.id, member.user, member.role);
        }
    }
    if !seeds.is_empty() {
        tracing::info!("[Server] Seeded {} workspaces in memory", seeds.len());
    }
}

async fn seed_database(membership: &PgMembership, seeds: &[WorkspaceSeed]) {
    for seed in seeds {
        for member in &seed.members {
            if let Err(e) = membership.grant(&seed.id, member.user, member.role).await {
                tracing::warn!(
                    "[Server] Failed to seed {} into {}: {}",
                    member.user,
                    seed.id,
                    e
                );
            }
        }
    }
}

/// Periodically expire typing indicators that were never stopped
pub fn spawn_typing_sweeper(coordinator: Arc<Coordinator>) -> tokio::task::JoinHandle<()> {
    let period = coordinator.settings().typing_sweep_interval();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            coordinator.sweep_typing();
        }
    })
}

/// Create and configure the Axum application
pub async fn create_app(config: ServerConfig) -> Result<Router<()>, DatabaseError> {
    tracing::info!("[Server] Initializing collaboration server");

    let app_state = build_state(config).await?;
    spawn_typing_sweeper(Arc::clone(&app_state.coordinator));

    let app = create_router(app_state);
    tracing::info!("[Server] Router configured with typing sweeper");
    Ok(app)
}
