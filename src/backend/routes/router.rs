/**
 * Router Configuration
 *
 * Combines all routes into a single Axum router.
 *
 * # Routes
 *
 * 1. `GET /health` - liveness probe (public)
 * 2. `GET /ws` - WebSocket upgrade; authenticates during the handshake
 * 3. `/api/chat/...` - REST API behind `auth_middleware`
 *
 * HTTP requests are traced with `TraceLayer`. CORS allows the configured
 * `CLIENT_URL`, or any origin when none is set.
 */

use axum::{
    http::{header, HeaderValue, Method},
    middleware::from_fn_with_state,
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::backend::collab::handle_socket_upgrade;
use crate::backend::middleware::auth_middleware;
use crate::backend::routes::api_routes::configure_api_routes;
use crate::backend::server::state::AppState;

/// Create the Axum router with all routes configured
pub fn create_router(app_state: AppState) -> Router<()> {
    let api = configure_api_routes(Router::new())
        .route_layer(from_fn_with_state(app_state.clone(), auth_middleware));

    let cors = cors_layer(app_state.config.client_url.as_deref());

    Router::new()
        .route("/health", get(health))
        .route("/ws", get(handle_socket_upgrade))
        .merge(api)
        .fallback(|| async { (axum::http::StatusCode::NOT_FOUND, "404 Not Found") })
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

fn cors_layer(client_url: Option<&str>) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    match client_url.map(str::parse::<HeaderValue>) {
        Some(Ok(origin)) => layer.allow_origin(origin),
        Some(Err(_)) => {
            tracing::warn!("[Server] CLIENT_URL is not a valid origin; allowing any origin");
            layer.allow_origin(Any)
        }
        None => layer.allow_origin(Any),
    }
}
