//! HTTP API
//!
//! Axum routers and handlers, one module per resource.

pub mod devices;
pub mod health;
pub mod orders;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::core::ServerState;

/// Build the complete application router.
pub fn router(state: ServerState) -> Router {
    Router::new()
        .merge(orders::router())
        .merge(devices::router())
        .merge(health::router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
