//! Order API Module
//!
//! The order lifecycle surface. Role-gated routes reject mismatched roles
//! before the engine runs.

mod handler;

use axum::{
    Router,
    routing::{get, put},
};

use crate::core::ServerState;

/// Order router
pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/orders", get(handler::list).post(handler::create))
        .route("/api/orders/{id}", get(handler::get_by_id))
        // Restaurant side
        .route("/api/orders/{id}/accept", put(handler::accept))
        .route("/api/orders/{id}/ready-for-pickup", put(handler::ready_for_pickup))
        // Rider side
        .route("/api/orders/{id}/assign-rider", put(handler::assign_rider))
        .route("/api/orders/{id}/pickup", put(handler::pickup))
        .route("/api/orders/{id}/deliver", put(handler::deliver))
        // Any owning party
        .route("/api/orders/{id}/status", put(handler::update_status))
        .route("/api/orders/{id}/cancel", put(handler::cancel))
}
