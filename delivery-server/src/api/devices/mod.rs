//! Device API Module
//!
//! Registration of the push device token that backs the durable
//! notification fallback.

mod handler;

use axum::{Router, routing::put};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().route("/api/devices/token", put(handler::save_token))
}
