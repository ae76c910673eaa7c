//! Server Implementation
//!
//! Starts the realtime gateway and the HTTP API, and wires graceful
//! shutdown through the shared cancellation token.

use std::net::SocketAddr;
use std::time::Duration;

use tokio::net::TcpListener;

use shared::{AppError, AppResult};

use crate::api;
use crate::core::{Config, ServerState};
use crate::realtime::RealtimeGateway;

/// HTTP + realtime server
pub struct Server {
    config: Config,
    state: Option<ServerState>,
}

impl Server {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            state: None,
        }
    }

    /// Create server with existing state
    pub fn with_state(config: Config, state: ServerState) -> Self {
        Self {
            config,
            state: Some(state),
        }
    }

    pub async fn run(&self) -> AppResult<()> {
        let state = match &self.state {
            Some(s) => s.clone(),
            None => ServerState::initialize(&self.config).await?,
        };

        // Realtime gateway
        let gateway = RealtimeGateway::new(
            state.registry.clone(),
            state.jwt.clone(),
            Duration::from_secs(self.config.auth_window_secs),
            state.shutdown.clone(),
        );
        let realtime_addr = SocketAddr::from(([0, 0, 0, 0], self.config.realtime_port));
        let realtime_listener = TcpListener::bind(realtime_addr)
            .await
            .map_err(|e| AppError::internal(format!("Failed to bind realtime port: {e}")))?;
        tokio::spawn(async move {
            gateway.run(realtime_listener).await;
        });

        // HTTP API
        let app = api::router(state.clone());
        let addr = SocketAddr::from(([0, 0, 0, 0], self.config.http_port));
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| AppError::internal(format!("Failed to bind HTTP port: {e}")))?;
        tracing::info!("🛵 Delivery server listening on {}", addr);

        let shutdown = state.shutdown.clone();
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = tokio::signal::ctrl_c().await;
                tracing::info!("Shutting down...");
                shutdown.cancel();
            })
            .await
            .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

        Ok(())
    }
}
