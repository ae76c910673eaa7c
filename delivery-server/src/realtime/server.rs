//! Realtime gateway: TCP accept loop
//!
//! Accepts connections and spawns one [`ClientSession`] task per client.
//! Shuts down gracefully when the server's cancellation token fires.

use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use super::registry::ConnectionRegistry;
use super::session::ClientSession;
use crate::auth::JwtService;

pub struct RealtimeGateway {
    registry: Arc<ConnectionRegistry>,
    jwt: Arc<JwtService>,
    auth_window: Duration,
    shutdown: CancellationToken,
}

impl RealtimeGateway {
    pub fn new(
        registry: Arc<ConnectionRegistry>,
        jwt: Arc<JwtService>,
        auth_window: Duration,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            registry,
            jwt,
            auth_window,
            shutdown,
        }
    }

    /// Accept connections until shutdown. The listener is bound by the
    /// caller so tests can bind port 0 and read the local address first.
    pub async fn run(&self, listener: TcpListener) {
        if let Ok(addr) = listener.local_addr() {
            tracing::info!("Realtime gateway listening on {}", addr);
        }

        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => {
                    tracing::info!("Realtime gateway shutting down");
                    break;
                }

                result = listener.accept() => {
                    match result {
                        Ok((stream, addr)) => {
                            tracing::debug!("Client connected: {}", addr);
                            let session = ClientSession::new(
                                self.registry.clone(),
                                self.jwt.clone(),
                                self.auth_window,
                            );
                            let shutdown = self.shutdown.clone();
                            tokio::spawn(async move {
                                session.run(stream, shutdown).await;
                            });
                        }
                        Err(e) => {
                            tracing::error!("Failed to accept connection: {}", e);
                        }
                    }
                }
            }
        }
    }
}
