//! Per-connection session protocol
//!
//! `CONNECTED` (unauthenticated) → `AUTHENTICATED` → closed. A connection
//! gets a welcome event on connect and a fixed grace window to present a
//! valid credential token; failing that it is told so and evicted. Auth
//! failures before the deadline leave the session in `CONNECTED` so the
//! client may retry.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt, WriteHalf};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use shared::realtime::{AuthedUser, ClientEvent, ServerEvent};
use shared::util::now_rfc3339;

use super::registry::{ConnectionHandle, ConnectionRegistry};
use super::{read_frame, write_frame};
use crate::auth::JwtService;

/// Delay before closing after a terminal event, so the writer can flush it.
const CLOSE_GRACE_MS: u64 = 100;

#[derive(Debug)]
enum SessionState {
    Connected,
    Authenticated(AuthedUser),
}

/// One realtime client connection.
pub struct ClientSession {
    id: Uuid,
    registry: Arc<ConnectionRegistry>,
    jwt: Arc<JwtService>,
    auth_window: Duration,
    state: SessionState,
}

impl ClientSession {
    pub fn new(
        registry: Arc<ConnectionRegistry>,
        jwt: Arc<JwtService>,
        auth_window: Duration,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            registry,
            jwt,
            auth_window,
            state: SessionState::Connected,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    fn is_authenticated(&self) -> bool {
        matches!(self.state, SessionState::Authenticated(_))
    }

    /// Drive the session until disconnect, auth timeout or shutdown.
    pub async fn run<S>(mut self, stream: S, shutdown: CancellationToken)
    where
        S: AsyncRead + AsyncWrite + Send + 'static,
    {
        let (mut read_half, write_half) = tokio::io::split(stream);
        let (tx, rx) = mpsc::unbounded_channel();
        let writer = tokio::spawn(write_loop(write_half, rx));
        let handle = Arc::new(ConnectionHandle::new(self.id, tx.clone()));

        let _ = tx.send(ServerEvent::Welcome {
            message: "Connected! Send auth message to authenticate.".to_string(),
            client_id: self.id,
            timestamp: now_rfc3339(),
        });

        let auth_deadline = tokio::time::sleep(self.auth_window);
        tokio::pin!(auth_deadline);

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    tracing::debug!(session_id = %self.id, "Session shutting down");
                    break;
                }

                _ = &mut auth_deadline, if !self.is_authenticated() => {
                    tracing::debug!(session_id = %self.id, "Authentication timeout");
                    let _ = tx.send(ServerEvent::Timeout {
                        message: "Authentication timeout".to_string(),
                    });
                    // Let the writer flush before the transport drops.
                    tokio::time::sleep(Duration::from_millis(CLOSE_GRACE_MS)).await;
                    break;
                }

                frame = read_frame(&mut read_half) => {
                    match frame {
                        Ok(value) => self.handle_frame(&value, &tx, &handle),
                        Err(_) => {
                            tracing::debug!(session_id = %self.id, "Client disconnected");
                            break;
                        }
                    }
                }
            }
        }

        if let SessionState::Authenticated(user) = &self.state {
            tracing::debug!(session_id = %self.id, user_id = %user.id, "Authenticated session closing");
        }
        self.registry.unregister(self.id);
        drop(handle);
        drop(tx);
        let _ = tokio::time::timeout(Duration::from_secs(1), writer).await;
        tracing::debug!(session_id = %self.id, "Session closed");
    }

    fn handle_frame(
        &mut self,
        frame: &Value,
        tx: &mpsc::UnboundedSender<ServerEvent>,
        handle: &Arc<ConnectionHandle>,
    ) {
        match ClientEvent::from_frame(frame) {
            ClientEvent::Auth { token } => self.handle_auth(token, tx, handle),
            ClientEvent::Echo { data } => {
                let _ = tx.send(ServerEvent::EchoResponse {
                    received: data,
                    status: "success".to_string(),
                    timestamp: now_rfc3339(),
                });
            }
            ClientEvent::Unknown { event } => {
                tracing::debug!(session_id = %self.id, event = %event, "Unrecognized realtime event");
            }
        }
    }

    fn handle_auth(
        &mut self,
        token: Option<String>,
        tx: &mpsc::UnboundedSender<ServerEvent>,
        handle: &Arc<ConnectionHandle>,
    ) {
        let Some(token) = token else {
            let _ = tx.send(ServerEvent::auth_failure("No token"));
            return;
        };

        match self.jwt.validate_token(&token) {
            Ok(claims) => {
                let user = AuthedUser {
                    id: claims.sub,
                    role: claims.role,
                };
                self.registry.register(&user.id, user.role, handle.clone());
                tracing::info!(
                    session_id = %self.id,
                    user_id = %user.id,
                    role = %user.role,
                    "Realtime client authenticated"
                );
                self.state = SessionState::Authenticated(user.clone());
                let _ = tx.send(ServerEvent::auth_success(user));
            }
            Err(e) => {
                tracing::debug!(session_id = %self.id, error = %e, "Realtime auth failed");
                let _ = tx.send(ServerEvent::auth_failure(e.to_string()));
            }
        }
    }
}

/// Writer task: drains the outbound channel onto the transport. Exits when
/// every sender is gone or the transport rejects a write.
async fn write_loop<S>(mut writer: WriteHalf<S>, mut rx: mpsc::UnboundedReceiver<ServerEvent>)
where
    S: AsyncWrite + Send + 'static,
{
    while let Some(event) = rx.recv().await {
        if write_frame(&mut writer, &event).await.is_err() {
            break;
        }
    }
    let _ = writer.shutdown().await;
}
