//! Notification Dispatcher
//!
//! Realtime delivery over the Connection Registry, with the push channel
//! as the durable fallback. Reads the registry, never writes it.

use std::sync::Arc;

use shared::models::Role;
use shared::realtime::ServerEvent;

use super::push::{PushMessage, PushService};
use crate::realtime::ConnectionRegistry;

pub struct NotificationDispatcher {
    registry: Arc<ConnectionRegistry>,
    push: PushService,
}

impl NotificationDispatcher {
    pub fn new(registry: Arc<ConnectionRegistry>, push: PushService) -> Self {
        Self { registry, push }
    }

    /// Emit an event to a party's live connection, if any. Fire-and-forget:
    /// no acknowledgment is awaited and absence of a connection only logs a
    /// warning — the push fallback is issued separately by the caller.
    pub fn notify(&self, user_id: &str, role: Role, event: ServerEvent) {
        match self.registry.lookup_in_role(user_id, role) {
            Some(handle) => {
                tracing::debug!(user_id = %user_id, role = %role, "Notifying party over realtime channel");
                if handle.emit(event).is_err() {
                    tracing::debug!(user_id = %user_id, "Realtime emit hit a stale connection");
                }
            }
            None => {
                tracing::warn!(user_id = %user_id, role = %role, "Party not connected, relying on push fallback");
            }
        }
    }

    /// Broadcast to every live rider connection.
    pub fn broadcast_riders(&self, event: &ServerEvent) {
        let riders = self.registry.riders();
        tracing::info!(rider_count = riders.len(), "Broadcasting order to riders");
        for handle in riders {
            if handle.emit(event.clone()).is_err() {
                tracing::debug!("Rider broadcast hit a stale connection");
            }
        }
    }

    /// Best-effort durable push; always attempted regardless of realtime
    /// delivery outcome.
    pub async fn push(&self, user_id: &str, message: PushMessage) {
        self.push.send(user_id, message).await;
    }
}
