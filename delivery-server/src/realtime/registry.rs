//! Connection Registry
//!
//! Maps authenticated party identity to the live connection handle. One
//! map per role class (restaurants, riders) plus a combined index. An
//! injectable instance, not a module-level singleton, so tests can build
//! isolated registries. Per-process state: nothing here survives a
//! restart, and a multi-instance deployment must externalize it.

use dashmap::DashMap;
use shared::AppError;
use shared::models::Role;
use shared::realtime::ServerEvent;
use std::sync::Arc;
use tokio::sync::mpsc;
use uuid::Uuid;

/// Handle to a live connection: the connection id plus the outbound event
/// channel consumed by the connection's writer task. Emitting is
/// fire-and-forget; no acknowledgment is awaited.
#[derive(Debug)]
pub struct ConnectionHandle {
    id: Uuid,
    tx: mpsc::UnboundedSender<ServerEvent>,
}

impl ConnectionHandle {
    pub fn new(id: Uuid, tx: mpsc::UnboundedSender<ServerEvent>) -> Self {
        Self { id, tx }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Queue an event for delivery. Fails only when the connection's
    /// writer is gone (client already disconnected).
    pub fn emit(&self, event: ServerEvent) -> Result<(), AppError> {
        self.tx
            .send(event)
            .map_err(|_| AppError::internal("Connection closed"))
    }
}

/// In-memory registry of authenticated connections, keyed by user id.
/// Written only by the session layer; read by the dispatcher.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    connected: DashMap<String, Arc<ConnectionHandle>>,
    restaurants: DashMap<String, Arc<ConnectionHandle>>,
    riders: DashMap<String, Arc<ConnectionHandle>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an authenticated party. A later registration for the same
    /// party replaces the earlier handle (last one wins; no multi-device
    /// fan-out).
    pub fn register(&self, party_id: &str, role: Role, handle: Arc<ConnectionHandle>) {
        self.connected.insert(party_id.to_string(), handle.clone());
        match role {
            Role::Restaurant => {
                self.restaurants.insert(party_id.to_string(), handle);
            }
            Role::Rider => {
                self.riders.insert(party_id.to_string(), handle);
            }
            Role::User => {}
        }
    }

    /// Look up a live connection in the combined index.
    pub fn lookup(&self, party_id: &str) -> Option<Arc<ConnectionHandle>> {
        self.connected.get(party_id).map(|entry| entry.value().clone())
    }

    /// Look up a live connection through the role-class map.
    pub fn lookup_in_role(&self, party_id: &str, role: Role) -> Option<Arc<ConnectionHandle>> {
        let map = match role {
            Role::User => &self.connected,
            Role::Restaurant => &self.restaurants,
            Role::Rider => &self.riders,
        };
        map.get(party_id).map(|entry| entry.value().clone())
    }

    /// All live rider connections, for broadcasts.
    pub fn riders(&self) -> Vec<Arc<ConnectionHandle>> {
        self.riders.iter().map(|entry| entry.value().clone()).collect()
    }

    pub fn rider_count(&self) -> usize {
        self.riders.len()
    }

    /// Remove a connection from every map it could belong to. The handle
    /// id is the only fact known at disconnect time, so this scans rather
    /// than indexes — and it must not evict a newer handle that replaced
    /// this one for the same party.
    pub fn unregister(&self, connection_id: Uuid) {
        self.connected.retain(|_, handle| handle.id() != connection_id);
        self.restaurants.retain(|_, handle| handle.id() != connection_id);
        self.riders.retain(|_, handle| handle.id() != connection_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handle() -> Arc<ConnectionHandle> {
        let (tx, _rx) = mpsc::unbounded_channel();
        Arc::new(ConnectionHandle::new(Uuid::new_v4(), tx))
    }

    #[test]
    fn test_register_and_lookup() {
        let registry = ConnectionRegistry::new();
        let h = handle();
        registry.register("u1", Role::Rider, h.clone());

        assert_eq!(registry.lookup("u1").unwrap().id(), h.id());
        assert_eq!(
            registry.lookup_in_role("u1", Role::Rider).unwrap().id(),
            h.id()
        );
        assert!(registry.lookup_in_role("u1", Role::Restaurant).is_none());
        assert_eq!(registry.rider_count(), 1);
    }

    #[test]
    fn test_unregister_removes_from_all_maps() {
        let registry = ConnectionRegistry::new();
        let h = handle();
        registry.register("r1", Role::Restaurant, h.clone());

        registry.unregister(h.id());
        assert!(registry.lookup("r1").is_none());
        assert!(registry.lookup_in_role("r1", Role::Restaurant).is_none());
    }

    #[test]
    fn test_last_registration_wins() {
        let registry = ConnectionRegistry::new();
        let first = handle();
        let second = handle();
        registry.register("u1", Role::Rider, first.clone());
        registry.register("u1", Role::Rider, second.clone());

        assert_eq!(registry.lookup("u1").unwrap().id(), second.id());

        // Unregistering the dead handle must not evict the live one.
        registry.unregister(first.id());
        assert_eq!(registry.lookup("u1").unwrap().id(), second.id());
        assert_eq!(registry.rider_count(), 1);
    }

    #[test]
    fn test_customer_not_in_role_maps() {
        let registry = ConnectionRegistry::new();
        registry.register("c1", Role::User, handle());
        assert!(registry.lookup("c1").is_some());
        assert_eq!(registry.rider_count(), 0);
        assert!(registry.riders().is_empty());
    }
}
