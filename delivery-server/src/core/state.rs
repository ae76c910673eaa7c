use std::sync::Arc;

use sqlx::SqlitePool;
use tokio_util::sync::CancellationToken;

use shared::AppResult;

use crate::auth::JwtService;
use crate::core::Config;
use crate::db::DbService;
use crate::notify::{HttpPushGateway, LogPushGateway, NotificationDispatcher, PushGateway, PushService};
use crate::orders::OrderService;
use crate::realtime::ConnectionRegistry;

/// Server state — shared handles to every service
///
/// Cloning is shallow (`Arc` fields). The connection registry is owned
/// here, injected into the session layer (writer) and the dispatcher
/// (reader); it is per-process state with no cross-process sync.
#[derive(Clone)]
pub struct ServerState {
    pub config: Config,
    pub db: SqlitePool,
    pub registry: Arc<ConnectionRegistry>,
    pub dispatcher: Arc<NotificationDispatcher>,
    pub orders: Arc<OrderService>,
    pub jwt: Arc<JwtService>,
    /// Graceful-shutdown signal for background tasks
    pub shutdown: CancellationToken,
}

impl ServerState {
    /// Initialize the full state: database (with migrations), registry,
    /// notification plumbing, order engine and JWT service.
    pub async fn initialize(config: &Config) -> AppResult<Self> {
        let db = DbService::new(&config.database_path).await?;
        Ok(Self::with_pool(config.clone(), db.pool))
    }

    /// Assemble state around an existing pool (tests use an in-memory one).
    pub fn with_pool(config: Config, pool: SqlitePool) -> Self {
        let registry = Arc::new(ConnectionRegistry::new());

        let gateway: Arc<dyn PushGateway> =
            match (&config.push_endpoint, &config.push_server_key) {
                (Some(endpoint), Some(key)) => {
                    Arc::new(HttpPushGateway::new(endpoint.clone(), key.clone()))
                }
                _ => {
                    tracing::info!("Push provider not configured, using log-only delivery");
                    Arc::new(LogPushGateway)
                }
            };
        let push = PushService::new(pool.clone(), gateway);

        let dispatcher = Arc::new(NotificationDispatcher::new(registry.clone(), push));
        let orders = Arc::new(OrderService::new(pool.clone(), dispatcher.clone()));
        let jwt = Arc::new(JwtService::with_config(config.jwt.clone()));

        Self {
            config,
            db: pool,
            registry,
            dispatcher,
            orders,
            jwt,
            shutdown: CancellationToken::new(),
        }
    }
}
