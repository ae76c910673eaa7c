#![allow(dead_code)]

//! Shared test fixtures: an in-memory world with a customer, two
//! restaurants, two riders and a recording push gateway.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use sqlx::SqlitePool;
use tokio::sync::mpsc;
use uuid::Uuid;

use delivery_server::db::DbService;
use delivery_server::notify::{NotificationDispatcher, PushGateway, PushMessage, PushService};
use delivery_server::orders::{CreateOrderInput, CreateOrderItem, OrderService};
use delivery_server::realtime::{ConnectionHandle, ConnectionRegistry};
use shared::AppResult;
use shared::models::{OrderView, Role};
use shared::realtime::ServerEvent;
use shared::util::now_millis;

pub const CUSTOMER: &str = "cust-1";
pub const CUSTOMER_2: &str = "cust-2";
pub const RESTAURANT_OWNER: &str = "resto-owner-1";
pub const RESTAURANT: &str = "resto-1";
pub const RESTAURANT_OWNER_2: &str = "resto-owner-2";
pub const RESTAURANT_2: &str = "resto-2";
pub const RIDER_USER: &str = "rider-user-1";
pub const RIDER: &str = "rider-1";
pub const RIDER_USER_2: &str = "rider-user-2";
pub const RIDER_2: &str = "rider-2";

/// Push gateway that records every delivery for assertions.
#[derive(Default)]
pub struct RecordingGateway {
    pub sent: Mutex<Vec<(String, PushMessage)>>,
}

impl RecordingGateway {
    pub fn bodies_for(&self, device_token: &str) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|(token, _)| token == device_token)
            .map(|(_, message)| message.body.clone())
            .collect()
    }
}

#[async_trait]
impl PushGateway for RecordingGateway {
    async fn deliver(&self, device_token: &str, message: &PushMessage) -> AppResult<()> {
        self.sent
            .lock()
            .unwrap()
            .push((device_token.to_string(), message.clone()));
        Ok(())
    }
}

pub struct Harness {
    pub pool: SqlitePool,
    pub registry: Arc<ConnectionRegistry>,
    pub orders: OrderService,
    pub pushes: Arc<RecordingGateway>,
}

/// Fresh in-memory world with the standard cast seeded.
pub async fn harness() -> Harness {
    let db = DbService::new_in_memory().await.expect("in-memory db");
    let registry = Arc::new(ConnectionRegistry::new());
    let pushes = Arc::new(RecordingGateway::default());
    let push = PushService::new(db.pool.clone(), pushes.clone());
    let dispatcher = Arc::new(NotificationDispatcher::new(registry.clone(), push));
    let orders = OrderService::new(db.pool.clone(), dispatcher);

    seed_world(&db.pool).await;

    Harness {
        pool: db.pool,
        registry,
        orders,
        pushes,
    }
}

async fn seed_world(pool: &SqlitePool) {
    seed_user(pool, CUSTOMER, "Alice", Role::User, Some("tok-cust-1")).await;
    seed_user(pool, CUSTOMER_2, "Bob", Role::User, None).await;
    seed_user(pool, RESTAURANT_OWNER, "Carla", Role::Restaurant, Some("tok-resto-1")).await;
    seed_user(pool, RESTAURANT_OWNER_2, "Dan", Role::Restaurant, None).await;
    seed_user(pool, RIDER_USER, "Eve", Role::Rider, Some("tok-rider-1")).await;
    seed_user(pool, RIDER_USER_2, "Frank", Role::Rider, None).await;

    seed_restaurant(pool, RESTAURANT, RESTAURANT_OWNER, "Carla's Kitchen").await;
    seed_restaurant(pool, RESTAURANT_2, RESTAURANT_OWNER_2, "Dan's Diner").await;
    seed_rider(pool, RIDER, RIDER_USER).await;
    seed_rider(pool, RIDER_2, RIDER_USER_2).await;

    seed_menu_item(pool, "item-1", RESTAURANT, "Margherita", 1200).await;
    seed_menu_item(pool, "item-2", RESTAURANT, "Tiramisu", 500).await;
    seed_menu_item(pool, "item-3", RESTAURANT_2, "Burger", 900).await;
}

pub async fn seed_user(
    pool: &SqlitePool,
    id: &str,
    name: &str,
    role: Role,
    device_token: Option<&str>,
) {
    sqlx::query(
        "INSERT INTO user (id, name, email, role, device_token, created_at) VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(id)
    .bind(name)
    .bind(format!("{id}@example.com"))
    .bind(role)
    .bind(device_token)
    .bind(now_millis())
    .execute(pool)
    .await
    .expect("seed user");
}

pub async fn seed_restaurant(pool: &SqlitePool, id: &str, owner: &str, name: &str) {
    sqlx::query("INSERT INTO restaurant (id, user_id, name, address) VALUES (?, ?, ?, '1 Main St')")
        .bind(id)
        .bind(owner)
        .bind(name)
        .execute(pool)
        .await
        .expect("seed restaurant");
}

pub async fn seed_rider(pool: &SqlitePool, id: &str, owner: &str) {
    sqlx::query("INSERT INTO rider (id, user_id, vehicle_type) VALUES (?, ?, 'bike')")
        .bind(id)
        .bind(owner)
        .execute(pool)
        .await
        .expect("seed rider");
}

pub async fn seed_menu_item(pool: &SqlitePool, id: &str, restaurant_id: &str, name: &str, price: i64) {
    sqlx::query("INSERT INTO menu_item (id, restaurant_id, name, price) VALUES (?, ?, ?, ?)")
        .bind(id)
        .bind(restaurant_id)
        .bind(name)
        .bind(price)
        .execute(pool)
        .await
        .expect("seed menu item");
}

/// Register a fake live connection for a party; events arrive on the
/// returned receiver.
pub fn connect(
    registry: &ConnectionRegistry,
    user_id: &str,
    role: Role,
) -> mpsc::UnboundedReceiver<ServerEvent> {
    let (tx, rx) = mpsc::unbounded_channel();
    registry.register(user_id, role, Arc::new(ConnectionHandle::new(Uuid::new_v4(), tx)));
    rx
}

/// Place the standard order: customer 1 orders 2x item-1 at restaurant 1.
pub async fn place_order(orders: &OrderService) -> OrderView {
    orders
        .create_order(
            CUSTOMER,
            CreateOrderInput {
                restaurant_id: RESTAURANT.to_string(),
                items: vec![CreateOrderItem {
                    item_id: "item-1".to_string(),
                    quantity: 2,
                }],
                total_amount: 2400,
            },
        )
        .await
        .expect("create order")
}

pub fn expect_event(rx: &mut mpsc::UnboundedReceiver<ServerEvent>) -> ServerEvent {
    rx.try_recv().expect("expected a realtime event")
}
