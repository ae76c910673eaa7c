//! Order model
//!
//! Amounts are integer minor units; timestamps are unix milliseconds.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Order lifecycle status.
///
/// `PENDING → CONFIRMED → PREPARING → READY_FOR_PICKUP → ON_THE_WAY →
/// DELIVERED`, with `CANCELLED` reachable while the order is still open.
/// `DELIVERED` and `CANCELLED` are terminal.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Preparing,
    ReadyForPickup,
    OnTheWay,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// Terminal orders accept no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::Confirmed => "CONFIRMED",
            OrderStatus::Preparing => "PREPARING",
            OrderStatus::ReadyForPickup => "READY_FOR_PICKUP",
            OrderStatus::OnTheWay => "ON_THE_WAY",
            OrderStatus::Delivered => "DELIVERED",
            OrderStatus::Cancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payment status, independent of the order lifecycle. Set asynchronously
/// by the payment collaborator.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Pending,
    Successful,
    Failed,
}

/// Order row.
///
/// `rider_id` is set once a rider claims the order (status ≥ PREPARING).
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Order {
    pub id: String,
    pub customer_id: String,
    pub restaurant_id: String,
    pub rider_id: Option<String>,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub payment_ref: Option<String>,
    /// Total in minor units; equals the sum of line totals at creation.
    pub total_amount: i64,
    pub created_at: i64,
}

/// Menu item row (read-only here; priced server-side).
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct MenuItem {
    pub id: String,
    pub restaurant_id: String,
    pub name: String,
    pub price: i64,
}

/// Draft used by the repository to persist a new order atomically.
#[derive(Debug, Clone)]
pub struct OrderDraft {
    pub customer_id: String,
    pub restaurant_id: String,
    pub items: Vec<OrderDraftItem>,
    pub total_amount: i64,
}

#[derive(Debug, Clone)]
pub struct OrderDraftItem {
    pub menu_item_id: String,
    pub quantity: i64,
    pub unit_price: i64,
}

/// Denormalized order snapshot sent to clients and returned by read paths.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct OrderView {
    pub id: String,
    pub customer_id: String,
    pub customer_name: String,
    pub restaurant_id: String,
    pub restaurant_name: String,
    pub rider_id: Option<String>,
    pub rider_name: Option<String>,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub total_amount: i64,
    pub created_at: i64,
    #[sqlx(skip)]
    pub items: Vec<OrderItemView>,
}

/// Line item as presented to clients.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct OrderItemView {
    pub menu_item_id: String,
    pub name: String,
    pub quantity: i64,
    pub unit_price: i64,
}
