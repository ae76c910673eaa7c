//! Order authorization
//!
//! One table from (operation, role) to an ownership check. Restaurant and
//! rider actors resolve through the owner link on their row; an actor's
//! claimed id is never compared directly against the order's
//! restaurant/rider id.

use sqlx::SqlitePool;

use shared::models::{Order, OrderView, Role};
use shared::{AppError, AppResult};

use crate::db::repository::party;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderOp {
    UpdateStatus,
    Cancel,
    Read,
}

/// The party references an authorization check needs from an order.
#[derive(Debug, Clone, Copy)]
pub struct OrderRefs<'a> {
    pub customer_id: &'a str,
    pub restaurant_id: &'a str,
    pub rider_id: Option<&'a str>,
}

impl<'a> From<&'a Order> for OrderRefs<'a> {
    fn from(order: &'a Order) -> Self {
        Self {
            customer_id: &order.customer_id,
            restaurant_id: &order.restaurant_id,
            rider_id: order.rider_id.as_deref(),
        }
    }
}

impl<'a> From<&'a OrderView> for OrderRefs<'a> {
    fn from(view: &'a OrderView) -> Self {
        Self {
            customer_id: &view.customer_id,
            restaurant_id: &view.restaurant_id,
            rider_id: view.rider_id.as_deref(),
        }
    }
}

/// Check that `actor_id` (in `role`) may perform `op` on the order.
pub async fn authorize(
    pool: &SqlitePool,
    op: OrderOp,
    role: Role,
    actor_id: &str,
    order: OrderRefs<'_>,
) -> AppResult<()> {
    // Cancellation is restricted to the customer and the restaurant.
    if op == OrderOp::Cancel && role == Role::Rider {
        return Err(AppError::forbidden(denial(op, role)));
    }

    let owns = match role {
        Role::User => order.customer_id == actor_id,
        Role::Restaurant => party::find_restaurant_by_owner(pool, actor_id)
            .await?
            .is_some_and(|restaurant| restaurant.id == order.restaurant_id),
        Role::Rider => party::find_rider_by_owner(pool, actor_id)
            .await?
            .is_some_and(|rider| order.rider_id == Some(rider.id.as_str())),
    };

    if owns {
        Ok(())
    } else {
        Err(AppError::forbidden(denial(op, role)))
    }
}

fn denial(op: OrderOp, role: Role) -> &'static str {
    match (op, role) {
        (OrderOp::UpdateStatus, Role::Restaurant) => {
            "You can only update orders from your restaurant"
        }
        (OrderOp::UpdateStatus, Role::Rider) => "You can only update orders assigned to you",
        (OrderOp::UpdateStatus, Role::User) => "You can only update your own orders",
        (OrderOp::Cancel, Role::User) => "You can only cancel your own orders",
        (OrderOp::Cancel, Role::Restaurant) => "You can only cancel orders from your restaurant",
        (OrderOp::Cancel, Role::Rider) => "Only the customer or the restaurant can cancel an order",
        (OrderOp::Read, _) => "Access denied",
    }
}
