//! Order service
//!
//! Every mutating operation is one logical unit: authorize, persist
//! through a conditional update, then fan out — realtime channel first
//! (fire-and-forget), durable push always attempted afterwards. Neither
//! channel failing can fail the mutation.

use std::sync::Arc;

use serde::Deserialize;
use sqlx::SqlitePool;

use shared::models::{OrderDraft, OrderDraftItem, OrderStatus, OrderView, Role};
use shared::realtime::ServerEvent;
use shared::util::short_id;
use shared::{AppError, AppResult};

use super::access::{self, OrderOp};
use crate::db::repository::order::{self as order_repo, StatusFilter};
use crate::db::repository::{menu_item, party};
use crate::notify::{NotificationDispatcher, PushMessage};

/// New order input. Item prices are resolved server-side from the menu;
/// the total is validated downstream by the payment collaborator.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateOrderInput {
    pub restaurant_id: String,
    pub items: Vec<CreateOrderItem>,
    pub total_amount: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateOrderItem {
    pub item_id: String,
    pub quantity: i64,
}

pub struct OrderService {
    pool: SqlitePool,
    dispatcher: Arc<NotificationDispatcher>,
}

impl OrderService {
    pub fn new(pool: SqlitePool, dispatcher: Arc<NotificationDispatcher>) -> Self {
        Self { pool, dispatcher }
    }

    pub async fn create_order(
        &self,
        customer_id: &str,
        input: CreateOrderInput,
    ) -> AppResult<OrderView> {
        if input.items.is_empty() {
            return Err(AppError::validation("Order must contain at least one item"));
        }

        let restaurant = party::find_restaurant(&self.pool, &input.restaurant_id)
            .await?
            .ok_or_else(|| AppError::not_found("Restaurant not found"))?;

        // Resolve stored prices; the client-supplied price is never trusted.
        let mut items = Vec::with_capacity(input.items.len());
        for item in &input.items {
            if item.quantity <= 0 {
                return Err(AppError::validation(format!(
                    "Invalid quantity for item {}",
                    item.item_id
                )));
            }
            let menu_item =
                menu_item::find_in_restaurant(&self.pool, &item.item_id, &restaurant.id)
                    .await?
                    .ok_or_else(|| {
                        AppError::not_found(format!("Menu item {} not found", item.item_id))
                    })?;
            items.push(OrderDraftItem {
                menu_item_id: menu_item.id,
                quantity: item.quantity,
                unit_price: menu_item.price,
            });
        }

        let order = order_repo::create(
            &self.pool,
            OrderDraft {
                customer_id: customer_id.to_string(),
                restaurant_id: restaurant.id.clone(),
                items,
                total_amount: input.total_amount,
            },
        )
        .await?;

        let view = self.view(&order.id).await?;
        tracing::info!(order_id = %view.id, restaurant_id = %restaurant.id, "Order created");

        self.dispatcher.notify(
            &restaurant.user_id,
            Role::Restaurant,
            ServerEvent::NewOrder(view.clone()),
        );
        self.dispatcher
            .push(
                &restaurant.user_id,
                PushMessage::new(
                    "New Order Received! 🎉",
                    format!("You have a new order from {}", view.customer_name),
                )
                .with("orderId", view.id.clone())
                .with("type", "NEW_ORDER"),
            )
            .await;

        Ok(view)
    }

    /// PENDING → CONFIRMED, scoped to the acting owner's restaurant. The
    /// single conditional update is the guard against double-accept: the
    /// loser of a race sees the same NotFound as a missing order.
    pub async fn accept_order(&self, actor_id: &str, order_id: &str) -> AppResult<OrderView> {
        const MISS: &str = "Order not found or already processed";

        let restaurant = party::find_restaurant_by_owner(&self.pool, actor_id)
            .await?
            .ok_or_else(|| AppError::not_found(MISS))?;

        let order = order_repo::update_status(
            &self.pool,
            order_id,
            StatusFilter {
                current: &[OrderStatus::Pending],
                restaurant_id: Some(&restaurant.id),
            },
            OrderStatus::Confirmed,
        )
        .await?
        .ok_or_else(|| AppError::not_found(MISS))?;

        let view = self.view(&order.id).await?;
        tracing::info!(order_id = %view.id, "Order confirmed by restaurant");

        self.dispatcher.notify(
            &view.customer_id,
            Role::User,
            ServerEvent::OrderUpdated(view.clone()),
        );
        self.dispatcher
            .broadcast_riders(&ServerEvent::NewOrderAvailable(view.clone()));
        self.dispatcher
            .push(
                &view.customer_id,
                PushMessage::new(
                    "Order Confirmed! ✅",
                    format!("Your order has been confirmed by {}", view.restaurant_name),
                )
                .with("orderId", view.id.clone())
                .with("type", "ORDER_CONFIRMED"),
            )
            .await;

        Ok(view)
    }

    /// Claim an order for the acting rider. Conditional on the order being
    /// CONFIRMED/PREPARING with no rider yet; sets status to PREPARING.
    pub async fn assign_rider(&self, actor_id: &str, order_id: &str) -> AppResult<OrderView> {
        const MISS: &str = "Order not found or cannot be assigned";

        let rider = party::find_rider_by_owner(&self.pool, actor_id)
            .await?
            .ok_or_else(|| AppError::not_found(MISS))?;

        let order = order_repo::assign_rider(&self.pool, order_id, &rider.id)
            .await?
            .ok_or_else(|| AppError::not_found(MISS))?;

        let view = self.view(&order.id).await?;
        tracing::info!(order_id = %view.id, rider_id = %rider.id, "Rider assigned to order");

        self.fan_out(&view).await;
        self.dispatcher
            .push(
                &view.customer_id,
                PushMessage::new("Rider Assigned! 🚴", "A rider has been assigned to your order")
                    .with("orderId", view.id.clone())
                    .with("type", "RIDER_ASSIGNED"),
            )
            .await;

        Ok(view)
    }

    pub async fn update_order_status(
        &self,
        order_id: &str,
        new_status: OrderStatus,
        actor_id: &str,
        role: Role,
    ) -> AppResult<OrderView> {
        let order = order_repo::find_by_id(&self.pool, order_id)
            .await?
            .ok_or_else(|| AppError::not_found("Order not found"))?;

        access::authorize(&self.pool, OrderOp::UpdateStatus, role, actor_id, (&order).into())
            .await?;

        if order.status.is_terminal() {
            return Err(AppError::validation(format!(
                "Order is already {}",
                order.status
            )));
        }

        let order =
            order_repo::update_status(&self.pool, order_id, StatusFilter::default(), new_status)
                .await?
                .ok_or_else(|| AppError::not_found("Order not found"))?;

        let view = self.view(&order.id).await?;
        tracing::info!(order_id = %view.id, status = %new_status, "Order status updated");

        self.fan_out(&view).await;
        if let Some((title, body)) = status_push_copy(new_status) {
            self.dispatcher
                .push(
                    &view.customer_id,
                    PushMessage::new(title, body)
                        .with("orderId", view.id.clone())
                        .with("type", format!("ORDER_{new_status}")),
                )
                .await;
        }

        Ok(view)
    }

    pub async fn cancel_order(
        &self,
        order_id: &str,
        actor_id: &str,
        role: Role,
    ) -> AppResult<OrderView> {
        let order = order_repo::find_by_id(&self.pool, order_id)
            .await?
            .ok_or_else(|| AppError::not_found("Order not found"))?;

        access::authorize(&self.pool, OrderOp::Cancel, role, actor_id, (&order).into()).await?;

        if order.status.is_terminal() {
            return Err(AppError::validation(format!(
                "Order is already {}",
                order.status
            )));
        }

        let order = order_repo::update_status(
            &self.pool,
            order_id,
            StatusFilter::default(),
            OrderStatus::Cancelled,
        )
        .await?
        .ok_or_else(|| AppError::not_found("Order not found"))?;

        let view = self.view(&order.id).await?;
        tracing::info!(order_id = %view.id, "Order cancelled");

        self.fan_out(&view).await;
        self.dispatcher
            .push(
                &view.customer_id,
                PushMessage::new(
                    "Order Cancelled",
                    format!("Order #{} has been cancelled", short_id(&view.id)),
                )
                .with("orderId", view.id.clone())
                .with("type", "ORDER_CANCELLED"),
            )
            .await;

        Ok(view)
    }

    /// Orders visible to the actor; the role decides the filter, resolved
    /// through the owner link for restaurants and riders.
    pub async fn get_user_orders(&self, actor_id: &str, role: Role) -> AppResult<Vec<OrderView>> {
        let views = match role {
            Role::User => order_repo::views_for_customer(&self.pool, actor_id).await?,
            Role::Restaurant => match party::find_restaurant_by_owner(&self.pool, actor_id).await? {
                Some(restaurant) => {
                    order_repo::views_for_restaurant(&self.pool, &restaurant.id).await?
                }
                None => Vec::new(),
            },
            Role::Rider => match party::find_rider_by_owner(&self.pool, actor_id).await? {
                Some(rider) => order_repo::views_for_rider(&self.pool, &rider.id).await?,
                None => Vec::new(),
            },
        };
        Ok(views)
    }

    pub async fn get_order(
        &self,
        order_id: &str,
        actor_id: &str,
        role: Role,
    ) -> AppResult<OrderView> {
        let view = order_repo::view_by_id(&self.pool, order_id)
            .await?
            .ok_or_else(|| AppError::not_found("Order not found"))?;

        access::authorize(&self.pool, OrderOp::Read, role, actor_id, (&view).into()).await?;

        Ok(view)
    }

    async fn view(&self, order_id: &str) -> AppResult<OrderView> {
        order_repo::view_by_id(&self.pool, order_id)
            .await?
            .ok_or_else(|| AppError::internal("Order vanished after update"))
    }

    /// Realtime fan-out to the three interested parties, resolving the
    /// restaurant/rider rows to their owning user ids.
    async fn fan_out(&self, view: &OrderView) {
        self.dispatcher.notify(
            &view.customer_id,
            Role::User,
            ServerEvent::OrderUpdated(view.clone()),
        );

        match party::find_restaurant(&self.pool, &view.restaurant_id).await {
            Ok(Some(restaurant)) => self.dispatcher.notify(
                &restaurant.user_id,
                Role::Restaurant,
                ServerEvent::NewOrder(view.clone()),
            ),
            Ok(None) => {}
            Err(e) => {
                tracing::error!(error = %e, "Failed to resolve restaurant owner for notification");
            }
        }

        if let Some(rider_id) = &view.rider_id {
            match party::find_rider(&self.pool, rider_id).await {
                Ok(Some(rider)) => self.dispatcher.notify(
                    &rider.user_id,
                    Role::Rider,
                    ServerEvent::OrderAssigned(view.clone()),
                ),
                Ok(None) => {}
                Err(e) => {
                    tracing::error!(error = %e, "Failed to resolve rider owner for notification");
                }
            }
        }
    }
}

/// Status-keyed push copy for the customer. Statuses without copy send no
/// push.
fn status_push_copy(status: OrderStatus) -> Option<(&'static str, &'static str)> {
    match status {
        OrderStatus::Preparing => Some((
            "Order Being Prepared 👨‍🍳",
            "The restaurant has started preparing your order",
        )),
        OrderStatus::ReadyForPickup => Some((
            "Order Ready for Pickup! 📦",
            "Your order is ready and waiting for rider pickup",
        )),
        OrderStatus::OnTheWay => Some(("Order On The Way! 🚴", "Your order is on the way to you")),
        OrderStatus::Delivered => Some((
            "Order Delivered! 🎉",
            "Your order has been delivered. Enjoy your meal!",
        )),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_push_copy() {
        let (_, body) = status_push_copy(OrderStatus::Delivered).unwrap();
        assert!(body.contains("Enjoy your meal!"));
        assert!(status_push_copy(OrderStatus::Pending).is_none());
        assert!(status_push_copy(OrderStatus::Cancelled).is_none());
    }
}
