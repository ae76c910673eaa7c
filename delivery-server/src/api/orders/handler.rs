//! Order API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;

use shared::AppResult;
use shared::models::{OrderStatus, OrderView, Role};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::orders::CreateOrderInput;

/// List orders visible to the authenticated party
pub async fn list(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<Vec<OrderView>>> {
    let orders = state.orders.get_user_orders(&user.id, user.role).await?;
    Ok(Json(orders))
}

/// Get one order; the actor must own it through their role
pub async fn get_by_id(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<OrderView>> {
    let order = state.orders.get_order(&id, &user.id, user.role).await?;
    Ok(Json(order))
}

/// Place a new order (customer)
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<CreateOrderInput>,
) -> AppResult<Json<OrderView>> {
    user.require_role(Role::User)?;
    let order = state.orders.create_order(&user.id, payload).await?;
    Ok(Json(order))
}

/// Accept a pending order (restaurant)
pub async fn accept(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<OrderView>> {
    user.require_role(Role::Restaurant)?;
    let order = state.orders.accept_order(&user.id, &id).await?;
    Ok(Json(order))
}

/// Claim an order (rider)
pub async fn assign_rider(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<OrderView>> {
    user.require_role(Role::Rider)?;
    let order = state.orders.assign_rider(&user.id, &id).await?;
    Ok(Json(order))
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: OrderStatus,
}

/// Update order status (any owning party)
pub async fn update_status(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<UpdateStatusRequest>,
) -> AppResult<Json<OrderView>> {
    let order = state
        .orders
        .update_order_status(&id, payload.status, &user.id, user.role)
        .await?;
    Ok(Json(order))
}

/// Cancel an order (customer or restaurant)
pub async fn cancel(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<OrderView>> {
    let order = state.orders.cancel_order(&id, &user.id, user.role).await?;
    Ok(Json(order))
}

/// Mark ready for pickup (restaurant)
pub async fn ready_for_pickup(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<OrderView>> {
    user.require_role(Role::Restaurant)?;
    let order = state
        .orders
        .update_order_status(&id, OrderStatus::ReadyForPickup, &user.id, user.role)
        .await?;
    Ok(Json(order))
}

/// Mark picked up and on the way (rider)
pub async fn pickup(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<OrderView>> {
    user.require_role(Role::Rider)?;
    let order = state
        .orders
        .update_order_status(&id, OrderStatus::OnTheWay, &user.id, user.role)
        .await?;
    Ok(Json(order))
}

/// Mark delivered (rider)
pub async fn deliver(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<OrderView>> {
    user.require_role(Role::Rider)?;
    let order = state
        .orders
        .update_order_status(&id, OrderStatus::Delivered, &user.id, user.role)
        .await?;
    Ok(Json(order))
}
