//! Order Repository
//!
//! Order CRUD and the conditional status updates the lifecycle engine
//! relies on. A status update carries the expected current status and
//! ownership in its WHERE clause, so the write is a compare-and-swap:
//! two concurrent actors cannot both win the same transition.

use super::{RepoError, RepoResult};
use shared::models::{Order, OrderDraft, OrderItemView, OrderStatus, OrderView};
use shared::util::now_millis;
use sqlx::SqlitePool;
use uuid::Uuid;

const ORDER_SELECT: &str = "SELECT id, customer_id, restaurant_id, rider_id, status, \
     payment_status, payment_ref, total_amount, created_at FROM orders";

const ORDER_VIEW_SELECT: &str = "SELECT o.id, o.customer_id, cu.name AS customer_name, \
     o.restaurant_id, r.name AS restaurant_name, o.rider_id, ru.name AS rider_name, \
     o.status, o.payment_status, o.total_amount, o.created_at \
     FROM orders o \
     JOIN user cu ON o.customer_id = cu.id \
     JOIN restaurant r ON o.restaurant_id = r.id \
     LEFT JOIN rider rd ON o.rider_id = rd.id \
     LEFT JOIN user ru ON rd.user_id = ru.id";

/// Predicate for conditional status updates. Empty filter = blind write.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatusFilter<'a> {
    /// Only apply if the current status is one of these.
    pub current: &'a [OrderStatus],
    /// Only apply if the order belongs to this restaurant.
    pub restaurant_id: Option<&'a str>,
}

/// Persist a new order and its line items atomically.
pub async fn create(pool: &SqlitePool, draft: OrderDraft) -> RepoResult<Order> {
    let id = Uuid::new_v4().to_string();
    let now = now_millis();

    let mut tx = pool.begin().await?;

    sqlx::query(
        "INSERT INTO orders (id, customer_id, restaurant_id, status, payment_status, total_amount, created_at) \
         VALUES (?, ?, ?, 'PENDING', 'PENDING', ?, ?)",
    )
    .bind(&id)
    .bind(&draft.customer_id)
    .bind(&draft.restaurant_id)
    .bind(draft.total_amount)
    .bind(now)
    .execute(&mut *tx)
    .await?;

    for item in &draft.items {
        sqlx::query(
            "INSERT INTO order_item (order_id, menu_item_id, quantity, unit_price) \
             VALUES (?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(&item.menu_item_id)
        .bind(item.quantity)
        .bind(item.unit_price)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    find_by_id(pool, &id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create order".into()))
}

pub async fn find_by_id(pool: &SqlitePool, id: &str) -> RepoResult<Option<Order>> {
    let sql = format!("{ORDER_SELECT} WHERE id = ?");
    let row = sqlx::query_as::<_, Order>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// Conditional status update. Returns `None` when no row matched the
/// filter — already processed, wrong owner, or missing; callers must not
/// distinguish these cases.
pub async fn update_status(
    pool: &SqlitePool,
    id: &str,
    filter: StatusFilter<'_>,
    new_status: OrderStatus,
) -> RepoResult<Option<Order>> {
    let mut qb: sqlx::QueryBuilder<sqlx::Sqlite> =
        sqlx::QueryBuilder::new("UPDATE orders SET status = ");
    qb.push_bind(new_status);
    qb.push(" WHERE id = ").push_bind(id);
    if !filter.current.is_empty() {
        qb.push(" AND status IN (");
        let mut statuses = qb.separated(", ");
        for status in filter.current {
            statuses.push_bind(*status);
        }
        statuses.push_unseparated(")");
    }
    if let Some(restaurant_id) = filter.restaurant_id {
        qb.push(" AND restaurant_id = ").push_bind(restaurant_id);
    }

    let result = qb.build().execute(pool).await?;
    if result.rows_affected() == 0 {
        return Ok(None);
    }
    find_by_id(pool, id).await
}

/// Claim an order for a rider: sets the rider and moves the order to
/// PREPARING, but only while it is CONFIRMED/PREPARING with no rider yet.
pub async fn assign_rider(
    pool: &SqlitePool,
    id: &str,
    rider_id: &str,
) -> RepoResult<Option<Order>> {
    let result = sqlx::query(
        "UPDATE orders SET rider_id = ?, status = 'PREPARING' \
         WHERE id = ? AND rider_id IS NULL AND status IN ('CONFIRMED', 'PREPARING')",
    )
    .bind(rider_id)
    .bind(id)
    .execute(pool)
    .await?;
    if result.rows_affected() == 0 {
        return Ok(None);
    }
    find_by_id(pool, id).await
}

/// Denormalized snapshot of one order, with line items.
pub async fn view_by_id(pool: &SqlitePool, id: &str) -> RepoResult<Option<OrderView>> {
    let sql = format!("{ORDER_VIEW_SELECT} WHERE o.id = ?");
    let view = sqlx::query_as::<_, OrderView>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    match view {
        Some(mut view) => {
            view.items = items_for(pool, id).await?;
            Ok(Some(view))
        }
        None => Ok(None),
    }
}

pub async fn views_for_customer(pool: &SqlitePool, customer_id: &str) -> RepoResult<Vec<OrderView>> {
    let sql = format!("{ORDER_VIEW_SELECT} WHERE o.customer_id = ? ORDER BY o.created_at DESC");
    fetch_views(pool, &sql, customer_id).await
}

pub async fn views_for_restaurant(
    pool: &SqlitePool,
    restaurant_id: &str,
) -> RepoResult<Vec<OrderView>> {
    let sql = format!("{ORDER_VIEW_SELECT} WHERE o.restaurant_id = ? ORDER BY o.created_at DESC");
    fetch_views(pool, &sql, restaurant_id).await
}

pub async fn views_for_rider(pool: &SqlitePool, rider_id: &str) -> RepoResult<Vec<OrderView>> {
    let sql = format!("{ORDER_VIEW_SELECT} WHERE o.rider_id = ? ORDER BY o.created_at DESC");
    fetch_views(pool, &sql, rider_id).await
}

async fn fetch_views(pool: &SqlitePool, sql: &str, bind: &str) -> RepoResult<Vec<OrderView>> {
    let mut views = sqlx::query_as::<_, OrderView>(sql)
        .bind(bind)
        .fetch_all(pool)
        .await?;
    for view in &mut views {
        view.items = items_for(pool, &view.id).await?;
    }
    Ok(views)
}

async fn items_for(pool: &SqlitePool, order_id: &str) -> RepoResult<Vec<OrderItemView>> {
    let rows = sqlx::query_as::<_, OrderItemView>(
        "SELECT i.menu_item_id, m.name, i.quantity, i.unit_price \
         FROM order_item i JOIN menu_item m ON i.menu_item_id = m.id \
         WHERE i.order_id = ? ORDER BY i.id",
    )
    .bind(order_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}
