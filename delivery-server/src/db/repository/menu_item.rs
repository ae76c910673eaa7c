//! Menu Item Repository
//!
//! Read-only here: the order engine resolves stored prices and never
//! trusts client-supplied ones.

use super::RepoResult;
use shared::models::MenuItem;
use sqlx::SqlitePool;

/// Find a menu item, scoped to its restaurant.
pub async fn find_in_restaurant(
    pool: &SqlitePool,
    id: &str,
    restaurant_id: &str,
) -> RepoResult<Option<MenuItem>> {
    let row = sqlx::query_as::<_, MenuItem>(
        "SELECT id, restaurant_id, name, price FROM menu_item WHERE id = ? AND restaurant_id = ?",
    )
    .bind(id)
    .bind(restaurant_id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}
