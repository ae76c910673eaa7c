//! Party Repository
//!
//! Users, restaurants and riders. Ownership lookups (`*_by_owner`) resolve
//! the authenticated user to their restaurant/rider row.

use super::{RepoError, RepoResult};
use shared::models::{Restaurant, Rider};
use sqlx::SqlitePool;

pub async fn find_restaurant(pool: &SqlitePool, id: &str) -> RepoResult<Option<Restaurant>> {
    let row = sqlx::query_as::<_, Restaurant>(
        "SELECT id, user_id, name, address FROM restaurant WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

pub async fn find_restaurant_by_owner(
    pool: &SqlitePool,
    user_id: &str,
) -> RepoResult<Option<Restaurant>> {
    let row = sqlx::query_as::<_, Restaurant>(
        "SELECT id, user_id, name, address FROM restaurant WHERE user_id = ?",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

pub async fn find_rider(pool: &SqlitePool, id: &str) -> RepoResult<Option<Rider>> {
    let row =
        sqlx::query_as::<_, Rider>("SELECT id, user_id, vehicle_type FROM rider WHERE id = ?")
            .bind(id)
            .fetch_optional(pool)
            .await?;
    Ok(row)
}

pub async fn find_rider_by_owner(pool: &SqlitePool, user_id: &str) -> RepoResult<Option<Rider>> {
    let row =
        sqlx::query_as::<_, Rider>("SELECT id, user_id, vehicle_type FROM rider WHERE user_id = ?")
            .bind(user_id)
            .fetch_optional(pool)
            .await?;
    Ok(row)
}

/// Stored push device token for a user, if any.
pub async fn device_token(pool: &SqlitePool, user_id: &str) -> RepoResult<Option<String>> {
    let row: Option<Option<String>> =
        sqlx::query_scalar("SELECT device_token FROM user WHERE id = ?")
            .bind(user_id)
            .fetch_optional(pool)
            .await?;
    Ok(row.flatten())
}

pub async fn save_device_token(
    pool: &SqlitePool,
    user_id: &str,
    token: &str,
) -> RepoResult<()> {
    let result = sqlx::query("UPDATE user SET device_token = ? WHERE id = ?")
        .bind(token)
        .bind(user_id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("User {user_id} not found")));
    }
    Ok(())
}
