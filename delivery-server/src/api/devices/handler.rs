//! Device API Handlers

use axum::{Json, extract::State};
use serde::Deserialize;

use shared::error::{ApiResponse, ok};
use shared::{AppError, AppResult};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::party;

#[derive(Debug, Deserialize)]
pub struct SaveTokenRequest {
    pub token: String,
}

/// Store the caller's push device token
pub async fn save_token(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<SaveTokenRequest>,
) -> AppResult<Json<ApiResponse<()>>> {
    if payload.token.trim().is_empty() {
        return Err(AppError::validation("Device token must not be empty"));
    }

    party::save_device_token(&state.db, &user.id, &payload.token).await?;
    tracing::info!(user_id = %user.id, "Device token saved");

    Ok(ok(()))
}
