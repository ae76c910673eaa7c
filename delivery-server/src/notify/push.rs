//! Push notification collaborator
//!
//! Resolves the target's stored device token and hands the message to a
//! pluggable gateway. Best-effort: missing tokens and provider failures
//! are logged and swallowed.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::json;
use sqlx::SqlitePool;

use shared::{AppError, AppResult};

use crate::db::repository::party;

/// Push message payload
#[derive(Debug, Clone, Serialize)]
pub struct PushMessage {
    pub title: String,
    pub body: String,
    pub data: HashMap<String, String>,
}

impl PushMessage {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            data: HashMap::new(),
        }
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }
}

/// Delivery seam for the push provider.
#[async_trait]
pub trait PushGateway: Send + Sync {
    async fn deliver(&self, device_token: &str, message: &PushMessage) -> AppResult<()>;
}

/// HTTP push provider (FCM-style endpoint).
pub struct HttpPushGateway {
    client: reqwest::Client,
    endpoint: String,
    server_key: String,
}

impl HttpPushGateway {
    pub fn new(endpoint: String, server_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint,
            server_key,
        }
    }
}

#[async_trait]
impl PushGateway for HttpPushGateway {
    async fn deliver(&self, device_token: &str, message: &PushMessage) -> AppResult<()> {
        let payload = json!({
            "to": device_token,
            "notification": {
                "title": message.title,
                "body": message.body,
            },
            "data": message.data,
        });

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.server_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| AppError::upstream(format!("Push request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(AppError::upstream(format!(
                "Push provider returned {}",
                response.status()
            )));
        }
        Ok(())
    }
}

/// Log-only gateway used when no push provider is configured.
pub struct LogPushGateway;

#[async_trait]
impl PushGateway for LogPushGateway {
    async fn deliver(&self, device_token: &str, message: &PushMessage) -> AppResult<()> {
        tracing::info!(
            device_token = %device_token,
            title = %message.title,
            body = %message.body,
            "Push delivery (log-only gateway)"
        );
        Ok(())
    }
}

/// Push service: token resolution + best-effort delivery.
#[derive(Clone)]
pub struct PushService {
    pool: SqlitePool,
    gateway: Arc<dyn PushGateway>,
}

impl PushService {
    pub fn new(pool: SqlitePool, gateway: Arc<dyn PushGateway>) -> Self {
        Self { pool, gateway }
    }

    /// Send a push to a user. Never returns an error: a failed
    /// notification must not fail the order mutation that triggered it.
    pub async fn send(&self, user_id: &str, message: PushMessage) {
        let token = match party::device_token(&self.pool, user_id).await {
            Ok(Some(token)) => token,
            Ok(None) => {
                tracing::warn!(user_id = %user_id, "No device token found for user");
                return;
            }
            Err(e) => {
                tracing::error!(user_id = %user_id, error = %e, "Failed to load device token");
                return;
            }
        };

        match self.gateway.deliver(&token, &message).await {
            Ok(()) => {
                tracing::info!(user_id = %user_id, title = %message.title, "Push notification sent");
            }
            Err(e) => {
                tracing::error!(user_id = %user_id, error = %e, "Error sending push notification");
            }
        }
    }
}
