//! Realtime wire protocol
//!
//! Every frame is a JSON object `{"event": <name>, "data": <payload>}` in
//! both directions. Inbound frames resolve ONCE at the transport boundary
//! into the closed [`ClientEvent`] union; handlers never shape-check raw
//! JSON themselves.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::models::{OrderView, Role};

/// Authenticated identity echoed back in `auth_result`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthedUser {
    pub id: String,
    pub role: Role,
}

/// Server → client events.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerEvent {
    Welcome {
        message: String,
        client_id: Uuid,
        timestamp: String,
    },
    AuthResult {
        success: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        user: Option<AuthedUser>,
        #[serde(skip_serializing_if = "Option::is_none")]
        error: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    Timeout {
        message: String,
    },
    EchoResponse {
        received: Value,
        status: String,
        timestamp: String,
    },
    NewOrder(OrderView),
    OrderUpdated(OrderView),
    NewOrderAvailable(OrderView),
    OrderAssigned(OrderView),
}

impl ServerEvent {
    pub fn auth_success(user: AuthedUser) -> Self {
        ServerEvent::AuthResult {
            success: true,
            user: Some(user),
            error: None,
            message: Some("Authentication successful".to_string()),
        }
    }

    pub fn auth_failure(error: impl Into<String>) -> Self {
        ServerEvent::AuthResult {
            success: false,
            user: None,
            error: Some(error.into()),
            message: None,
        }
    }
}

/// Client → server events, resolved from a raw frame.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientEvent {
    /// `auth` with the extracted credential token (`None` when the payload
    /// carried no recognizable token).
    Auth { token: Option<String> },
    /// Liveness probe; never affects authentication state.
    Echo { data: Value },
    /// Anything else; carried for diagnostics.
    Unknown { event: String },
}

impl ClientEvent {
    /// Resolve a raw inbound frame.
    ///
    /// Some client libraries wrap the real event in an `{event, data}`
    /// envelope under an arbitrary outer event name; one level of
    /// unwrapping is applied before giving up.
    pub fn from_frame(frame: &Value) -> Self {
        Self::resolve(frame, true)
    }

    fn resolve(frame: &Value, allow_envelope: bool) -> Self {
        let event = frame.get("event").and_then(Value::as_str).unwrap_or("");
        let data = frame.get("data").cloned().unwrap_or(Value::Null);

        match event {
            "auth" => ClientEvent::Auth {
                token: extract_token(&data),
            },
            "echo" => ClientEvent::Echo { data },
            other => {
                if allow_envelope && data.get("event").is_some() && data.get("data").is_some() {
                    return Self::resolve(&data, false);
                }
                ClientEvent::Unknown {
                    event: other.to_string(),
                }
            }
        }
    }
}

/// Pull the credential token out of an `auth` payload. Accepts a bare
/// string, `{token}`, or `[{token}]`.
fn extract_token(data: &Value) -> Option<String> {
    match data {
        Value::String(s) => Some(s.clone()),
        Value::Object(map) => map.get("token").and_then(Value::as_str).map(str::to_owned),
        Value::Array(items) => items
            .first()
            .and_then(|v| v.get("token"))
            .and_then(Value::as_str)
            .map(str::to_owned),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_server_event_shape() {
        let event = ServerEvent::Timeout {
            message: "Authentication timeout".to_string(),
        };
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["event"], "timeout");
        assert_eq!(value["data"]["message"], "Authentication timeout");
    }

    #[test]
    fn test_auth_token_shapes() {
        let bare = json!({"event": "auth", "data": "tok-1"});
        let object = json!({"event": "auth", "data": {"token": "tok-2"}});
        let array = json!({"event": "auth", "data": [{"token": "tok-3"}]});
        let missing = json!({"event": "auth", "data": {"other": 1}});

        assert_eq!(
            ClientEvent::from_frame(&bare),
            ClientEvent::Auth { token: Some("tok-1".into()) }
        );
        assert_eq!(
            ClientEvent::from_frame(&object),
            ClientEvent::Auth { token: Some("tok-2".into()) }
        );
        assert_eq!(
            ClientEvent::from_frame(&array),
            ClientEvent::Auth { token: Some("tok-3".into()) }
        );
        assert_eq!(
            ClientEvent::from_frame(&missing),
            ClientEvent::Auth { token: None }
        );
    }

    #[test]
    fn test_envelope_redispatch() {
        let wrapped = json!({
            "event": "message",
            "data": {"event": "echo", "data": {"ping": 1}}
        });
        assert_eq!(
            ClientEvent::from_frame(&wrapped),
            ClientEvent::Echo { data: json!({"ping": 1}) }
        );

        // One level only: a double-wrapped frame stays unknown.
        let double = json!({
            "event": "message",
            "data": {"event": "message", "data": {"event": "echo", "data": {}}}
        });
        assert_eq!(
            ClientEvent::from_frame(&double),
            ClientEvent::Unknown { event: "message".into() }
        );
    }

    #[test]
    fn test_unknown_event() {
        let frame = json!({"event": "subscribe", "data": {"topic": "orders"}});
        assert_eq!(
            ClientEvent::from_frame(&frame),
            ClientEvent::Unknown { event: "subscribe".into() }
        );
    }
}
