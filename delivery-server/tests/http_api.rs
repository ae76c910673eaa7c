//! HTTP surface: bearer auth, role gates and device-token registration.

mod common;

use common::*;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use tower::ServiceExt;

use delivery_server::api;
use delivery_server::auth::JwtConfig;
use delivery_server::core::{Config, ServerState};
use delivery_server::db::DbService;
use delivery_server::db::repository::party;
use shared::models::Role;

const SECRET: &str = "test-secret-test-secret-test-secret";

async fn test_state() -> ServerState {
    let db = DbService::new_in_memory().await.expect("in-memory db");
    seed_user(&db.pool, CUSTOMER, "Alice", Role::User, None).await;
    seed_user(&db.pool, RESTAURANT_OWNER, "Carla", Role::Restaurant, None).await;

    let config = Config {
        http_port: 0,
        realtime_port: 0,
        database_path: ":memory:".to_string(),
        jwt: JwtConfig {
            secret: SECRET.to_string(),
            expiration_minutes: 60,
        },
        auth_window_secs: 10,
        push_endpoint: None,
        push_server_key: None,
        environment: "test".to_string(),
        log_dir: None,
    };
    ServerState::with_pool(config, db.pool)
}

fn bearer(state: &ServerState, user_id: &str, role: Role) -> String {
    let token = state
        .jwt
        .generate_token(user_id, &format!("{user_id}@example.com"), role)
        .unwrap();
    format!("Bearer {token}")
}

#[tokio::test]
async fn test_health_is_public() {
    let state = test_state().await;
    let app = api::router(state);

    let response = app
        .oneshot(Request::builder().uri("/api/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_orders_require_bearer_token() {
    let state = test_state().await;
    let app = api::router(state);

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/api/orders").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/orders")
                .header(header::AUTHORIZATION, "Bearer not-a-token")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_role_gate_rejects_before_engine() {
    let state = test_state().await;
    let auth = bearer(&state, CUSTOMER, Role::User);
    let app = api::router(state);

    // A customer token on a restaurant-only endpoint: 403, even though
    // the order does not exist.
    let response = app
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri("/api/orders/any-order/accept")
                .header(header::AUTHORIZATION, &auth)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_list_orders_ok_for_authenticated_customer() {
    let state = test_state().await;
    let auth = bearer(&state, CUSTOMER, Role::User);
    let app = api::router(state);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/orders")
                .header(header::AUTHORIZATION, &auth)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_device_token_registration() {
    let state = test_state().await;
    let auth = bearer(&state, CUSTOMER, Role::User);
    let pool = state.db.clone();
    let app = api::router(state);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri("/api/devices/token")
                .header(header::AUTHORIZATION, &auth)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"token": "device-token-1"}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let stored = party::device_token(&pool, CUSTOMER).await.unwrap();
    assert_eq!(stored.as_deref(), Some("device-token-1"));

    // Empty tokens are rejected.
    let response = app
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri("/api/devices/token")
                .header(header::AUTHORIZATION, &auth)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"token": "  "}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
