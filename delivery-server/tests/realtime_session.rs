//! Realtime session protocol over real TCP connections: welcome, auth,
//! retry, echo, envelope redispatch and the authentication timeout.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use serde_json::{Value, json};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::{sleep, timeout};
use tokio_util::sync::CancellationToken;

use delivery_server::auth::{JwtConfig, JwtService};
use delivery_server::realtime::{
    ConnectionRegistry, RealtimeGateway, read_frame, write_frame,
};
use shared::models::Role;

const SECRET: &str = "test-secret-test-secret-test-secret";

fn jwt_service() -> Arc<JwtService> {
    Arc::new(JwtService::with_config(JwtConfig {
        secret: SECRET.to_string(),
        expiration_minutes: 60,
    }))
}

async fn start_gateway(
    auth_window: Duration,
) -> (SocketAddr, Arc<ConnectionRegistry>, Arc<JwtService>, CancellationToken) {
    let registry = Arc::new(ConnectionRegistry::new());
    let jwt = jwt_service();
    let shutdown = CancellationToken::new();
    let gateway = RealtimeGateway::new(registry.clone(), jwt.clone(), auth_window, shutdown.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        gateway.run(listener).await;
    });

    (addr, registry, jwt, shutdown)
}

async fn read_event(stream: &mut TcpStream) -> Value {
    timeout(Duration::from_secs(2), read_frame(stream))
        .await
        .expect("timed out waiting for event")
        .expect("failed to read event")
}

#[tokio::test]
async fn test_welcome_then_auth_registers_connection() {
    let (addr, registry, jwt, shutdown) = start_gateway(Duration::from_secs(10)).await;
    let mut stream = TcpStream::connect(addr).await.unwrap();

    let welcome = read_event(&mut stream).await;
    assert_eq!(welcome["event"], "welcome");
    assert!(welcome["data"]["client_id"].is_string());
    assert!(welcome["data"]["timestamp"].is_string());

    let token = jwt.generate_token("cust-1", "cust-1@example.com", Role::User).unwrap();
    write_frame(&mut stream, &json!({"event": "auth", "data": {"token": token}}))
        .await
        .unwrap();

    let result = read_event(&mut stream).await;
    assert_eq!(result["event"], "auth_result");
    assert_eq!(result["data"]["success"], true);
    assert_eq!(result["data"]["user"]["id"], "cust-1");
    assert_eq!(result["data"]["user"]["role"], "USER");

    assert!(registry.lookup("cust-1").is_some());
    shutdown.cancel();
}

#[tokio::test]
async fn test_auth_failure_leaves_connection_open_for_retry() {
    let (addr, registry, jwt, shutdown) = start_gateway(Duration::from_secs(10)).await;
    let mut stream = TcpStream::connect(addr).await.unwrap();
    read_event(&mut stream).await;

    // Garbage token: rejected, but the session stays CONNECTED.
    write_frame(&mut stream, &json!({"event": "auth", "data": "not-a-jwt"}))
        .await
        .unwrap();
    let result = read_event(&mut stream).await;
    assert_eq!(result["data"]["success"], false);
    assert!(result["data"]["error"].is_string());
    assert!(registry.lookup("rider-user-1").is_none());

    // Missing token shape.
    write_frame(&mut stream, &json!({"event": "auth", "data": {"credential": "x"}}))
        .await
        .unwrap();
    let result = read_event(&mut stream).await;
    assert_eq!(result["data"]["success"], false);

    // Retry with a valid token succeeds on the same connection.
    let token = jwt
        .generate_token("rider-user-1", "rider-user-1@example.com", Role::Rider)
        .unwrap();
    write_frame(&mut stream, &json!({"event": "auth", "data": token})).await.unwrap();
    let result = read_event(&mut stream).await;
    assert_eq!(result["data"]["success"], true);

    assert!(registry.lookup_in_role("rider-user-1", Role::Rider).is_some());
    assert_eq!(registry.rider_count(), 1);
    shutdown.cancel();
}

#[tokio::test]
async fn test_echo_works_without_affecting_auth() {
    let (addr, registry, _jwt, shutdown) = start_gateway(Duration::from_secs(10)).await;
    let mut stream = TcpStream::connect(addr).await.unwrap();
    read_event(&mut stream).await;

    write_frame(&mut stream, &json!({"event": "echo", "data": {"ping": 42}}))
        .await
        .unwrap();
    let response = read_event(&mut stream).await;
    assert_eq!(response["event"], "echo_response");
    assert_eq!(response["data"]["received"]["ping"], 42);
    assert_eq!(response["data"]["status"], "success");

    // Echo is a liveness probe, not authentication.
    assert!(registry.lookup("cust-1").is_none());
    shutdown.cancel();
}

#[tokio::test]
async fn test_envelope_frames_are_redispatched() {
    let (addr, registry, jwt, shutdown) = start_gateway(Duration::from_secs(10)).await;
    let mut stream = TcpStream::connect(addr).await.unwrap();
    read_event(&mut stream).await;

    let token = jwt.generate_token("cust-1", "cust-1@example.com", Role::User).unwrap();
    write_frame(
        &mut stream,
        &json!({
            "event": "message",
            "data": {"event": "auth", "data": {"token": token}}
        }),
    )
    .await
    .unwrap();

    let result = read_event(&mut stream).await;
    assert_eq!(result["event"], "auth_result");
    assert_eq!(result["data"]["success"], true);
    assert!(registry.lookup("cust-1").is_some());
    shutdown.cancel();
}

#[tokio::test]
async fn test_unauthenticated_connection_times_out() {
    let (addr, registry, _jwt, shutdown) = start_gateway(Duration::from_millis(200)).await;
    let mut stream = TcpStream::connect(addr).await.unwrap();
    read_event(&mut stream).await;

    let event = read_event(&mut stream).await;
    assert_eq!(event["event"], "timeout");
    assert_eq!(event["data"]["message"], "Authentication timeout");

    // Transport is force-closed afterwards.
    let next = timeout(Duration::from_secs(2), read_frame(&mut stream)).await;
    assert!(matches!(next, Ok(Err(_))), "connection should be closed");

    assert!(registry.lookup("cust-1").is_none());
    shutdown.cancel();
}

#[tokio::test]
async fn test_authenticated_connection_survives_the_window() {
    let (addr, _registry, jwt, shutdown) = start_gateway(Duration::from_millis(300)).await;
    let mut stream = TcpStream::connect(addr).await.unwrap();
    read_event(&mut stream).await;

    let token = jwt.generate_token("cust-1", "cust-1@example.com", Role::User).unwrap();
    write_frame(&mut stream, &json!({"event": "auth", "data": {"token": token}}))
        .await
        .unwrap();
    read_event(&mut stream).await;

    sleep(Duration::from_millis(500)).await;

    // Past the auth window and still serving events.
    write_frame(&mut stream, &json!({"event": "echo", "data": "still here"}))
        .await
        .unwrap();
    let response = read_event(&mut stream).await;
    assert_eq!(response["event"], "echo_response");
    shutdown.cancel();
}

#[tokio::test]
async fn test_disconnect_evicts_from_registry() {
    let (addr, registry, jwt, shutdown) = start_gateway(Duration::from_secs(10)).await;
    let mut stream = TcpStream::connect(addr).await.unwrap();
    read_event(&mut stream).await;

    let token = jwt
        .generate_token("rider-user-1", "rider-user-1@example.com", Role::Rider)
        .unwrap();
    write_frame(&mut stream, &json!({"event": "auth", "data": {"token": token}}))
        .await
        .unwrap();
    read_event(&mut stream).await;
    assert!(registry.lookup("rider-user-1").is_some());

    drop(stream);

    let mut evicted = false;
    for _ in 0..40 {
        if registry.lookup("rider-user-1").is_none() {
            evicted = true;
            break;
        }
        sleep(Duration::from_millis(50)).await;
    }
    assert!(evicted, "disconnect must remove the party from the registry");
    assert_eq!(registry.rider_count(), 0);
    shutdown.cancel();
}
