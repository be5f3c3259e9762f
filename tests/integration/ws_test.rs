//! Integration tests for WebSocket connection and messaging.

mod helpers;

use futures::{SinkExt, StreamExt};
use http::StatusCode;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};

use aquahub_core::types::Role;

#[tokio::test]
async fn test_ws_upgrade_without_token() {
    let app = helpers::TestApp::new().await;

    let response = app.request("GET", "/ws", None).await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_ws_rejects_bad_token() {
    let app = helpers::TestApp::new().await;
    let addr = app.spawn().await;

    let err = connect_async(format!("ws://{addr}/ws?token=not-a-token"))
        .await
        .unwrap_err();
    match err {
        WsError::Http(response) => assert_eq!(response.status(), StatusCode::UNAUTHORIZED),
        other => panic!("expected HTTP rejection, got {other:?}"),
    }
    assert!(app.commander.events().is_empty());
}

#[tokio::test]
async fn test_ws_receives_relayed_payloads() {
    let app = helpers::TestApp::new().await;
    let addr = app.spawn().await;
    let issued = app.tokens.issue(7, Role::Customer).await.unwrap();

    let (mut socket, _) = connect_async(format!("ws://{addr}/ws?token={}", issued.token))
        .await
        .unwrap();
    assert!(helpers::eventually(|| app.relay.connection_count() == 1).await);
    assert_eq!(app.commander.starts("SALES"), 1);
    assert_eq!(app.commander.starts("PRODUCT"), 1);

    // Client frames are ignored.
    socket.send(Message::text("hello")).await.unwrap();

    app.notify("SALES", r#"{"sale_id":1}"#).await;
    match socket.next().await.unwrap().unwrap() {
        Message::Text(text) => assert_eq!(text.as_str(), r#"{"sale_id":1}"#),
        other => panic!("expected text frame, got {other:?}"),
    }

    socket.close(None).await.unwrap();
    assert!(helpers::eventually(|| app.relay.connection_count() == 0).await);
    assert!(helpers::eventually(|| app.commander.stops("SALES") == 1).await);
}

#[tokio::test]
async fn test_superseded_token_cannot_connect() {
    let app = helpers::TestApp::new().await;
    let addr = app.spawn().await;
    let old = app.tokens.issue(3, Role::Staff).await.unwrap();
    app.tokens.issue(3, Role::Staff).await.unwrap();

    let err = connect_async(format!("ws://{addr}/ws?token={}", old.token))
        .await
        .unwrap_err();
    assert!(matches!(err, WsError::Http(ref r) if r.status() == StatusCode::UNAUTHORIZED));
}

#[tokio::test]
async fn test_health_check() {
    let app = helpers::TestApp::new().await;

    let response = app.request("GET", "/api/health", None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "ok");
    assert_eq!(response.body["database"], "disabled");
    assert_eq!(response.body["connections"], 0);
    assert!(response.body["active_channels"].as_array().unwrap().is_empty());
    assert!(response.body["metrics"].is_object());
}
