//! Integration tests for the logout endpoint and token directory.

mod helpers;

use http::StatusCode;
use serde_json::json;

use aquahub_core::traits::TokenStore;
use aquahub_core::types::{Principal, Role};

#[tokio::test]
async fn test_logout_success() {
    let app = helpers::TestApp::new().await;
    let issued = app.tokens.issue(7, Role::Customer).await.unwrap();

    let response = app
        .request(
            "POST",
            "/api/auth/logout",
            Some(json!({ "userid": 7, "token": issued.token, "type": "customer" })),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["message"], "Logout successful!");
    assert!(app.store.is_empty());
}

#[tokio::test]
async fn test_logout_infers_role_from_token() {
    let app = helpers::TestApp::new().await;
    let issued = app.tokens.issue(4, Role::Owner).await.unwrap();

    let response = app
        .request(
            "POST",
            "/api/auth/logout",
            Some(json!({ "userid": 4, "token": issued.token })),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(
        app.store
            .find(&Principal::new(4, Role::Owner))
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn test_logout_with_superseded_token() {
    let app = helpers::TestApp::new().await;
    let old = app.tokens.issue(7, Role::Customer).await.unwrap();
    let current = app.tokens.issue(7, Role::Customer).await.unwrap();

    let response = app
        .request(
            "POST",
            "/api/auth/logout",
            Some(json!({ "userid": 7, "token": old.token, "type": "customer" })),
        )
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["error"], "INVALID_TOKEN");

    // The current session survives.
    let principal = Principal::new(7, Role::Customer);
    assert!(app.tokens.validate(&principal, &current.token).await.is_ok());
}

#[tokio::test]
async fn test_logout_missing_fields() {
    let app = helpers::TestApp::new().await;

    let response = app
        .request("POST", "/api/auth/logout", Some(json!({ "token": "abc" })))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = app
        .request("POST", "/api/auth/logout", Some(json!({ "userid": 1 })))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = app.request("POST", "/api/auth/logout", None).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_logout_unknown_role() {
    let app = helpers::TestApp::new().await;
    let issued = app.tokens.issue(7, Role::Customer).await.unwrap();

    let response = app
        .request(
            "POST",
            "/api/auth/logout",
            Some(json!({ "userid": 7, "token": issued.token, "type": "manager" })),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(app.store.len(), 1);
}

#[tokio::test]
async fn test_logout_without_session() {
    let app = helpers::TestApp::new().await;
    let issued = app.tokens.issue(7, Role::Customer).await.unwrap();

    // Wrong account id for a genuine token.
    let response = app
        .request(
            "POST",
            "/api/auth/logout",
            Some(json!({ "userid": 8, "token": issued.token, "type": "customer" })),
        )
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(app.store.len(), 1);
}

#[tokio::test]
async fn test_logout_with_numeric_role_code() {
    let app = helpers::TestApp::new().await;
    let issued = app.tokens.issue(5, Role::Staff).await.unwrap();

    let response = app
        .request(
            "POST",
            "/api/auth/logout",
            Some(json!({ "userid": 5, "token": issued.token, "type": 3 })),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(app.store.is_empty());
}
