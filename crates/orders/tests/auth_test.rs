//! Integration tests for token issuance and bearer authentication.

mod common;

use axum::http::{StatusCode, header};
use common::{PASSWORD, TestApp, USERNAME};
use orderly_kernel::KernelConfig;
use orderly_test_utils::{TestRequest, assert, body_json, header_str};

#[tokio::test]
async fn issues_a_token_for_valid_credentials() {
    let app = TestApp::new();

    let response = app
        .request(TestRequest::get("/auth/token").basic(USERNAME, PASSWORD).build())
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        header_str(&response, "cache-control"),
        Some("private, no-cache, no-store, max-age=0")
    );
    let body = body_json(response).await;
    assert!(!body["token"].as_str().unwrap().is_empty());
    assert_eq!(body["expiration"], 3600);
}

#[tokio::test]
async fn legacy_token_route_is_an_alias() {
    let app = TestApp::new();

    let response = app
        .request(TestRequest::get("/get-auth-token").basic(USERNAME, PASSWORD).build())
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let token = body_json(response).await["token"].as_str().unwrap().to_string();

    let response = app
        .request(TestRequest::get("/api/v1/customers/").bearer(&token).build())
        .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn bad_credentials_are_rejected() {
    let app = TestApp::new();

    for request in [
        TestRequest::get("/auth/token").basic(USERNAME, "dog"),
        TestRequest::get("/auth/token").basic("eve", PASSWORD),
        TestRequest::get("/auth/token"),
        TestRequest::get("/auth/token").header("authorization", "Basic not-base64!"),
    ] {
        let response = app.request(request.build()).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            header_str(&response, header::WWW_AUTHENTICATE.as_str()),
            Some("Basic realm=\"Authentication Required\"")
        );
        let body = body_json(response).await;
        assert::error_body(&body, 401, "invalid credentials");
    }
}

#[tokio::test]
async fn resources_require_a_bearer_token() {
    let app = TestApp::new();

    let response = app.request(TestRequest::get("/api/v1/customers/").build()).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert::error_body(&body, 401, "authentication token required");

    // Basic credentials are only good for the token endpoint.
    let response = app
        .request(
            TestRequest::get("/api/v1/customers/")
                .basic(USERNAME, PASSWORD)
                .build(),
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .request(TestRequest::get("/api/v1/customers/").bearer("bogus").build())
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert::error_body(&body, 401, "invalid authentication token");
}

#[tokio::test]
async fn writes_are_rejected_without_a_token() {
    let app = TestApp::new();

    let response = app
        .request(
            TestRequest::post("/api/v1/customers/")
                .json(serde_json::json!({"name": "mallory"}))
                .build(),
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(app.state.store().customers().is_empty());
}

#[tokio::test]
async fn tokens_from_another_secret_are_invalid() {
    let app = TestApp::new();

    let mut other = KernelConfig::new(common::PUBLIC_URL);
    other.secret_key = Some("a different secret".to_string());
    let other = TestApp::with_config(other);
    let foreign = other.login().await;

    let response = app
        .request(TestRequest::get("/api/v1/products/").bearer(&foreign).build())
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn expired_tokens_are_rejected() {
    let app = TestApp::new();
    let token = app
        .state
        .kernel()
        .tokens()
        .issue_at("1", 60, chrono::Utc::now().timestamp() - 3600)
        .unwrap();

    let response = app
        .request(TestRequest::get("/api/v1/orders/").bearer(&token).build())
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert::error_body(&body, 401, "authentication token has expired");
}
