#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Common test utilities for orders API integration tests.
//!
//! This module builds the REAL service router on an in-memory store and
//! drives it with `oneshot`, so tests verify actual behavior.

#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode, header};
use axum::response::Response;
use serde_json::Value;
use tower::ServiceExt;

use orderly_kernel::KernelConfig;
use orderly_kernel::middleware::RateLimitPolicy;
use orderly_orders::AppState;
use orderly_test_utils::{TestRequest, body_bytes, body_json};

/// Base URL every emitted link is rooted at.
pub const PUBLIC_URL: &str = "http://example.com";

pub const USERNAME: &str = "dave";
pub const PASSWORD: &str = "cat";

/// Test application wrapper using the REAL routes and state.
pub struct TestApp {
    router: Router,
    pub state: AppState,
}

impl TestApp {
    /// An app with rate limiting disabled.
    pub fn new() -> Self {
        let mut config = base_config();
        config.rate_limit_enabled = false;
        Self::with_config(config)
    }

    /// An app enforcing `policy` on every rate-limited group.
    pub fn rate_limited(policy: RateLimitPolicy) -> Self {
        let mut config = base_config();
        config.rate_limit = policy;
        Self::with_config(config)
    }

    pub fn with_config(config: KernelConfig) -> Self {
        let state = AppState::new(&config).unwrap();
        state.add_user(USERNAME, PASSWORD).unwrap();
        let router = orderly_orders::app(state.clone());
        Self { router, state }
    }

    pub async fn request(&self, request: Request<Body>) -> Response {
        self.router.clone().oneshot(request).await.unwrap()
    }

    /// Obtain a token through the token endpoint.
    pub async fn login(&self) -> String {
        let response = self
            .request(TestRequest::get("/auth/token").basic(USERNAME, PASSWORD).build())
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        body_json(response).await["token"]
            .as_str()
            .unwrap()
            .to_string()
    }

    /// An authenticated client for the resource API.
    pub async fn client(&self) -> TestClient<'_> {
        let token = self.login().await;
        TestClient { app: self, token }
    }
}

fn base_config() -> KernelConfig {
    let mut config = KernelConfig::new(PUBLIC_URL);
    config.secret_key = Some("top-secret!".to_string());
    config
}

/// Issues authenticated JSON requests by absolute URL or path.
pub struct TestClient<'a> {
    app: &'a TestApp,
    pub token: String,
}

/// Status, headers and decoded body of one response.
#[derive(Debug)]
pub struct Reply {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub json: Value,
}

impl Reply {
    /// The `Location` header.
    pub fn location(&self) -> String {
        self.headers[header::LOCATION].to_str().unwrap().to_string()
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

impl TestClient<'_> {
    pub async fn send(&self, request: TestRequest) -> Reply {
        let response = self.app.request(request.bearer(&self.token).build()).await;
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = body_bytes(response).await;
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        Reply {
            status,
            headers,
            json,
        }
    }

    pub async fn get(&self, url: &str) -> Reply {
        self.send(TestRequest::get(path(url))).await
    }

    pub async fn post(&self, url: &str, data: Value) -> Reply {
        self.send(TestRequest::post(path(url)).json(data)).await
    }

    pub async fn put(&self, url: &str, data: Value) -> Reply {
        self.send(TestRequest::put(path(url)).json(data)).await
    }

    pub async fn delete(&self, url: &str) -> Reply {
        self.send(TestRequest::delete(path(url))).await
    }
}

/// Path part of an absolute URL emitted by the service.
pub fn path(url: &str) -> &str {
    url.strip_prefix(PUBLIC_URL).unwrap_or(url)
}
