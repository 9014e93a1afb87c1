#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Common test utilities for camera API integration tests.
//!
//! Builds the REAL router over a temporary photo directory. Besides the
//! emulated camera, a gated camera is registered whose captures only finish
//! when the test releases them.

#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use axum::body::{Body, Bytes};
use axum::http::{HeaderMap, Request, StatusCode, header};
use axum::response::Response;
use serde_json::Value;
use tempfile::TempDir;
use tokio::sync::Semaphore;
use tower::ServiceExt;

use orderly_camera::AppState;
use orderly_camera::camera::{Camera, CameraError, CameraRegistry, FakeCamera};
use orderly_kernel::KernelConfig;
use orderly_kernel::middleware::RateLimitPolicy;
use orderly_test_utils::{TestRequest, body_bytes};

pub const PUBLIC_URL: &str = "http://camera.test";

/// A camera whose captures block until a permit is released.
pub struct GatedCamera {
    inner: FakeCamera,
    gate: Arc<Semaphore>,
}

#[async_trait]
impl Camera for GatedCamera {
    fn id(&self) -> &str {
        "gated"
    }

    fn is_emulated(&self) -> bool {
        true
    }

    async fn capture(&self, dir: &Path) -> Result<String, CameraError> {
        self.gate.acquire().await.unwrap().forget();
        self.inner.capture(dir).await
    }
}

pub struct TestApp {
    router: Router,
    pub state: AppState,
    pub photos_dir: TempDir,
    gate: Arc<Semaphore>,
}

impl TestApp {
    pub fn new() -> Self {
        let mut config = KernelConfig::new(PUBLIC_URL);
        config.rate_limit_enabled = false;
        Self::with_config(config)
    }

    pub fn rate_limited(policy: RateLimitPolicy) -> Self {
        let mut config = KernelConfig::new(PUBLIC_URL);
        config.rate_limit = policy;
        Self::with_config(config)
    }

    pub fn with_config(config: KernelConfig) -> Self {
        let photos_dir = tempfile::tempdir().unwrap();
        let gate = Arc::new(Semaphore::new(0));
        let cameras: Vec<Arc<dyn Camera>> = vec![
            Arc::new(FakeCamera::new(Duration::ZERO)),
            Arc::new(GatedCamera {
                inner: FakeCamera::new(Duration::ZERO),
                gate: gate.clone(),
            }),
        ];
        let registry = CameraRegistry::new(photos_dir.path(), cameras).unwrap();
        let state = AppState::new(&config, registry).unwrap();
        let router = orderly_camera::app(state.clone());

        Self {
            router,
            state,
            photos_dir,
            gate,
        }
    }

    pub async fn request(&self, request: Request<Body>) -> Response {
        self.router.clone().oneshot(request).await.unwrap()
    }

    /// Send a request and decode the reply.
    pub async fn send(&self, request: TestRequest) -> Reply {
        let response = self.request(request.build()).await;
        Reply::read(response).await
    }

    pub async fn get(&self, url: &str) -> Reply {
        self.send(TestRequest::get(path(url))).await
    }

    pub async fn post(&self, url: &str) -> Reply {
        self.send(TestRequest::post(path(url))).await
    }

    pub async fn post_json(&self, url: &str, data: Value) -> Reply {
        self.send(TestRequest::post(path(url)).json(data)).await
    }

    pub async fn delete(&self, url: &str) -> Reply {
        self.send(TestRequest::delete(path(url))).await
    }

    /// Let one gated capture finish.
    pub fn release_one(&self) {
        self.gate.add_permits(1);
    }

    /// Poll a task until it stops answering 202.
    pub async fn wait_for_task(&self, task_url: &str) -> Reply {
        for _ in 0..500 {
            let reply = self.get(task_url).await;
            if reply.status != StatusCode::ACCEPTED {
                return reply;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("task {task_url} did not finish");
    }
}

/// Status, headers and body of one response. `json` is `Null` for empty
/// and non-JSON bodies.
#[derive(Debug)]
pub struct Reply {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub bytes: Bytes,
    pub json: Value,
}

impl Reply {
    async fn read(response: Response) -> Self {
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = body_bytes(response).await;
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        Self {
            status,
            headers,
            bytes,
            json,
        }
    }

    pub fn location(&self) -> String {
        self.headers[header::LOCATION].to_str().unwrap().to_string()
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

pub fn path(url: &str) -> &str {
    url.strip_prefix(PUBLIC_URL).unwrap_or(url)
}
