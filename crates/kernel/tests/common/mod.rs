#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Common test utilities for kernel integration tests.
//!
//! Builds a small service on the REAL kernel pipeline: a paginated widget
//! collection (also mounted under the nested `/v2` prefix), a tagged widget
//! resource and a slow operation tracked as a background task.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::extract::{FromRef, Path, State};
use axum::http::Request;
use axum::response::Response;
use axum::routing::{get, post};
use serde_json::{Value, json};
use tokio::sync::Semaphore;
use tower::ServiceExt;

use orderly_kernel::middleware::{RateLimitPolicy, RouteGroup};
use orderly_kernel::routes;
use orderly_kernel::{
    ApiResponse, AppError, AppResult, KernelConfig, KernelState, Paginated, Resource,
};

pub const PUBLIC_URL: &str = "http://widgets.test";

#[derive(Debug, Clone)]
pub struct Widget {
    pub id: u32,
}

impl Resource for Widget {
    fn url(&self) -> String {
        format!("{PUBLIC_URL}/widgets/{}", self.id)
    }

    fn export_data(&self) -> Value {
        json!({"self_url": self.url(), "name": format!("widget{}", self.id)})
    }
}

#[derive(Clone)]
pub struct TestState {
    kernel: KernelState,
    widgets: Arc<Vec<Widget>>,
    /// Slow operations wait for a permit before finishing.
    gate: Arc<Semaphore>,
}

impl FromRef<TestState> for KernelState {
    fn from_ref(state: &TestState) -> Self {
        state.kernel.clone()
    }
}

async fn list_widgets(State(state): State<TestState>, page: Paginated) -> ApiResponse {
    ApiResponse::Body(page.paginate(state.widgets.as_ref()).into_body("widgets"))
}

async fn get_widget(State(state): State<TestState>, Path(id): Path<u32>) -> AppResult<ApiResponse> {
    state
        .widgets
        .iter()
        .find(|w| w.id == id)
        .map(ApiResponse::resource)
        .ok_or_else(AppError::not_found)
}

async fn start_slow(State(state): State<TestState>) -> ApiResponse {
    let gate = state.gate.clone();
    state.kernel.start_task(async move {
        let permit = gate
            .acquire()
            .await
            .map_err(|e| AppError::Internal(e.into()))?;
        permit.forget();
        Ok::<_, AppError>(ApiResponse::created(&format!("{PUBLIC_URL}/widgets/0")))
    })
}

/// Test application wrapper using the REAL kernel middleware.
pub struct TestApp {
    router: Router,
    pub kernel: KernelState,
    gate: Arc<Semaphore>,
}

impl TestApp {
    pub fn new(widgets: u32, policy: RateLimitPolicy, auto_delete: bool) -> Self {
        let mut config = KernelConfig::new(PUBLIC_URL);
        config.secret_key = Some("kernel-test-secret".to_string());
        config.rate_limit = policy;
        config.task_auto_delete = auto_delete;
        let kernel = KernelState::new(&config).unwrap();

        let gate = Arc::new(Semaphore::new(0));
        let state = TestState {
            kernel: kernel.clone(),
            widgets: Arc::new((0..widgets).map(|id| Widget { id }).collect()),
            gate: gate.clone(),
        };

        let api = Router::new()
            .route("/widgets/", get(list_widgets))
            .route("/widgets/{id}", get(get_widget))
            .route("/slow", post(start_slow))
            .nest("/v2", Router::new().route("/widgets/", get(list_widgets)))
            .merge(routes::tasks::router());
        let api = RouteGroup::new(&kernel)
            .authenticated()
            .rate_limited(kernel.rate_limit_policy())
            .conditional()
            .apply(api);

        let router = routes::with_fallbacks(api).with_state(state);

        Self {
            router,
            kernel,
            gate,
        }
    }

    pub async fn request(&self, request: Request<Body>) -> Response {
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub fn token(&self) -> String {
        self.kernel.tokens().issue_default("tester").unwrap()
    }

    /// Let one pending slow operation finish.
    pub fn release_one(&self) {
        self.gate.add_permits(1);
    }

    /// Poll a task URL until it stops answering 202.
    pub async fn wait_for_task(&self, path: &str, token: &str) -> Response {
        for _ in 0..200 {
            let response = self
                .request(
                    orderly_test_utils::TestRequest::get(path)
                        .bearer(token)
                        .build(),
                )
                .await;
            if response.status() != axum::http::StatusCode::ACCEPTED {
                return response;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("task at {path} never finished");
    }
}

/// Path part of an absolute URL emitted by the test service.
pub fn path_of(url: &str) -> &str {
    url.strip_prefix(PUBLIC_URL).unwrap()
}
