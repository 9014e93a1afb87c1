//! Kernel state shared across handlers and middleware.

use std::future::Future;
use std::sync::Arc;

use anyhow::Result;
use axum::extract::FromRef;

use crate::config::KernelConfig;
use crate::error::AppError;
use crate::middleware::{RateLimitGuard, RateLimitPolicy, RateLimiter};
use crate::response::{ApiResponse, PublicUrl};
use crate::services::TokenService;
use crate::tasks::{TASKS_PATH, TaskTracker};

/// Process-scoped pipeline state.
///
/// Wrapped in Arc internally so Clone is cheap. Applications embed it in
/// their own state and implement `FromRef` so kernel extractors and
/// middleware can reach it.
#[derive(Clone)]
pub struct KernelState {
    inner: Arc<KernelStateInner>,
}

struct KernelStateInner {
    /// Bearer token issuing and verification.
    tokens: TokenService,

    /// Shared fixed-window counter table.
    rate_limiter: Arc<RateLimiter>,

    /// Quota used by route groups that do not set their own.
    rate_limit: RateLimitPolicy,

    /// Background task table.
    tasks: TaskTracker,

    /// Base for every absolute URL the service emits.
    public_url: PublicUrl,

    max_per_page: u64,
}

impl KernelState {
    /// Build the kernel state from configuration.
    ///
    /// Without a configured secret, tokens are signed with a random
    /// per-process key; such tokens do not survive a restart.
    pub fn new(config: &KernelConfig) -> Result<Self> {
        let secret = match &config.secret_key {
            Some(secret) => secret.clone(),
            None => uuid::Uuid::new_v4().simple().to_string(),
        };

        Ok(Self {
            inner: Arc::new(KernelStateInner {
                tokens: TokenService::new(secret.as_bytes(), config.token_ttl_secs),
                rate_limiter: Arc::new(RateLimiter::new(config.rate_limit_enabled)),
                rate_limit: config.rate_limit,
                tasks: TaskTracker::new(config.task_auto_delete),
                public_url: PublicUrl::parse(&config.public_url)?,
                max_per_page: config.max_per_page.max(1),
            }),
        })
    }

    pub fn tokens(&self) -> &TokenService {
        &self.inner.tokens
    }

    pub fn rate_limiter(&self) -> &Arc<RateLimiter> {
        &self.inner.rate_limiter
    }

    /// Default quota for rate-limited route groups.
    pub fn rate_limit_policy(&self) -> RateLimitPolicy {
        self.inner.rate_limit
    }

    /// Middleware state for a route group using `policy`.
    pub fn rate_limit_guard(&self, policy: RateLimitPolicy) -> RateLimitGuard {
        RateLimitGuard {
            limiter: self.inner.rate_limiter.clone(),
            policy,
        }
    }

    pub fn tasks(&self) -> &TaskTracker {
        &self.inner.tasks
    }

    pub fn public_url(&self) -> &PublicUrl {
        &self.inner.public_url
    }

    pub fn max_per_page(&self) -> u64 {
        self.inner.max_per_page
    }

    /// Absolute URL of a task status resource.
    pub fn task_url(&self, id: uuid::Uuid) -> String {
        self.inner.public_url.join(&format!("{TASKS_PATH}/{id}"))
    }

    /// Start `operation` in the background and build the 202 response
    /// pointing at its status resource.
    pub fn start_task<F>(&self, operation: F) -> ApiResponse
    where
        F: Future<Output = Result<ApiResponse, AppError>> + Send + 'static,
    {
        let id = self.inner.tasks.start(operation);
        ApiResponse::accepted(&self.task_url(id))
    }
}

impl FromRef<KernelState> for TokenService {
    fn from_ref(state: &KernelState) -> Self {
        state.inner.tokens.clone()
    }
}

impl std::fmt::Debug for KernelState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KernelState")
            .field("public_url", &self.inner.public_url)
            .field("rate_limiter", &self.inner.rate_limiter)
            .field("tasks", &self.inner.tasks)
            .finish()
    }
}
