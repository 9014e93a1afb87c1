//! Rate limiting middleware with an in-memory fixed-window counter table.
//!
//! Windows are aligned to multiples of the period, so every key shares the
//! same reset boundary. A burst straddling a boundary can see up to twice
//! the limit within one period; that is accepted.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{ConnectInfo, MatchedPath, Request, State};
use axum::http::{HeaderMap, HeaderValue};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use parking_lot::Mutex;
use tracing::debug;

use crate::error::AppError;

/// Quota applied to a route group: `limit` hits per `period_secs`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitPolicy {
    pub limit: u32,
    pub period_secs: u64,
}

impl RateLimitPolicy {
    pub fn new(limit: u32, period_secs: u64) -> Self {
        Self { limit, period_secs }
    }
}

impl Default for RateLimitPolicy {
    fn default() -> Self {
        Self::new(100, 60) // 100 per minute
    }
}

/// Outcome of one hit against the limiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub remaining: u32,
    pub limit: u32,
    /// Unix timestamp at which the current window ends.
    pub reset_at: i64,
}

impl RateLimitDecision {
    /// Attach the `X-RateLimit-*` headers.
    pub fn apply(&self, headers: &mut HeaderMap) {
        headers.insert("x-ratelimit-remaining", HeaderValue::from(self.remaining));
        headers.insert("x-ratelimit-limit", HeaderValue::from(self.limit));
        headers.insert("x-ratelimit-reset", HeaderValue::from(self.reset_at));
    }
}

#[derive(Debug)]
struct Counter {
    hits: u32,
    reset_at: i64,
}

/// Process-wide fixed-window rate limiter.
pub struct RateLimiter {
    enabled: bool,
    counters: Mutex<HashMap<String, Counter>>,
}

impl RateLimiter {
    /// Create a limiter. A disabled limiter allows everything and keeps no state.
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            counters: Mutex::new(HashMap::new()),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Record a hit for `key` against the current time.
    pub fn allow(&self, key: &str, limit: u32, period_secs: u64) -> RateLimitDecision {
        self.allow_at(key, limit, period_secs, chrono::Utc::now().timestamp())
    }

    /// Record a hit for `key` as if the current time were `now`.
    pub fn allow_at(&self, key: &str, limit: u32, period_secs: u64, now: i64) -> RateLimitDecision {
        let period = i64::try_from(period_secs.max(1)).unwrap_or(i64::MAX);
        let window_end = now.div_euclid(period) * period + period;

        if !self.enabled {
            return RateLimitDecision {
                allowed: true,
                remaining: limit,
                limit,
                reset_at: window_end,
            };
        }

        let mut counters = self.counters.lock();
        counters.retain(|_, counter| counter.reset_at >= now);

        let counter = counters.entry(key.to_string()).or_insert(Counter {
            hits: 0,
            reset_at: window_end,
        });
        // A counter left over from the previous window (reset exactly now).
        if counter.reset_at != window_end {
            counter.hits = 0;
            counter.reset_at = window_end;
        }
        counter.hits = counter.hits.saturating_add(1);

        RateLimitDecision {
            allowed: counter.hits <= limit,
            remaining: limit.saturating_sub(counter.hits),
            limit,
            reset_at: counter.reset_at,
        }
    }

    /// Number of live counters (for monitoring and tests).
    pub fn len(&self) -> usize {
        self.counters.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every counter.
    pub fn reset(&self) {
        self.counters.lock().clear();
    }
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter")
            .field("enabled", &self.enabled)
            .field("counters", &self.len())
            .finish()
    }
}

/// Middleware state: the shared limiter plus the quota of one route group.
#[derive(Debug, Clone)]
pub struct RateLimitGuard {
    pub limiter: Arc<RateLimiter>,
    pub policy: RateLimitPolicy,
}

/// Middleware enforcing the group quota per `(operation, client)` key.
///
/// Rejections are answered with 429. Allowed requests carry the decision in
/// their extensions, and whatever response comes back (success or a later
/// failure) is decorated with the `X-RateLimit-*` headers.
pub async fn enforce_rate_limit(
    State(guard): State<RateLimitGuard>,
    mut request: Request,
    next: Next,
) -> Response {
    if !guard.limiter.is_enabled() {
        return next.run(request).await;
    }

    let operation = operation_name(&request);
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0);
    let client = get_client_id(peer, request.headers());
    let key = format!("{operation}/{client}");

    let decision = guard
        .limiter
        .allow(&key, guard.policy.limit, guard.policy.period_secs);

    if !decision.allowed {
        debug!(key = %key, limit = decision.limit, "rate limit exceeded");
        let mut response = AppError::RateLimited.into_response();
        decision.apply(response.headers_mut());
        return response;
    }

    request.extensions_mut().insert(decision);
    let mut response = next.run(request).await;
    decision.apply(response.headers_mut());
    response
}

/// Name of the operation a request targets: method plus route template.
pub fn operation_name(request: &Request) -> String {
    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());
    format!("{} {path}", request.method())
}

/// Get the client identifier (IP address) for rate limiting.
pub fn get_client_id(addr: Option<SocketAddr>, headers: &HeaderMap) -> String {
    // Check X-Forwarded-For header first (for proxied requests)
    if let Some(forwarded) = headers.get("x-forwarded-for")
        && let Ok(value) = forwarded.to_str()
        && let Some(ip) = value.split(',').next()
        && !ip.trim().is_empty()
    {
        return ip.trim().to_string();
    }

    if let Some(real_ip) = headers.get("x-real-ip")
        && let Ok(value) = real_ip.to_str()
    {
        return value.to_string();
    }

    addr.map(|a| a.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}
