//! Ordered middleware chains applied per route group.
//!
//! A [`RouteGroup`] describes which stages wrap a set of routes and in what
//! order. Stages are attached with `route_layer`, so requests that match no
//! route (or the wrong method) never run them. The entity-tag stage is
//! always the innermost one, directly around the handler.

use axum::Router;
use axum::middleware::{from_fn, from_fn_with_state};

use super::bearer_auth::authenticate_bearer_token;
use super::etag::{conditional_request, no_cache};
use super::rate_limit::{RateLimitPolicy, enforce_rate_limit};
use crate::state::KernelState;

/// Relative order of authentication and rate limiting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StageOrder {
    /// Reject unauthenticated requests before they count against the quota.
    #[default]
    AuthThenRateLimit,
    /// Count every attempt, so credential probing is throttled too.
    RateLimitThenAuth,
}

/// Builder for the stages around one group of routes.
#[derive(Debug, Clone)]
pub struct RouteGroup {
    kernel: KernelState,
    authenticated: bool,
    rate_limit: Option<RateLimitPolicy>,
    order: StageOrder,
    conditional: bool,
    no_cache: bool,
}

impl RouteGroup {
    /// An empty group: no stages.
    pub fn new(kernel: &KernelState) -> Self {
        Self {
            kernel: kernel.clone(),
            authenticated: false,
            rate_limit: None,
            order: StageOrder::default(),
            conditional: false,
            no_cache: false,
        }
    }

    /// Require a valid bearer token.
    pub fn authenticated(mut self) -> Self {
        self.authenticated = true;
        self
    }

    /// Enforce `policy` per operation and client.
    pub fn rate_limited(mut self, policy: RateLimitPolicy) -> Self {
        self.rate_limit = Some(policy);
        self
    }

    pub fn order(mut self, order: StageOrder) -> Self {
        self.order = order;
        self
    }

    /// Negotiate entity tags on successful reads.
    pub fn conditional(mut self) -> Self {
        self.conditional = true;
        self
    }

    /// Mark every response as not cacheable.
    pub fn no_cache(mut self) -> Self {
        self.no_cache = true;
        self
    }

    /// Wrap every route of `router` with the configured stages.
    ///
    /// `router` must already have its routes.
    pub fn apply<S>(&self, router: Router<S>) -> Router<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        // Each route_layer call wraps the previous ones, so add innermost first.
        let mut router = router;
        if self.conditional {
            router = router.route_layer(from_fn(conditional_request));
        }

        router = match self.order {
            StageOrder::AuthThenRateLimit => self.with_auth(self.with_rate_limit(router)),
            StageOrder::RateLimitThenAuth => self.with_rate_limit(self.with_auth(router)),
        };

        if self.no_cache {
            router = router.route_layer(from_fn(no_cache));
        }
        router
    }

    fn with_auth<S>(&self, router: Router<S>) -> Router<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        if !self.authenticated {
            return router;
        }
        router.route_layer(from_fn_with_state(
            self.kernel.tokens().clone(),
            authenticate_bearer_token,
        ))
    }

    fn with_rate_limit<S>(&self, router: Router<S>) -> Router<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        let Some(policy) = self.rate_limit else {
            return router;
        };
        router.route_layer(from_fn_with_state(
            self.kernel.rate_limit_guard(policy),
            enforce_rate_limit,
        ))
    }
}
