//! HTTP middleware components.
//!
//! Provides bearer authentication, rate limiting, conditional-request
//! negotiation and the per-route-group composition of those stages.

pub mod bearer_auth;
pub mod etag;
pub mod pipeline;
pub mod rate_limit;

pub use bearer_auth::{authenticate_bearer_token, bearer_token};
pub use etag::{Negotiation, conditional_request, entity_tag, negotiate, no_cache};
pub use pipeline::{RouteGroup, StageOrder};
pub use rate_limit::{
    RateLimitDecision, RateLimitGuard, RateLimitPolicy, RateLimiter, enforce_rate_limit,
    get_client_id,
};
