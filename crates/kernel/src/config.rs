//! Kernel configuration loaded from environment variables.
//!
//! Each binary embeds a [`KernelConfig`] in its own `Config` and adds the
//! settings specific to it.

use std::env;

use anyhow::{Context, Result};

use crate::middleware::RateLimitPolicy;

/// Settings shared by every service built on the kernel.
#[derive(Debug, Clone)]
pub struct KernelConfig {
    /// Base URL for absolute links (default: `http://localhost:<port>`).
    pub public_url: String,

    /// HMAC key for token signing. `None` when `SECRET_KEY` is unset.
    pub secret_key: Option<String>,

    /// Lifetime of issued tokens in seconds (default: 3600).
    pub token_ttl_secs: i64,

    /// Whether rate limiting is enforced (default: true).
    pub rate_limit_enabled: bool,

    /// Quota applied to rate-limited route groups (default: 100 per 60s).
    pub rate_limit: RateLimitPolicy,

    /// Upper bound and default for `per_page` (default: 25).
    pub max_per_page: u64,

    /// Remove finished background tasks on first read (default: false).
    pub task_auto_delete: bool,
}

impl KernelConfig {
    /// Defaults for a service reachable at `public_url`.
    pub fn new(public_url: impl Into<String>) -> Self {
        Self {
            public_url: public_url.into(),
            secret_key: None,
            token_ttl_secs: 3600,
            rate_limit_enabled: true,
            rate_limit: RateLimitPolicy::default(),
            max_per_page: 25,
            task_auto_delete: false,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// `port` is only used to derive the default `PUBLIC_URL`.
    pub fn from_env(port: u16) -> Result<Self> {
        let public_url =
            env::var("PUBLIC_URL").unwrap_or_else(|_| format!("http://localhost:{port}"));

        let secret_key = env::var("SECRET_KEY").ok().filter(|s| !s.is_empty());

        let token_ttl_secs = env::var("TOKEN_TTL_SECS")
            .unwrap_or_else(|_| "3600".to_string())
            .parse()
            .context("TOKEN_TTL_SECS must be a valid integer")?;

        let rate_limit_enabled = env::var("RATE_LIMIT_ENABLED")
            .map(|v| parse_flag(&v))
            .unwrap_or(Ok(true))
            .context("RATE_LIMIT_ENABLED must be true or false")?;

        let limit = env::var("RATE_LIMIT_REQUESTS")
            .unwrap_or_else(|_| "100".to_string())
            .parse()
            .context("RATE_LIMIT_REQUESTS must be a valid u32")?;

        let period_secs = env::var("RATE_LIMIT_PERIOD_SECS")
            .unwrap_or_else(|_| "60".to_string())
            .parse()
            .context("RATE_LIMIT_PERIOD_SECS must be a valid u64")?;

        let max_per_page = env::var("MAX_PER_PAGE")
            .unwrap_or_else(|_| "25".to_string())
            .parse()
            .context("MAX_PER_PAGE must be a valid u64")?;

        let task_auto_delete = env::var("TASK_AUTO_DELETE")
            .map(|v| parse_flag(&v))
            .unwrap_or(Ok(false))
            .context("TASK_AUTO_DELETE must be true or false")?;

        Ok(Self {
            public_url,
            secret_key,
            token_ttl_secs,
            rate_limit_enabled,
            rate_limit: RateLimitPolicy::new(limit, period_secs),
            max_per_page,
            task_auto_delete,
        })
    }

    /// The signing key, failing when none was configured.
    pub fn require_secret(&self) -> Result<&str> {
        self.secret_key
            .as_deref()
            .context("SECRET_KEY environment variable is required")
    }
}

fn parse_flag(value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => anyhow::bail!("unrecognised boolean {other:?}"),
    }
}
