//! Configuration loaded from environment variables.

use std::env;

use anyhow::{Context, Result};
use orderly_kernel::KernelConfig;

/// Orders API configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port (default: 5000).
    pub port: u16,

    /// Pipeline settings shared with the other services.
    pub kernel: KernelConfig,

    /// CORS allowed origins (comma-separated, default: "*").
    pub cors_allowed_origins: Vec<String>,

    /// Development account created at start-up (default: "john").
    pub admin_username: String,

    /// Password of the development account. No account is created when unset.
    pub admin_password: Option<String>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        let port = env::var("PORT")
            .unwrap_or_else(|_| "5000".to_string())
            .parse()
            .context("PORT must be a valid u16")?;

        let kernel = KernelConfig::from_env(port)?;
        kernel.require_secret()?;

        let cors_allowed_origins = env::var("CORS_ALLOWED_ORIGINS")
            .map(|v| v.split(',').map(|s| s.trim().to_string()).collect())
            .unwrap_or_else(|_| vec!["*".to_string()]);

        let admin_username = env::var("ADMIN_USERNAME").unwrap_or_else(|_| "john".to_string());
        let admin_password = env::var("ADMIN_PASSWORD").ok().filter(|p| !p.is_empty());

        Ok(Self {
            port,
            kernel,
            cors_allowed_origins,
            admin_username,
            admin_password,
        })
    }
}
