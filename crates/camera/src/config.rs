//! Configuration loaded from environment variables.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use orderly_kernel::KernelConfig;

/// Camera API configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port (default: 5001).
    pub port: u16,

    pub kernel: KernelConfig,

    /// Root directory for photos; each camera gets a subdirectory
    /// (default: "./photos").
    pub photos_dir: PathBuf,

    /// Delay before the emulated camera produces a photo (default: 2s).
    pub warmup: Duration,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        let port = env::var("PORT")
            .unwrap_or_else(|_| "5001".to_string())
            .parse()
            .context("PORT must be a valid u16")?;

        let kernel = KernelConfig::from_env(port)?;

        let photos_dir = env::var("PHOTOS_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./photos"));

        let warmup_ms: u64 = env::var("CAMERA_WARMUP_MS")
            .unwrap_or_else(|_| "2000".to_string())
            .parse()
            .context("CAMERA_WARMUP_MS must be a valid u64")?;

        Ok(Self {
            port,
            kernel,
            photos_dir,
            warmup: Duration::from_millis(warmup_ms),
        })
    }
}
