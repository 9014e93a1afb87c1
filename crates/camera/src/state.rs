//! Application state shared across all handlers.

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::FromRef;
use orderly_kernel::{KernelConfig, KernelState};

use crate::camera::CameraRegistry;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    kernel: KernelState,
    cameras: CameraRegistry,
}

impl AppState {
    pub fn new(config: &KernelConfig, cameras: CameraRegistry) -> Result<Self> {
        let kernel = KernelState::new(config).context("failed to initialize kernel state")?;
        Ok(Self {
            inner: Arc::new(AppStateInner { kernel, cameras }),
        })
    }

    pub fn kernel(&self) -> &KernelState {
        &self.inner.kernel
    }

    pub fn cameras(&self) -> &CameraRegistry {
        &self.inner.cameras
    }
}

impl FromRef<AppState> for KernelState {
    fn from_ref(state: &AppState) -> Self {
        state.inner.kernel.clone()
    }
}
