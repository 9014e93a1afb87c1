//! Application state shared across all handlers.

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::FromRef;
use orderly_kernel::{KernelConfig, KernelState};
use tracing::info;

use crate::links::Links;
use crate::models::Linked;
use crate::store::Store;

/// Shared application state.
///
/// Wrapped in Arc internally so Clone is cheap.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// Request pipeline state (tokens, rate limits, tasks).
    kernel: KernelState,

    /// Entity storage.
    store: Store,

    /// Resource URL builder.
    links: Links,
}

impl AppState {
    pub fn new(config: &KernelConfig) -> Result<Self> {
        let kernel = KernelState::new(config).context("failed to initialize kernel state")?;
        let links = Links::new(kernel.public_url().clone());

        Ok(Self {
            inner: Arc::new(AppStateInner {
                kernel,
                store: Store::new(),
                links,
            }),
        })
    }

    /// Create a user allowed to request tokens.
    pub fn add_user(&self, username: &str, password: &str) -> Result<()> {
        let user = self
            .inner
            .store
            .add_user(username, password)
            .context("failed to create user")?;
        info!(user_id = user.id, username = %user.username, "user created");
        Ok(())
    }

    pub fn kernel(&self) -> &KernelState {
        &self.inner.kernel
    }

    pub fn store(&self) -> &Store {
        &self.inner.store
    }

    pub fn links(&self) -> &Links {
        &self.inner.links
    }

    /// Pair a record with the link builder.
    pub fn link<T>(&self, record: T) -> Linked<T> {
        Linked::new(record, &self.inner.links)
    }

    pub fn link_all<T>(&self, records: Vec<T>) -> Vec<Linked<T>> {
        Linked::all(records, &self.inner.links)
    }
}

impl FromRef<AppState> for KernelState {
    fn from_ref(state: &AppState) -> Self {
        state.inner.kernel.clone()
    }
}
