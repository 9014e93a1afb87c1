//! Orderly camera service.
//!
//! Exposes the cameras attached to this machine and the photos they took.
//! Captures run as kernel background tasks; clients poll `/tasks/{id}`.

pub mod camera;
pub mod config;
pub mod resources;
pub mod routes;
pub mod state;

use axum::Router;
use orderly_kernel::routes as kernel_routes;

pub use config::Config;
pub use state::AppState;

/// Build the complete service router.
pub fn app(state: AppState) -> Router {
    let router = Router::new()
        .merge(routes::api_router(&state))
        .merge(kernel_routes::health::router());

    kernel_routes::with_fallbacks(router).with_state(state)
}
