//! Orderly orders service.
//!
//! A resource-oriented API over customers, products, orders and order
//! items. Every resource route runs through the kernel pipeline; tokens
//! are obtained from `/auth/token` with HTTP Basic credentials.

pub mod config;
pub mod links;
pub mod models;
pub mod routes;
pub mod state;
pub mod store;

use axum::Router;
use orderly_kernel::routes as kernel_routes;

pub use config::Config;
pub use state::AppState;

/// Build the complete service router.
pub fn app(state: AppState) -> Router {
    let router = Router::new()
        .merge(routes::auth::router(&state))
        .merge(routes::api_router(&state))
        .merge(kernel_routes::health::router());

    kernel_routes::with_fallbacks(router).with_state(state)
}
