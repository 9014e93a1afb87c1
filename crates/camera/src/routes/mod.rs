//! HTTP route handlers.

pub mod cameras;
pub mod photos;

use axum::Router;
use orderly_kernel::middleware::RouteGroup;
use orderly_kernel::routes::tasks;

use crate::state::AppState;

/// Camera and photo routes are rate limited and tagged. Task polling is
/// only tagged, so waiting on a long timelapse never spends the quota.
/// No auth on either.
pub fn api_router(state: &AppState) -> Router<AppState> {
    let kernel = state.kernel();
    let routes = Router::new()
        .merge(cameras::router())
        .merge(photos::router());
    let limited = RouteGroup::new(kernel)
        .rate_limited(kernel.rate_limit_policy())
        .conditional()
        .apply(routes);

    let polling = RouteGroup::new(kernel).conditional().apply(tasks::router());

    limited.merge(polling)
}
