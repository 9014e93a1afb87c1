//! HTTP route handlers.

pub mod auth;
pub mod customers;
pub mod items;
pub mod orders;
pub mod products;

use axum::Router;
use axum::extract::{FromRequestParts, Path};
use axum::http::request::Parts;
use orderly_kernel::AppError;
use orderly_kernel::middleware::{RouteGroup, StageOrder};

use crate::links::API_PREFIX;
use crate::state::AppState;

/// Numeric id taken from the single path parameter of a route.
///
/// Anything that is not an unsigned integer is an unknown resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Id(pub u64);

impl<S> FromRequestParts<S> for Id
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| AppError::not_found())?;
        raw.parse().map(Id).map_err(|_| AppError::not_found())
    }
}

/// The versioned resource API: authenticated, rate limited, tagged.
pub fn api_router(state: &AppState) -> Router<AppState> {
    let kernel = state.kernel();
    let resources = Router::new()
        .merge(customers::router())
        .merge(products::router())
        .merge(orders::router())
        .merge(items::router());

    let resources = RouteGroup::new(kernel)
        .authenticated()
        .rate_limited(kernel.rate_limit_policy())
        .order(StageOrder::AuthThenRateLimit)
        .conditional()
        .apply(resources);

    Router::new().nest(API_PREFIX, resources)
}
