//! Routes shared by every service built on the kernel.

pub mod health;
pub mod tasks;

use axum::Router;

use crate::error::AppError;

/// Fallback for paths that match no route.
pub async fn not_found() -> AppError {
    AppError::not_found()
}

/// Fallback for a known path requested with the wrong method.
pub async fn method_not_supported() -> AppError {
    AppError::MethodNotSupported
}

/// Install the structured 404 and 405 fallbacks.
pub fn with_fallbacks<S>(router: Router<S>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router
        .fallback(not_found)
        .method_not_allowed_fallback(method_not_supported)
}
