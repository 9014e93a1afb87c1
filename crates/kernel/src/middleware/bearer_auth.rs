//! Bearer token authentication middleware.
//!
//! Checks `Authorization: Bearer <token>` headers, verifies the token and
//! stores the resulting [`Principal`] in the request extensions.

use axum::extract::{FromRequestParts, Request, State};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tracing::debug;

use crate::error::AppError;
use crate::services::token::{Principal, TokenError, TokenService};

/// Middleware that requires a valid bearer token.
///
/// A missing header, another scheme, or a token failing verification ends
/// the request with 401 before anything downstream runs.
pub async fn authenticate_bearer_token(
    State(tokens): State<TokenService>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(token) = bearer_token(request.headers()) else {
        return AppError::Unauthorized("authentication token required".to_string())
            .into_response();
    };

    let principal = match tokens.verify(token) {
        Ok(principal) => principal,
        Err(e) => {
            debug!(error = %e, "bearer token rejected");
            let message = match e {
                TokenError::Expired => "authentication token has expired",
                TokenError::Invalid => "invalid authentication token",
            };
            return AppError::Unauthorized(message.to_string()).into_response();
        }
    };

    request.extensions_mut().insert(principal);
    next.run(request).await
}

/// Extract the raw token from an `Authorization: Bearer` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

impl<S> FromRequestParts<S> for Principal
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Principal>()
            .cloned()
            .ok_or_else(|| AppError::Unauthorized("authentication token required".to_string()))
    }
}
