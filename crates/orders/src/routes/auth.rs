//! Token issuance.
//!
//! Clients trade HTTP Basic credentials for a bearer token. The endpoint is
//! rate limited before the credentials are looked at, so password guessing
//! is throttled like any other traffic.

use axum::extract::State;
use axum::http::header::{AUTHORIZATION, WWW_AUTHENTICATE};
use axum::http::{HeaderMap, HeaderValue};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use orderly_kernel::AppError;
use orderly_kernel::middleware::RouteGroup;
use serde::Serialize;
use tracing::{debug, info};

use crate::state::AppState;

#[derive(Debug, Serialize)]
struct TokenResponse {
    token: String,
    /// Lifetime of the token in seconds.
    expiration: i64,
}

/// Issue a bearer token for valid Basic credentials.
///
/// GET /auth/token
async fn get_auth_token(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let Some((username, password)) = basic_credentials(&headers) else {
        return credentials_required();
    };

    let user = match state.store().user_by_username(&username) {
        Some(user) if user.verify_password(&password) => user,
        _ => {
            debug!(username = %username, "token request with bad credentials");
            return credentials_required();
        }
    };

    let tokens = state.kernel().tokens();
    match tokens.issue_default(&user.id.to_string()) {
        Ok(token) => {
            info!(user_id = user.id, "token issued");
            Json(TokenResponse {
                token,
                expiration: tokens.default_ttl(),
            })
            .into_response()
        }
        Err(e) => AppError::Internal(e).into_response(),
    }
}

fn credentials_required() -> Response {
    let mut response = AppError::Unauthorized("invalid credentials".to_string()).into_response();
    response.headers_mut().insert(
        WWW_AUTHENTICATE,
        HeaderValue::from_static("Basic realm=\"Authentication Required\""),
    );
    response
}

/// Decode `Authorization: Basic <base64(username:password)>`.
pub fn basic_credentials(headers: &HeaderMap) -> Option<(String, String)> {
    let encoded = headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Basic ")?
        .trim();
    let decoded = String::from_utf8(STANDARD.decode(encoded).ok()?).ok()?;
    let (username, password) = decoded.split_once(':')?;
    Some((username.to_string(), password.to_string()))
}

/// Create the token router. `/get-auth-token` is kept as an alias.
pub fn router(state: &AppState) -> Router<AppState> {
    let kernel = state.kernel();
    let routes = Router::new()
        .route("/auth/token", get(get_auth_token))
        .route("/get-auth-token", get(get_auth_token));

    RouteGroup::new(kernel)
        .rate_limited(kernel.rate_limit_policy())
        .no_cache()
        .apply(routes)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn with_auth(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, value.parse().unwrap());
        headers
    }

    #[test]
    fn decodes_basic_credentials() {
        let headers = with_auth("Basic am9objpjYXQ=");
        assert_eq!(
            basic_credentials(&headers),
            Some(("john".to_string(), "cat".to_string()))
        );
    }

    #[test]
    fn password_may_contain_colons() {
        let encoded = STANDARD.encode("john:c:a:t");
        let headers = with_auth(&format!("Basic {encoded}"));
        assert_eq!(
            basic_credentials(&headers),
            Some(("john".to_string(), "c:a:t".to_string()))
        );
    }

    #[test]
    fn rejects_other_schemes_and_garbage() {
        assert_eq!(basic_credentials(&HeaderMap::new()), None);
        assert_eq!(basic_credentials(&with_auth("Bearer abc")), None);
        assert_eq!(basic_credentials(&with_auth("Basic !!!")), None);
        let no_colon = STANDARD.encode("john");
        assert_eq!(basic_credentials(&with_auth(&format!("Basic {no_colon}"))), None);
    }
}
