//! Conditional-request negotiation (entity tags).
//!
//! Successful reads get an `ETag` computed from the exact response bytes.
//! `If-Match` is evaluated before `If-None-Match`; only one of them ever
//! decides the outcome.

use axum::body::Body;
use axum::extract::Request;
use axum::http::header::{CACHE_CONTROL, CONTENT_LENGTH, CONTENT_TYPE, ETAG, IF_MATCH, IF_NONE_MATCH};
use axum::http::{HeaderMap, HeaderValue, Method, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use sha2::{Digest, Sha256};

use crate::error::AppError;

/// Result of negotiating one response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Negotiation {
    /// Not a cacheable read or not a 200: leave the response alone.
    PassThrough,
    /// Attach the tag and return the response.
    Tagged(String),
    /// The client already has this representation.
    NotModified(String),
    /// `If-Match` did not list the current tag.
    PreconditionFailed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Comparison {
    Strong,
    Weak,
}

/// Quoted entity tag for a response body.
pub fn entity_tag(body: &[u8]) -> String {
    format!("\"{}\"", hex::encode(Sha256::digest(body)))
}

/// Decide what to do with a response given the request's preconditions.
pub fn negotiate(
    method: &Method,
    request_headers: &HeaderMap,
    status: StatusCode,
    body: &[u8],
) -> Negotiation {
    if !is_cacheable_read(method) || status != StatusCode::OK {
        return Negotiation::PassThrough;
    }

    let tag = entity_tag(body);

    if let Some(if_match) = precondition(request_headers, IF_MATCH.as_str()) {
        if !list_matches(if_match, &tag, Comparison::Strong) {
            return Negotiation::PreconditionFailed;
        }
    } else if let Some(if_none_match) = precondition(request_headers, IF_NONE_MATCH.as_str())
        && list_matches(if_none_match, &tag, Comparison::Weak)
    {
        return Negotiation::NotModified(tag);
    }

    Negotiation::Tagged(tag)
}

fn is_cacheable_read(method: &Method) -> bool {
    method == Method::GET || method == Method::HEAD
}

fn precondition<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

fn list_matches(list: &str, tag: &str, comparison: Comparison) -> bool {
    list.split(',').map(str::trim).any(|candidate| {
        if candidate == "*" {
            return true;
        }
        match comparison {
            Comparison::Strong => candidate == tag,
            Comparison::Weak => candidate.strip_prefix("W/").unwrap_or(candidate) == tag,
        }
    })
}

/// Middleware applying [`negotiate`] to every response of a route group.
pub async fn conditional_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let mut preconditions = HeaderMap::new();
    for name in [IF_MATCH, IF_NONE_MATCH] {
        if let Some(value) = request.headers().get(&name) {
            preconditions.insert(name, value.clone());
        }
    }

    let response = next.run(request).await;
    if !is_cacheable_read(&method) || response.status() != StatusCode::OK {
        return response;
    }

    let (mut parts, body) = response.into_parts();
    let bytes = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(e) => {
            return AppError::Internal(anyhow::anyhow!("failed to buffer response body: {e}"))
                .into_response();
        }
    };

    match negotiate(&method, &preconditions, parts.status, &bytes) {
        Negotiation::PassThrough => Response::from_parts(parts, Body::from(bytes)),
        Negotiation::Tagged(tag) => {
            insert_etag(&mut parts.headers, &tag);
            Response::from_parts(parts, Body::from(bytes))
        }
        Negotiation::NotModified(tag) => {
            parts.status = StatusCode::NOT_MODIFIED;
            parts.headers.remove(CONTENT_TYPE);
            parts.headers.remove(CONTENT_LENGTH);
            insert_etag(&mut parts.headers, &tag);
            Response::from_parts(parts, Body::empty())
        }
        Negotiation::PreconditionFailed => AppError::PreconditionFailed.into_response(),
    }
}

fn insert_etag(headers: &mut HeaderMap, tag: &str) {
    if let Ok(value) = HeaderValue::from_str(tag) {
        headers.insert(ETAG, value);
    }
}

/// Directives set by [`no_cache`].
pub const NO_CACHE_DIRECTIVES: &str = "private, no-cache, no-store, max-age=0";

/// Middleware marking responses as never cacheable.
pub async fn no_cache(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    response
        .headers_mut()
        .insert(CACHE_CONTROL, HeaderValue::from_static(NO_CACHE_DIRECTIVES));
    response
}
