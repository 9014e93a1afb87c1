//! Response shapes produced by resource handlers.
//!
//! Handlers return one of a small closed set of [`ApiResponse`] variants;
//! a single `IntoResponse` impl turns all of them into a JSON response
//! before conditional-request negotiation sees it.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{Value, json};

use crate::error::AppError;

/// An entity that can be rendered by the pipeline.
///
/// `url` is the canonical absolute reference to the entity, `export_data`
/// its full JSON projection.
pub trait Resource {
    fn url(&self) -> String;
    fn export_data(&self) -> Value;
}

/// Normalised handler output.
#[derive(Debug, Clone)]
pub enum ApiResponse {
    /// 200 with a JSON body.
    Body(Value),
    /// A JSON body with an explicit status code.
    WithStatus(StatusCode, Value),
    /// A JSON body with an explicit status code and extra headers.
    WithStatusAndHeaders(StatusCode, Value, HeaderMap),
}

impl ApiResponse {
    /// 200 with an empty JSON object.
    pub fn empty() -> Self {
        ApiResponse::Body(json!({}))
    }

    /// 200 with the full projection of a resource.
    pub fn resource(resource: &impl Resource) -> Self {
        ApiResponse::Body(resource.export_data())
    }

    /// 201 with an empty body and a `Location` header.
    pub fn created(location: &str) -> Self {
        ApiResponse::WithStatusAndHeaders(
            StatusCode::CREATED,
            json!({}),
            location_header(location),
        )
    }

    /// 202 pointing at a background task status resource.
    pub fn accepted(location: &str) -> Self {
        ApiResponse::WithStatusAndHeaders(
            StatusCode::ACCEPTED,
            json!({}),
            location_header(location),
        )
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiResponse::Body(_) => StatusCode::OK,
            ApiResponse::WithStatus(status, _) | ApiResponse::WithStatusAndHeaders(status, _, _) => {
                *status
            }
        }
    }

    pub fn body(&self) -> &Value {
        match self {
            ApiResponse::Body(body)
            | ApiResponse::WithStatus(_, body)
            | ApiResponse::WithStatusAndHeaders(_, body, _) => body,
        }
    }

    /// Split into status, extra headers and body.
    pub fn into_parts(self) -> (StatusCode, HeaderMap, Value) {
        match self {
            ApiResponse::Body(body) => (StatusCode::OK, HeaderMap::new(), body),
            ApiResponse::WithStatus(status, body) => (status, HeaderMap::new(), body),
            ApiResponse::WithStatusAndHeaders(status, body, headers) => (status, headers, body),
        }
    }
}

impl IntoResponse for ApiResponse {
    fn into_response(self) -> Response {
        let (status, headers, body) = self.into_parts();
        (status, headers, Json(body)).into_response()
    }
}

fn location_header(location: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    match HeaderValue::from_str(location) {
        Ok(value) => {
            headers.insert(header::LOCATION, value);
        }
        Err(e) => tracing::warn!(error = %e, location = %location, "unrepresentable Location header"),
    }
    headers
}

/// JSON body extractor whose rejections are validation errors.
#[derive(Debug, Clone)]
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(AppError::Validation(rejection.body_text())),
        }
    }
}

/// Absolute base URL that every generated link is rooted at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicUrl(Arc<str>);

impl PublicUrl {
    /// Parse and normalise a base URL (the trailing slash is dropped).
    pub fn parse(base: &str) -> anyhow::Result<Self> {
        let parsed = url::Url::parse(base)
            .map_err(|e| anyhow::anyhow!("invalid public URL {base:?}: {e}"))?;
        let normalised = parsed.as_str().trim_end_matches('/').to_string();
        Ok(Self(normalised.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Absolute URL for an absolute path (`/api/v1/...`).
    pub fn join(&self, path: &str) -> String {
        format!("{}{path}", self.0)
    }

    /// Strip this base from an absolute URL, returning the path part.
    ///
    /// Returns `None` for URLs rooted elsewhere.
    pub fn strip<'a>(&self, absolute: &'a str) -> Option<&'a str> {
        absolute
            .strip_prefix(self.as_str())
            .filter(|path| path.starts_with('/'))
    }
}
