//! Application error types.
//!
//! Every failure leaving the pipeline is rendered with the same three-field
//! body: `{"status": <code>, "error": <reason>, "message": <detail>}`.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Application errors.
#[derive(Debug, Error)]
pub enum AppError {
    /// Malformed or missing input fields.
    #[error("{0}")]
    Validation(String),

    /// A well-formed request that cannot be honoured in the current state.
    #[error("{0}")]
    BadRequest(String),

    /// Missing, invalid or expired credentials.
    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    NotFound(String),

    #[error("the method is not supported")]
    MethodNotSupported,

    #[error("precondition failed")]
    PreconditionFailed,

    #[error("You have exceeded your request rate")]
    RateLimited,

    /// The underlying resource (e.g. a camera) is in use.
    #[error("{0}")]
    ResourceBusy(String),

    #[error("internal server error")]
    Internal(#[from] anyhow::Error),
}

/// Wire shape of every error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub status: u16,
    pub error: String,
    pub message: String,
}

impl AppError {
    /// Shorthand for the generic "unknown resource" 404.
    pub fn not_found() -> Self {
        AppError::NotFound("invalid resource URI".to_string())
    }

    /// HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::MethodNotSupported => StatusCode::METHOD_NOT_ALLOWED,
            AppError::PreconditionFailed => StatusCode::PRECONDITION_FAILED,
            AppError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            AppError::ResourceBusy(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short lowercase reason phrase used in the `error` field.
    pub fn reason(&self) -> &'static str {
        match self {
            AppError::Validation(_) | AppError::BadRequest(_) => "bad request",
            AppError::Unauthorized(_) => "unauthorized",
            AppError::NotFound(_) => "not found",
            AppError::MethodNotSupported => "method not supported",
            AppError::PreconditionFailed => "precondition failed",
            AppError::RateLimited => "too many requests",
            AppError::ResourceBusy(_) => "service unavailable",
            AppError::Internal(_) => "internal server error",
        }
    }

    /// Build the structured body for this error.
    ///
    /// Internal errors are logged here and their detail is not exposed.
    pub fn body(&self) -> ErrorBody {
        let message = match self {
            AppError::Internal(e) => {
                tracing::error!(error = %e, "internal server error");
                "internal server error".to_string()
            }
            _ => self.to_string(),
        };

        ErrorBody {
            status: self.status_code().as_u16(),
            error: self.reason().to_string(),
            message,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let mut response = (self.status_code(), Json(self.body())).into_response();
        if matches!(self, AppError::Unauthorized(_)) {
            response.headers_mut().insert(
                axum::http::header::WWW_AUTHENTICATE,
                axum::http::HeaderValue::from_static("Bearer"),
            );
        }
        response
    }
}

/// Result type alias using AppError.
pub type AppResult<T> = Result<T, AppError>;
