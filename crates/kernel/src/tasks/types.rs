//! Background task types.

use axum::Json;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use serde_json::Value;

use crate::error::AppError;
use crate::response::ApiResponse;

/// Captured response of a finished operation.
#[derive(Debug, Clone)]
pub struct TaskOutcome {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TaskOutcome {
    /// Outcome of an operation that returned an error.
    pub fn from_error(error: &AppError) -> Self {
        Self {
            status: error.status_code(),
            headers: HeaderMap::new(),
            body: serde_json::to_value(error.body()).unwrap_or(Value::Null),
        }
    }

    /// Outcome of an operation that panicked.
    pub fn internal() -> Self {
        Self::from_error(&AppError::Internal(anyhow::anyhow!("background task aborted")))
    }
}

impl From<ApiResponse> for TaskOutcome {
    fn from(response: ApiResponse) -> Self {
        let (status, headers, body) = response.into_parts();
        Self {
            status,
            headers,
            body,
        }
    }
}

impl IntoResponse for TaskOutcome {
    fn into_response(self) -> Response {
        (self.status, self.headers, Json(self.body)).into_response()
    }
}

/// Lifecycle of a tracked task. Terminal states never change again.
#[derive(Debug, Clone)]
pub enum TaskState {
    Running,
    Completed(TaskOutcome),
    Failed(TaskOutcome),
}

impl TaskState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, TaskState::Running)
    }

    /// The captured outcome of a terminal state.
    pub fn outcome(&self) -> Option<&TaskOutcome> {
        match self {
            TaskState::Running => None,
            TaskState::Completed(outcome) | TaskState::Failed(outcome) => Some(outcome),
        }
    }
}

/// What a poller gets back.
#[derive(Debug, Clone)]
pub enum TaskStatus {
    /// Still running: poll again.
    Running,
    /// Finished, successfully or not.
    Finished(TaskOutcome),
}

/// Task table errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TaskError {
    #[error("task not found")]
    NotFound,

    #[error("task is still running, cannot delete")]
    StillRunning,
}

impl From<TaskError> for AppError {
    fn from(e: TaskError) -> Self {
        match e {
            TaskError::NotFound => AppError::NotFound(e.to_string()),
            TaskError::StillRunning => AppError::BadRequest(e.to_string()),
        }
    }
}
