//! Background task status API.
//!
//! Clients poll `GET /tasks/{id}` after a 202 until the captured result of
//! the operation comes back, then `DELETE` the record.

use axum::Router;
use axum::extract::{FromRef, Path, State};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use uuid::Uuid;

use crate::error::AppError;
use crate::response::ApiResponse;
use crate::state::KernelState;
use crate::tasks::{TASKS_PATH, TaskStatus};

/// Get a task's status or its captured result.
///
/// GET /tasks/{id}
async fn get_task(
    State(kernel): State<KernelState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let id = parse_task_id(&id)?;

    match kernel.tasks().status(id)? {
        TaskStatus::Running => Ok(ApiResponse::accepted(&kernel.task_url(id)).into_response()),
        TaskStatus::Finished(outcome) => Ok(outcome.into_response()),
    }
}

/// Delete a finished task.
///
/// DELETE /tasks/{id}
async fn delete_task(
    State(kernel): State<KernelState>,
    Path(id): Path<String>,
) -> Result<ApiResponse, AppError> {
    let id = parse_task_id(&id)?;
    kernel.tasks().delete(id)?;
    Ok(ApiResponse::empty())
}

fn parse_task_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::NotFound("task not found".to_string()))
}

/// Create the task status router.
pub fn router<S>() -> Router<S>
where
    KernelState: FromRef<S>,
    S: Clone + Send + Sync + 'static,
{
    Router::new().route(
        &format!("{TASKS_PATH}/{{id}}"),
        get(get_task).delete(delete_task),
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn malformed_ids_are_not_found() {
        let err = parse_task_id("not-a-uuid").unwrap_err();
        assert_eq!(err.status_code(), axum::http::StatusCode::NOT_FOUND);
        assert!(parse_task_id(&Uuid::now_v7().to_string()).is_ok());
    }
}
