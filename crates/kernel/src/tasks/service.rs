//! Background task tracker.

use std::future::Future;
use std::sync::Arc;

use dashmap::DashMap;
use tracing::{error, info, warn};
use uuid::Uuid;

use super::types::{TaskError, TaskOutcome, TaskState, TaskStatus};
use crate::error::AppError;
use crate::response::ApiResponse;

/// Process-wide table of background tasks.
///
/// Cloning is cheap; all clones share the same table.
#[derive(Clone)]
pub struct TaskTracker {
    inner: Arc<TrackerInner>,
}

struct TrackerInner {
    tasks: DashMap<Uuid, TaskState>,
    auto_delete: bool,
}

impl TaskTracker {
    /// Create a tracker. With `auto_delete`, a finished task is removed the
    /// first time its result is read.
    pub fn new(auto_delete: bool) -> Self {
        Self {
            inner: Arc::new(TrackerInner {
                tasks: DashMap::new(),
                auto_delete,
            }),
        }
    }

    /// Run `operation` in the background and return its id immediately.
    ///
    /// The task is registered as running before the operation is spawned,
    /// so the id can be polled as soon as this returns.
    pub fn start<F>(&self, operation: F) -> Uuid
    where
        F: Future<Output = Result<ApiResponse, AppError>> + Send + 'static,
    {
        let id = Uuid::now_v7();
        self.inner.tasks.insert(id, TaskState::Running);
        info!(task_id = %id, "background task started");

        let inner = self.inner.clone();
        tokio::spawn(async move {
            // The inner spawn turns a panic into a JoinError instead of
            // leaving the task running forever.
            let state = match tokio::spawn(operation).await {
                Ok(Ok(response)) => {
                    info!(task_id = %id, status = %response.status(), "background task completed");
                    TaskState::Completed(TaskOutcome::from(response))
                }
                Ok(Err(e)) => {
                    warn!(task_id = %id, error = %e, "background task failed");
                    TaskState::Failed(TaskOutcome::from_error(&e))
                }
                Err(e) => {
                    error!(task_id = %id, error = %e, "background task aborted");
                    TaskState::Failed(TaskOutcome::internal())
                }
            };
            inner.tasks.insert(id, state);
        });

        id
    }

    /// Current status of a task.
    pub fn status(&self, id: Uuid) -> Result<TaskStatus, TaskError> {
        let outcome = {
            let entry = self.inner.tasks.get(&id).ok_or(TaskError::NotFound)?;
            match entry.value().outcome() {
                Some(outcome) => outcome.clone(),
                None => return Ok(TaskStatus::Running),
            }
        };

        if !self.inner.auto_delete {
            return Ok(TaskStatus::Finished(outcome));
        }

        // Only the reader that actually removes the record gets the result.
        match self.inner.tasks.remove_if(&id, |_, state| state.is_terminal()) {
            Some(_) => {
                info!(task_id = %id, "background task removed after read");
                Ok(TaskStatus::Finished(outcome))
            }
            None => Err(TaskError::NotFound),
        }
    }

    /// Remove a finished task.
    pub fn delete(&self, id: Uuid) -> Result<(), TaskError> {
        if self
            .inner
            .tasks
            .remove_if(&id, |_, state| state.is_terminal())
            .is_some()
        {
            info!(task_id = %id, "background task deleted");
            return Ok(());
        }

        if self.inner.tasks.contains_key(&id) {
            Err(TaskError::StillRunning)
        } else {
            Err(TaskError::NotFound)
        }
    }

    /// Number of tracked tasks, running or finished.
    pub fn len(&self) -> usize {
        self.inner.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.tasks.is_empty()
    }
}

impl std::fmt::Debug for TaskTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskTracker")
            .field("tasks", &self.len())
            .field("auto_delete", &self.inner.auto_delete)
            .finish()
    }
}
