//! Background task tracking for long-running operations.
//!
//! A handler hands a future to [`TaskTracker::start`] and answers 202 right
//! away; the client then polls `/tasks/{id}` until the captured result of
//! the operation is available.

mod service;
mod types;

pub use service::TaskTracker;
pub use types::{TaskError, TaskOutcome, TaskState, TaskStatus};

/// Path prefix the task status resources are mounted under.
pub const TASKS_PATH: &str = "/tasks";
