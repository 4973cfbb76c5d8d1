//! Error types used by the scheduler and by task awaiters.
//!
//! This module defines two enums:
//!
//! - [`SchedulerError`] — submission failures (emitting, reporting completions).
//! - [`TaskError`] — terminal outcomes other than success, as seen through a
//!   [`Completion`](crate::Completion).
//!
//! The scheduler's own control flow never fails: timeouts and cancellations are
//! delivered through task callbacks. Both types provide `as_label`/`as_message`
//! helpers for logging/metrics.

use std::time::Duration;
use thiserror::Error;

use crate::tasks::TaskId;

/// # Errors produced when talking to a scheduler.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchedulerError {
    /// The scheduler was dropped; nothing will drain the ready queue anymore.
    #[error("scheduler closed")]
    Closed,

    /// The task (or one of its children) was built by another scheduler's handle.
    #[error("task {id} is not bound to this scheduler")]
    ForeignTask {
        /// Id of the rejected root task.
        id: TaskId,
    },
}

impl SchedulerError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use taskweave::SchedulerError;
    ///
    /// assert_eq!(SchedulerError::Closed.as_label(), "scheduler_closed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            SchedulerError::Closed => "scheduler_closed",
            SchedulerError::ForeignTask { .. } => "scheduler_foreign_task",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            SchedulerError::Closed => "scheduler closed".to_string(),
            SchedulerError::ForeignTask { id } => format!("foreign task: id={id}"),
        }
    }
}

/// # Non-success terminal outcomes of a task.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TaskError {
    /// The task expired before it was reported done.
    #[error("timed out after {elapsed:?}")]
    Timeout {
        /// Time between creation and the sweep that expired the task.
        elapsed: Duration,
    },

    /// The task (or an ancestor) was cancelled.
    #[error("task cancelled")]
    Canceled,

    /// The task was dropped without reaching a terminal state (scheduler gone).
    #[error("task dropped before completion")]
    Dropped,
}

impl TaskError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use taskweave::TaskError;
    /// use std::time::Duration;
    ///
    /// let err = TaskError::Timeout { elapsed: Duration::from_millis(60) };
    /// assert_eq!(err.as_label(), "task_timeout");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            TaskError::Timeout { .. } => "task_timeout",
            TaskError::Canceled => "task_canceled",
            TaskError::Dropped => "task_dropped",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            TaskError::Timeout { elapsed } => format!("timeout: {elapsed:?}"),
            TaskError::Canceled => "task cancelled".to_string(),
            TaskError::Dropped => "task dropped".to_string(),
        }
    }

    /// True for [`TaskError::Timeout`].
    pub fn is_timeout(&self) -> bool {
        matches!(self, TaskError::Timeout { .. })
    }
}
