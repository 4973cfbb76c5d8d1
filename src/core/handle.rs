//! # Thread-safe scheduler handle.
//!
//! [`Handle`] is the multi-producer side of the scheduler. Any number of threads
//! may hold a clone and use it to build tasks, emit them, and report completions.
//! Everything goes through one `tokio::sync::mpsc` channel; the scheduler drains
//! it on its home thread during `run()`:
//!
//! ```text
//!   thread1  thread2  thread3
//!      │        │        │     emit / done / cancel
//!      ▼        ▼        ▼
//!   ┌─────────────────────────┐
//!   │  mpsc (ready queue)     │
//!   └───────────┬─────────────┘
//!               ▼
//!        Scheduler::run()  (home thread, next tick)
//! ```

use std::fmt;
use std::sync::Arc;

use tokio::sync::mpsc;

use crate::core::Stats;
use crate::error::SchedulerError;
use crate::tasks::{IdGenerator, Task, TaskId, TaskKind, Timeout};

/// Work item travelling from handles to the scheduler.
pub(crate) enum Command<T> {
    Emit(Task<T>),
    Done(TaskId, Option<T>),
    Cancel(TaskId),
}

/// Cloneable, `Send + Sync` entry point into a scheduler.
pub struct Handle<T> {
    tx: mpsc::UnboundedSender<Command<T>>,
    ids: Arc<IdGenerator>,
    stats: Arc<Stats>,
    default_timeout: Timeout,
}

impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
            ids: Arc::clone(&self.ids),
            stats: Arc::clone(&self.stats),
            default_timeout: self.default_timeout,
        }
    }
}

impl<T> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handle")
            .field("next_id", &self.ids.peek())
            .field("default_timeout", &self.default_timeout)
            .field("closed", &self.tx.is_closed())
            .finish()
    }
}

impl<T: Send + 'static> Handle<T> {
    pub(crate) fn new(
        tx: mpsc::UnboundedSender<Command<T>>,
        ids: Arc<IdGenerator>,
        stats: Arc<Stats>,
        default_timeout: Timeout,
    ) -> Self {
        Self {
            tx,
            ids,
            stats,
            default_timeout,
        }
    }

    /// Creates a leaf task with the default timeout and no callbacks.
    pub fn task(&self) -> Task<T> {
        self.build(TaskKind::Leaf, Vec::new())
    }

    /// Creates a serial composite over `children` (run in ascending id order).
    pub fn serial(&self, children: Vec<Task<T>>) -> Task<T> {
        self.build(TaskKind::Serial, children)
    }

    /// Creates a parallel composite over `children`.
    pub fn parallel(&self, children: Vec<Task<T>>) -> Task<T> {
        self.build(TaskKind::Parallel, children)
    }

    fn build(&self, kind: TaskKind, children: Vec<Task<T>>) -> Task<T> {
        Task::new(
            self.ids.next(),
            kind,
            self.default_timeout,
            children,
            Arc::clone(&self.stats),
        )
    }

    /// Queues a task tree for its first `call` on the next `run()`.
    ///
    /// Never calls the task synchronously. Fails if the scheduler is gone or the
    /// task was built by another scheduler's handle.
    pub fn emit(&self, task: Task<T>) -> Result<(), SchedulerError> {
        if !task.is_bound_to(&self.stats) {
            tracing::warn!(task = %task.id(), "rejected emit of foreign task");
            return Err(SchedulerError::ForeignTask { id: task.id() });
        }

        self.stats.ready_pushed();
        self.tx.send(Command::Emit(task)).map_err(|_| {
            self.stats.ready_popped();
            SchedulerError::Closed
        })
    }

    /// Reports successful completion of task `id`; applied on the next `run()`.
    ///
    /// Unknown ids (already timed out or cancelled) are ignored by the scheduler.
    pub fn done(&self, id: TaskId, value: Option<T>) -> Result<(), SchedulerError> {
        self.tx
            .send(Command::Done(id, value))
            .map_err(|_| SchedulerError::Closed)
    }

    /// Requests cancellation of task `id` and its subtree; applied on the next `run()`.
    pub fn cancel(&self, id: TaskId) -> Result<(), SchedulerError> {
        self.tx
            .send(Command::Cancel(id))
            .map_err(|_| SchedulerError::Closed)
    }

    /// Shared statistics of the owning scheduler.
    pub fn stats(&self) -> &Arc<Stats> {
        &self.stats
    }

    /// True once the owning scheduler has been dropped.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}
