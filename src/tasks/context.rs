//! # Call context handed to `on_call` callbacks.
//!
//! A leaf's `on_call` starts some external work and returns. When that work
//! finishes, the collaborator reports it through the context (or a clone of its
//! handle), from whatever thread its I/O completes on:
//!
//! ```text
//! on_call(ctx) ──► start I/O ──► ... ──► ctx.done(reply)
//!                                            │ (mpsc)
//!                                            ▼
//!                               next Scheduler::run() ─► trigger_done(id, reply)
//! ```

use crate::core::Handle;
use crate::error::SchedulerError;
use crate::tasks::TaskId;

/// Identity of the called task plus a way back into the scheduler.
pub struct CallContext<T> {
    id: TaskId,
    handle: Handle<T>,
}

impl<T: Send + 'static> CallContext<T> {
    pub(crate) fn new(id: TaskId, handle: Handle<T>) -> Self {
        Self { id, handle }
    }

    /// Id of the task being called.
    #[inline]
    pub fn id(&self) -> TaskId {
        self.id
    }

    /// Handle of the owning scheduler.
    pub fn handle(&self) -> &Handle<T> {
        &self.handle
    }

    /// Reports successful completion; applied on the next `run()`.
    pub fn done(&self, value: T) -> Result<(), SchedulerError> {
        self.handle.done(self.id, Some(value))
    }

    /// Reports completion without a payload.
    pub fn finish(&self) -> Result<(), SchedulerError> {
        self.handle.done(self.id, None)
    }

    /// Requests cancellation of this task; applied on the next `run()`.
    pub fn cancel(&self) -> Result<(), SchedulerError> {
        self.handle.cancel(self.id)
    }

    /// Splits the context into its parts, e.g. to move the handle into an I/O callback.
    pub fn into_parts(self) -> (TaskId, Handle<T>) {
        (self.id, self.handle)
    }
}
