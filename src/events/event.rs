//! # Events emitted by the scheduler and its driver.
//!
//! The [`EventKind`] enum classifies event types across three categories:
//! - **Lifecycle events**: a task moved through its lifecycle (called, done, timed out, cancelled)
//! - **Escalation events**: a composite was forced to expire after a child timed out
//! - **Runtime events**: driver shutdown, subscriber overflow/panic
//!
//! The [`Event`] struct carries additional metadata such as timestamps, task id,
//! parent id and timing.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//! Use `seq` to restore the exact order when events are delivered out of order.
//!
//! ## Example
//! ```rust
//! use taskweave::{Event, EventKind, TaskKind};
//!
//! let ev = Event::new(EventKind::TaskTimedOut)
//!     .with_kind(TaskKind::Serial)
//!     .with_elapsed_ms(60)
//!     .with_reason("child timed out");
//!
//! assert_eq!(ev.kind, EventKind::TaskTimedOut);
//! assert_eq!(ev.task_kind, Some(TaskKind::Serial));
//! assert_eq!(ev.reason.as_deref(), Some("child timed out"));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::SystemTime;

use crate::tasks::{Task, TaskId, TaskKind, Timeout};

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Task lifecycle events ===
    /// Task moved from the ready queue to the wait index and was called.
    ///
    /// Sets: `task`, `parent`, `task_kind`, `timeout_ms` (if finite)
    TaskCalled,

    /// Task completed successfully.
    ///
    /// Sets: `task`, `parent`, `task_kind`, `elapsed_ms`
    TaskDone,

    /// Task expired (detected by the sweep or triggered manually).
    ///
    /// Sets: `task`, `parent`, `task_kind`, `elapsed_ms`, `timeout_ms`
    TaskTimedOut,

    /// Task was cancelled (explicitly or as part of a cascade).
    ///
    /// Sets: `task`, `parent`, `task_kind`, `elapsed_ms`
    TaskCancelled,

    // === Escalation ===
    /// A composite lost a child to timeout/cancellation and will expire on the next sweep.
    ///
    /// Sets: `task` (the composite), `reason` (child id)
    TimeoutEscalated,

    // === Runtime events ===
    /// Driver was asked to stop.
    ShutdownRequested,

    /// Subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets: `reason` (subscriber name and cause)
    SubscriberOverflow,

    /// Subscriber panicked during event processing.
    ///
    /// Sets: `reason` (subscriber name and panic info)
    SubscriberPanicked,
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Task the event is about, if any.
    pub task: Option<TaskId>,
    /// Owning composite of `task`, if any.
    pub parent: Option<TaskId>,
    /// Variant of `task`.
    pub task_kind: Option<TaskKind>,
    /// Time since the task was created (compact).
    pub elapsed_ms: Option<u32>,
    /// Configured timeout in milliseconds (compact).
    pub timeout_ms: Option<u32>,
    /// Human-readable reason (escalation source, overflow details, etc.).
    pub reason: Option<Arc<str>>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            task: None,
            parent: None,
            task_kind: None,
            elapsed_ms: None,
            timeout_ms: None,
            reason: None,
        }
    }

    /// Creates an event describing `task`: id, parent, kind, elapsed and timeout.
    pub fn for_task<T>(kind: EventKind, task: &Task<T>) -> Self {
        let mut ev = Event::new(kind)
            .with_task(task.id())
            .with_kind(task.kind())
            .with_elapsed_ms(task.elapsed_ms());
        ev.parent = task.parent();
        if let Timeout::After(_) = task.timeout() {
            ev.timeout_ms = Some(task.timeout().as_millis());
        }
        ev
    }

    /// Attaches a task id.
    #[inline]
    pub fn with_task(mut self, id: TaskId) -> Self {
        self.task = Some(id);
        self
    }

    /// Attaches the task variant.
    #[inline]
    pub fn with_kind(mut self, kind: TaskKind) -> Self {
        self.task_kind = Some(kind);
        self
    }

    /// Attaches elapsed milliseconds.
    #[inline]
    pub fn with_elapsed_ms(mut self, ms: u32) -> Self {
        self.elapsed_ms = Some(ms);
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_reason(format!("subscriber={subscriber} reason={reason}"))
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_reason(format!("subscriber={subscriber} info={info}"))
    }

    /// True for terminal lifecycle events (done, timed out, cancelled).
    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(
            self.kind,
            EventKind::TaskDone | EventKind::TaskTimedOut | EventKind::TaskCancelled
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_is_monotonic() {
        let a = Event::new(EventKind::TaskCalled);
        let b = Event::new(EventKind::TaskDone);
        assert!(b.seq > a.seq);
    }

    #[test]
    fn test_terminal_kinds() {
        assert!(Event::new(EventKind::TaskDone).is_terminal());
        assert!(Event::new(EventKind::TaskCancelled).is_terminal());
        assert!(!Event::new(EventKind::TaskCalled).is_terminal());
        assert!(!Event::new(EventKind::TimeoutEscalated).is_terminal());
    }
}
