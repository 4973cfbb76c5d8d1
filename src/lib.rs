//! # taskweave
//!
//! **Taskweave** is a cooperative task-graph scheduler for Rust.
//!
//! Leaf operations ("send one request and wait for its reply") are combined into
//! **serial** (one after another) and **parallel** (all at once, join on last)
//! composites, nested arbitrarily, each with its own timeout and with
//! completion/cancellation propagating through the tree. The scheduler performs
//! no I/O and spawns no threads; it is ticked from one home thread while any
//! number of threads submit work.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │   thread 1   │   │   thread 2   │   │   I/O thread │
//!     │ Handle::emit │   │ Handle::emit │   │ Handle::done │
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            ▼                  ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  ready queue (mpsc)                                               │
//! └─────────────────────────────────┬─────────────────────────────────┘
//!                                   ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Scheduler::run()  (home thread, every tick)                      │
//! │  1. sweep wait_by_time ─► trigger_timeout                         │
//! │  2. drain ready queue  ─► trigger_call / trigger_done / cancel    │
//! │                                                                   │
//! │  tasks (arena) ── wait_by_id ── wait_by_time ── Stats             │
//! └──────┬──────────────────────────────────────────────────┬─────────┘
//!        ▼                                                  ▼
//!   task callbacks                                   Bus (optional)
//!   on_call / on_done / on_timeout / on_cancel       ─► SubscriberSet
//! ```
//!
//! ### Lifecycle
//! ```text
//! created ──► emitted (ready) ──► called (waiting) ──┬─► done
//!                                                    ├─► timed out
//!                                                    └─► cancelled
//!
//! Serial([A, B, C])     A.call ─► A.done ─► B.call ─► B.done ─► C.call ─► C.done ─► S.done
//! Parallel([A, B, C])   A.call B.call C.call ─► (any order) ─► last done ─► P.done
//! child timed out       composite timeout := 0 ─► next sweep: composite times out,
//!                       remaining children cancelled
//! ```
//!
//! ## Features
//! | Area              | Description                                              | Key types                              |
//! |-------------------|----------------------------------------------------------|----------------------------------------|
//! | **Tasks**         | Leaf and composite tasks with lifecycle callbacks.       | [`Task`], [`TaskKind`], [`Timeout`]    |
//! | **Scheduling**    | Ready queue, wait indices, triggers, timeout sweep.      | [`Scheduler`], [`Handle`]              |
//! | **Hosting**       | Tick the scheduler on a tokio interval.                  | [`Driver`]                             |
//! | **Async bridge**  | Await a task's terminal outcome.                         | [`Completion`], [`TaskError`]          |
//! | **Observability** | Counters and lifecycle events.                           | [`StatsSnapshot`], [`Event`], [`Bus`]  |
//! | **Subscribers**   | Fan events out to custom handlers.                       | [`Subscribe`], [`SubscriberSet`]       |
//! | **Configuration** | Tick, default timeout, batch limit, shutdown behavior.   | [`SchedulerConfig`]                    |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] _(demo/reference only)_.
//!
//! ## Example
//! ```rust
//! use std::sync::{Arc, Mutex};
//! use taskweave::Scheduler;
//!
//! let mut scheduler: Scheduler = Scheduler::default();
//! let handle = scheduler.handle();
//! let log = Arc::new(Mutex::new(Vec::new()));
//!
//! let step = |name: &'static str| {
//!     let log = log.clone();
//!     handle.task().on_done(move |_| log.lock().unwrap().push(name))
//! };
//! let (a, b) = (step("a"), step("b"));
//! let (ia, ib) = (a.id(), b.id());
//!
//! let done = log.clone();
//! let serial = handle
//!     .serial(vec![a, b])
//!     .on_done(move |_| done.lock().unwrap().push("serial"));
//! handle.emit(serial).unwrap();
//!
//! scheduler.run();                  // serial and `a` are called
//! scheduler.trigger_done(ia, None); // `b` is called
//! scheduler.trigger_done(ib, None); // serial completes
//! assert_eq!(*log.lock().unwrap(), vec!["a", "b", "serial"]);
//! ```
mod core;
mod error;
mod events;
mod subscribers;
mod tasks;

// ---- Public re-exports ----

pub use crate::core::{
    Driver, Handle, Scheduler, SchedulerBuilder, SchedulerConfig, Stats, StatsSnapshot,
};
pub use error::{SchedulerError, TaskError};
pub use events::{Bus, Event, EventKind};
pub use subscribers::{Subscribe, SubscriberSet};
pub use tasks::{CallContext, Completion, IdGenerator, Task, TaskId, TaskKind, Timeout};

// Optional: expose a simple built-in logger subscriber (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
