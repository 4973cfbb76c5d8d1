//! # Scheduler: ready queue, wait indices and the four triggers.
//!
//! The [`Scheduler`] owns every emitted task until it reaches a terminal state.
//! `emit` is the only multi-threaded entry point (through [`Handle`]); everything
//! else runs on the scheduler's home thread without locking.
//!
//! ## Architecture
//! ```text
//!   thread1  thread2  thread3
//!      │        │        │         Handle::emit / done / cancel
//!      ▼        ▼        ▼
//!   RRRRRRRRRRRRRRRRRRRRRRRRRR     ready queue (mpsc)
//!               │
//!  ┌────────────┼──────────── run() on the home thread ──────────────┐
//!  │ (1) sweep  │                                                    │
//!  │   wait_by_time ─► is_timed_out? ─► trigger_timeout              │
//!  │ (2) drain  ▼                                                    │
//!  │   batch ─► register tree ─► trigger_call                        │
//!  │                                                                 │
//!  │   tasks (arena)   wait_by_id (in flight)   wait_by_time (index) │
//!  │        │                │                                       │
//!  │        └── trigger_done / trigger_timeout / trigger_cancel ─────┤
//!  │              └─► parent.child_done / child_timeout (cascade)    │
//!  └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Rules
//! - a task is `Pending` (registered, not called) or `Waiting` (in `wait_by_id`)
//! - `wait_by_time` holds `(created, id)` only for waiting tasks with a finite timeout;
//!   stale entries are pruned lazily by the sweep
//! - terminal tasks are removed from the arena and their parent's children at once
//! - unknown ids are benign no-ops (`false`)

use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::time::Instant;

use crate::core::handle::Command;
use crate::core::{Handle, SchedulerBuilder, SchedulerConfig, Stats, StatsSnapshot};
use crate::events::{Bus, Event, EventKind};
use crate::tasks::{CallContext, IdGenerator, State, Task, TaskId, TaskKind};

/// Single-threaded task graph scheduler.
///
/// # Example
/// ```rust
/// use std::sync::{Arc, Mutex};
/// use taskweave::Scheduler;
///
/// let mut scheduler: Scheduler<u32> = Scheduler::default();
/// let handle = scheduler.handle();
///
/// let got = Arc::new(Mutex::new(None));
/// let sink = got.clone();
/// let leaf = handle.task().on_done(move |v| *sink.lock().unwrap() = v);
/// let id = leaf.id();
///
/// handle.emit(leaf).unwrap();
/// scheduler.run(); // leaf is called
/// assert!(scheduler.is_waiting(id));
///
/// assert!(scheduler.trigger_done(id, Some(7)));
/// assert_eq!(*got.lock().unwrap(), Some(7));
/// assert!(!scheduler.is_waiting(id));
/// ```
pub struct Scheduler<T = ()> {
    cfg: SchedulerConfig,
    handle: Handle<T>,
    rx: mpsc::UnboundedReceiver<Command<T>>,

    tasks: HashMap<TaskId, Task<T>>,
    wait_by_id: HashSet<TaskId>,
    wait_by_time: BTreeSet<(Instant, TaskId)>,

    stats: Arc<Stats>,
    bus: Option<Bus>,
    ticks: u64,
}

impl<T: Send + 'static> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new(SchedulerConfig::default())
    }
}

impl Scheduler {
    /// Returns a builder for injecting an id generator or an event bus.
    ///
    /// The payload type is chosen by [`SchedulerBuilder::build`].
    pub fn builder(cfg: SchedulerConfig) -> SchedulerBuilder {
        SchedulerBuilder::new(cfg)
    }
}

impl<T: Send + 'static> Scheduler<T> {
    /// Creates a scheduler with its own id space and no event bus.
    pub fn new(cfg: SchedulerConfig) -> Self {
        SchedulerBuilder::new(cfg).build()
    }

    pub(crate) fn from_parts(
        cfg: SchedulerConfig,
        ids: Arc<IdGenerator>,
        bus: Option<Bus>,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let stats = Arc::new(Stats::default());
        let handle = Handle::new(tx, ids, Arc::clone(&stats), cfg.default_timeout());
        Self {
            cfg,
            handle,
            rx,
            tasks: HashMap::new(),
            wait_by_id: HashSet::new(),
            wait_by_time: BTreeSet::new(),
            stats,
            bus,
            ticks: 0,
        }
    }

    /// Returns a new handle for building and emitting tasks from any thread.
    pub fn handle(&self) -> Handle<T> {
        self.handle.clone()
    }

    /// Shorthand for `self.handle().emit(task)`.
    pub fn emit(&self, task: Task<T>) -> Result<(), crate::SchedulerError> {
        self.handle.emit(task)
    }

    /// One scheduler tick: timeout sweep, then ready-queue drain.
    ///
    /// Must be called from the home thread, typically on a fixed period
    /// (see [`Driver`](crate::Driver)). Commands queued while this call runs are
    /// picked up by the next one.
    pub fn run(&mut self) {
        self.ticks += 1;
        self.stats
            .set_wait_depths(self.wait_by_id.len(), self.wait_by_time.len());

        self.sweep();
        self.drain();
    }

    /// Times out every waiting task whose timeout has elapsed.
    ///
    /// `wait_by_time` is ordered by creation, not by deadline, so every entry is
    /// checked. Expiry is decided for all entries before any timeout fires, so a
    /// composite escalated during this sweep expires on the next one.
    fn sweep(&mut self) {
        let mut expired = Vec::new();
        let mut stale = Vec::new();

        for &(created, id) in &self.wait_by_time {
            match self.tasks.get(&id) {
                Some(task) if self.wait_by_id.contains(&id) => {
                    if task.is_timed_out() {
                        expired.push((created, id));
                    }
                }
                _ => stale.push((created, id)),
            }
        }

        for key in &stale {
            self.wait_by_time.remove(key);
        }
        for key in expired {
            self.wait_by_time.remove(&key);
            self.trigger_timeout(key.1);
        }
    }

    /// Takes what is queued when the drain starts (up to `max_batch`) and
    /// applies it. Commands sent after that point wait for the next `run()`.
    fn drain(&mut self) {
        let queued = self.rx.len();
        let limit = self
            .cfg
            .batch_limit()
            .map_or(queued, |max| max.min(queued));

        let mut batch = Vec::with_capacity(limit);
        while batch.len() < limit {
            match self.rx.try_recv() {
                Ok(cmd) => batch.push(cmd),
                Err(_) => break,
            }
        }

        for cmd in batch {
            match cmd {
                Command::Emit(task) => {
                    self.stats.ready_popped();
                    let id = task.id();
                    self.register(task, None);
                    self.trigger_call(id);
                }
                Command::Done(id, value) => {
                    self.trigger_done(id, value);
                }
                Command::Cancel(id) => {
                    self.trigger_cancel(id);
                }
            }
        }
    }

    /// Moves a freshly emitted tree into the arena, wiring parent ids.
    fn register(&mut self, mut task: Task<T>, parent: Option<TaskId>) {
        task.parent = parent;
        let id = task.id();
        for child in std::mem::take(&mut task.subtasks) {
            self.register(child, Some(id));
        }
        self.tasks.insert(id, task);
    }

    /// Calls a pending task: indexes it as waiting, runs `on_call`, then starts
    /// children for composites.
    ///
    /// Returns `false` if the id is unknown or the task was already called.
    pub fn trigger_call(&mut self, id: TaskId) -> bool {
        let Some(task) = self.tasks.get_mut(&id) else {
            return false;
        };
        if task.state != State::Pending {
            return false;
        }

        task.state = State::Waiting;
        self.wait_by_id.insert(id);
        if !task.is_never_timeout() {
            self.wait_by_time.insert((task.created(), id));
        }

        let kind = task.kind();
        let hook = task.take_on_call();
        let ev = self.bus.as_ref().map(|_| Event::for_task(EventKind::TaskCalled, task));
        tracing::trace!(task = %id, kind = kind.as_label(), "call");

        if let Some(f) = hook {
            f(CallContext::new(id, self.handle.clone()));
        }
        self.stats.record_called();
        self.publish(ev);

        match kind {
            TaskKind::Leaf => {}
            TaskKind::Serial => self.call_head(id),
            TaskKind::Parallel => self.call_all(id),
        }
        true
    }

    /// Completes a waiting task and cascades to its parent.
    ///
    /// Returns `false` if the task is not waiting (unknown, not yet called, or
    /// already terminal); late completions after a timeout land here.
    pub fn trigger_done(&mut self, id: TaskId, value: Option<T>) -> bool {
        if !self.wait_by_id.remove(&id) {
            return false;
        }
        let Some(mut task) = self.tasks.remove(&id) else {
            return false;
        };

        tracing::trace!(task = %id, elapsed_ms = task.elapsed_ms(), "done");
        task.fire_done(value);
        self.stats.record_done();
        self.publish_for(EventKind::TaskDone, &task);

        self.release_children(&mut task);
        if let Some(parent) = task.parent() {
            self.child_done(parent, id);
        }
        true
    }

    /// Expires a task: runs `on_timeout`, cancels what is left of its subtree and
    /// escalates to its parent.
    ///
    /// Normally driven by the sweep in [`Scheduler::run`].
    pub fn trigger_timeout(&mut self, id: TaskId) -> bool {
        let Some(mut task) = self.tasks.remove(&id) else {
            return false;
        };
        self.wait_by_id.remove(&id);

        tracing::debug!(
            task = %id,
            kind = task.kind().as_label(),
            elapsed_ms = task.elapsed_ms(),
            timeout_ms = task.timeout().as_millis(),
            "timed out"
        );
        task.fire_timeout();
        self.stats.record_timed_out();
        self.publish_for(EventKind::TaskTimedOut, &task);

        self.release_children(&mut task);
        if let Some(parent) = task.parent() {
            self.child_timeout(parent, id);
        }
        true
    }

    /// Cancels a task and, recursively, every child it still owns.
    ///
    /// Works on waiting and on not-yet-called tasks. When the cancelled task
    /// still belongs to a composite, that composite treats it like a timed-out
    /// child.
    pub fn trigger_cancel(&mut self, id: TaskId) -> bool {
        let Some(parent) = self.tasks.get(&id).map(|t| t.parent()) else {
            return false;
        };
        self.cancel_subtree(id);
        if let Some(parent) = parent {
            self.child_cancelled(parent, id);
        }
        true
    }

    /// Cancels every in-flight root task (and with it, every descendant).
    ///
    /// Returns the number of roots cancelled.
    pub fn cancel_all(&mut self) -> usize {
        let mut roots: Vec<TaskId> = self
            .tasks
            .values()
            .filter(|t| t.parent().is_none())
            .map(Task::id)
            .collect();
        roots.sort_unstable();

        let n = roots.len();
        for id in roots {
            self.cancel_subtree(id);
        }
        n
    }

    pub(crate) fn cancel_subtree(&mut self, id: TaskId) {
        let Some(mut task) = self.tasks.remove(&id) else {
            return;
        };
        self.wait_by_id.remove(&id);

        tracing::debug!(task = %id, kind = task.kind().as_label(), "cancelled");
        task.fire_cancel();
        self.release_children(&mut task);
        self.stats.record_cancelled();
        self.publish_for(EventKind::TaskCancelled, &task);
    }

    /// Cancels every child a terminal task still owns and clears its collection.
    fn release_children(&mut self, task: &mut Task<T>) {
        for child in std::mem::take(&mut task.children) {
            self.cancel_subtree(child);
        }
    }

    pub(crate) fn task_mut(&mut self, id: TaskId) -> Option<&mut Task<T>> {
        self.tasks.get_mut(&id)
    }

    /// Puts a waiting task back into the time index (after its timeout changed).
    pub(crate) fn index_by_time(&mut self, id: TaskId) {
        if !self.wait_by_id.contains(&id) {
            return;
        }
        if let Some(task) = self.tasks.get(&id) {
            if !task.is_never_timeout() {
                self.wait_by_time.insert((task.created(), id));
            }
        }
    }

    fn publish_for(&self, kind: EventKind, task: &Task<T>) {
        if let Some(bus) = &self.bus {
            bus.publish(Event::for_task(kind, task));
        }
    }

    pub(crate) fn publish(&self, ev: Option<Event>) {
        if let (Some(bus), Some(ev)) = (&self.bus, ev) {
            bus.publish(ev);
        }
    }

    pub(crate) fn has_bus(&self) -> bool {
        self.bus.is_some()
    }

    /// Event bus, if the scheduler was built with one.
    pub fn bus(&self) -> Option<&Bus> {
        self.bus.as_ref()
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.cfg
    }

    /// True if the task has been called and has not reached a terminal state.
    pub fn is_waiting(&self, id: TaskId) -> bool {
        self.wait_by_id.contains(&id)
    }

    /// True if the scheduler still owns the task (pending or waiting).
    pub fn is_registered(&self, id: TaskId) -> bool {
        self.tasks.contains_key(&id)
    }

    /// True if the task currently has an entry in the wait-by-time index.
    pub fn is_indexed_by_time(&self, id: TaskId) -> bool {
        self.wait_by_time.iter().any(|&(_, i)| i == id)
    }

    /// Borrow a registered task.
    pub fn get(&self, id: TaskId) -> Option<&Task<T>> {
        self.tasks.get(&id)
    }

    /// Number of in-flight tasks.
    pub fn waiting_len(&self) -> usize {
        self.wait_by_id.len()
    }

    /// Number of entries in the wait-by-time index (may include stale ones).
    pub fn indexed_len(&self) -> usize {
        self.wait_by_time.len()
    }

    /// Number of registered tasks (pending + waiting).
    pub fn registered_len(&self) -> usize {
        self.tasks.len()
    }

    /// Number of completed `run()` calls.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// Renders the statistics for logs.
    pub fn stat_string(&self) -> String {
        self.stats.snapshot().to_string()
    }
}

impl<T> std::fmt::Debug for Scheduler<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler")
            .field("registered", &self.tasks.len())
            .field("waiting", &self.wait_by_id.len())
            .field("indexed", &self.wait_by_time.len())
            .field("ticks", &self.ticks)
            .finish_non_exhaustive()
    }
}
