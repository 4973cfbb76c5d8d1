//! # Task: the unit of work driven by the scheduler.
//!
//! A [`Task`] holds identity, timing, timeout policy, parent/children links and
//! four lifecycle callbacks. The closed set of [`TaskKind`]s decides how the
//! scheduler treats its children:
//!
//! ```text
//! Leaf      call ─► on_call(ctx) ─► ... external work ... ─► ctx.done(value)
//! Serial    call ─► call(head) ─► head done ─► call(next head) ─► ... ─► done
//! Parallel  call ─► call(all)  ─► last child done ─────────────────────► done
//! ```
//!
//! Tasks are configured with builder methods and then handed to
//! [`Handle::emit`](crate::Handle::emit). After emission the scheduler owns them.
//!
//! ## Rules
//! - every callback fires at most once
//! - `children` is fixed at construction and only shrinks afterwards
//! - `parent` is a plain id (non-owning back-reference)

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;

use crate::core::Stats;
use crate::tasks::{CallContext, TaskId};

pub(crate) type CallHook<T> = Box<dyn FnOnce(CallContext<T>) + Send + 'static>;
pub(crate) type DoneHook<T> = Box<dyn FnOnce(Option<T>) + Send + 'static>;
pub(crate) type Hook = Box<dyn FnOnce() + Send + 'static>;

/// Variant of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskKind {
    /// One indivisible external operation, described by its callbacks.
    Leaf,
    /// Children run one at a time in ascending id order.
    Serial,
    /// Children start together; completes when the last one finishes.
    Parallel,
}

impl TaskKind {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            TaskKind::Leaf => "leaf",
            TaskKind::Serial => "serial",
            TaskKind::Parallel => "parallel",
        }
    }

    /// True for serial and parallel tasks.
    #[inline]
    pub fn is_composite(&self) -> bool {
        !matches!(self, TaskKind::Leaf)
    }
}

/// Timeout policy of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Timeout {
    /// The task never expires; it is kept out of the wait-by-time index.
    #[default]
    Never,
    /// The task expires once this much time has elapsed since its creation.
    After(Duration),
}

impl Timeout {
    /// Millisecond sentinel meaning "never times out".
    pub const NEVER_MS: u32 = u32::MAX;

    /// Builds a timeout from milliseconds; [`Timeout::NEVER_MS`] maps to [`Timeout::Never`].
    pub fn from_millis(ms: u32) -> Self {
        if ms == Self::NEVER_MS {
            Timeout::Never
        } else {
            Timeout::After(Duration::from_millis(u64::from(ms)))
        }
    }

    /// Returns the timeout in milliseconds, [`Timeout::NEVER_MS`] for `Never`.
    pub fn as_millis(&self) -> u32 {
        match self {
            Timeout::Never => Self::NEVER_MS,
            Timeout::After(d) => d.as_millis().min(u128::from(Self::NEVER_MS - 1)) as u32,
        }
    }

    #[inline]
    pub fn is_never(&self) -> bool {
        matches!(self, Timeout::Never)
    }
}

impl From<Option<Duration>> for Timeout {
    fn from(d: Option<Duration>) -> Self {
        match d {
            Some(d) => Timeout::After(d),
            None => Timeout::Never,
        }
    }
}

/// Where a registered task is in its lifecycle. Terminal tasks are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum State {
    /// Constructed or registered, `call` not yet invoked.
    Pending,
    /// `call` has run; waiting for done/timeout/cancel.
    Waiting,
}

struct Hooks<T> {
    on_call: Option<CallHook<T>>,
    on_done: Option<DoneHook<T>>,
    on_timeout: Option<Hook>,
    on_cancel: Option<Hook>,
}

impl<T> Default for Hooks<T> {
    fn default() -> Self {
        Self {
            on_call: None,
            on_done: None,
            on_timeout: None,
            on_cancel: None,
        }
    }
}

/// A schedulable task (leaf or composite).
///
/// `T` is the payload a leaf reports on completion; composites complete with `None`.
///
/// # Example
/// ```rust
/// use std::time::Duration;
/// use taskweave::Scheduler;
///
/// let scheduler: Scheduler<String> = Scheduler::default();
/// let handle = scheduler.handle();
///
/// let get = handle
///     .task()
///     .with_timeout(Duration::from_millis(500))
///     .on_call(|ctx| {
///         // issue the request here; report back later with ctx.done(..)
///         let _ = ctx.done("reply".to_string());
///     })
///     .on_done(|reply| assert_eq!(reply.as_deref(), Some("reply")));
///
/// handle.emit(get).unwrap();
/// ```
pub struct Task<T = ()> {
    id: TaskId,
    kind: TaskKind,
    created: Instant,
    timeout: Timeout,
    pub(crate) parent: Option<TaskId>,
    pub(crate) children: BTreeSet<TaskId>,
    pub(crate) subtasks: Vec<Task<T>>,
    pub(crate) state: State,
    /// Set once a child timed out or was cancelled; the task can only expire now.
    pub(crate) escalated: bool,
    /// Set while a serial task is walking its head forward.
    pub(crate) advancing: bool,
    hooks: Hooks<T>,
    stats: Arc<Stats>,
}

impl<T> Task<T> {
    pub(crate) fn new(
        id: TaskId,
        kind: TaskKind,
        timeout: Timeout,
        subtasks: Vec<Task<T>>,
        stats: Arc<Stats>,
    ) -> Self {
        stats.record_constructed();
        let children = subtasks.iter().map(Task::id).collect();
        Self {
            id,
            kind,
            created: Instant::now(),
            timeout,
            parent: None,
            children,
            subtasks,
            state: State::Pending,
            escalated: false,
            advancing: false,
            hooks: Hooks::default(),
            stats,
        }
    }

    /// Sets a finite timeout measured from creation.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Timeout::After(timeout);
        self
    }

    /// Sets the timeout in milliseconds; [`Timeout::NEVER_MS`] disables it.
    pub fn with_timeout_ms(mut self, ms: u32) -> Self {
        self.timeout = Timeout::from_millis(ms);
        self
    }

    /// Disables the timeout.
    pub fn never_timeout(mut self) -> Self {
        self.timeout = Timeout::Never;
        self
    }

    /// Callback invoked when the scheduler calls the task.
    pub fn on_call<F>(mut self, f: F) -> Self
    where
        F: FnOnce(CallContext<T>) + Send + 'static,
    {
        self.hooks.on_call = Some(Box::new(f));
        self
    }

    /// Callback invoked on successful completion.
    pub fn on_done<F>(mut self, f: F) -> Self
    where
        F: FnOnce(Option<T>) + Send + 'static,
    {
        self.hooks.on_done = Some(Box::new(f));
        self
    }

    /// Callback invoked when the task expires.
    pub fn on_timeout<F>(mut self, f: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        self.hooks.on_timeout = Some(Box::new(f));
        self
    }

    /// Callback invoked when the task is cancelled.
    pub fn on_cancel<F>(mut self, f: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        self.hooks.on_cancel = Some(Box::new(f));
        self
    }

    #[inline]
    pub fn id(&self) -> TaskId {
        self.id
    }

    #[inline]
    pub fn kind(&self) -> TaskKind {
        self.kind
    }

    #[inline]
    pub fn timeout(&self) -> Timeout {
        self.timeout
    }

    /// Owning composite, if any. Set when the tree is registered with a scheduler.
    #[inline]
    pub fn parent(&self) -> Option<TaskId> {
        self.parent
    }

    /// Ids of the children still owned by this task, ascending.
    pub fn children(&self) -> impl Iterator<Item = TaskId> + '_ {
        self.children.iter().copied()
    }

    /// Time since construction.
    pub fn elapsed(&self) -> Duration {
        self.created.elapsed()
    }

    pub fn elapsed_ms(&self) -> u32 {
        self.elapsed().as_millis().min(u128::from(u32::MAX)) as u32
    }

    #[inline]
    pub fn is_never_timeout(&self) -> bool {
        self.timeout.is_never()
    }

    /// True iff the task has a finite timeout and it has elapsed.
    pub fn is_timed_out(&self) -> bool {
        match self.timeout {
            Timeout::Never => false,
            Timeout::After(limit) => self.elapsed() >= limit,
        }
    }

    pub(crate) fn created(&self) -> Instant {
        self.created
    }

    /// Forces expiry on the next sweep.
    pub(crate) fn escalate(&mut self) {
        self.escalated = true;
        self.timeout = Timeout::After(Duration::ZERO);
    }

    /// True if this task and its whole subtree were built against `stats`.
    pub(crate) fn is_bound_to(&self, stats: &Arc<Stats>) -> bool {
        Arc::ptr_eq(&self.stats, stats) && self.subtasks.iter().all(|c| c.is_bound_to(stats))
    }

    pub(crate) fn take_on_call(&mut self) -> Option<CallHook<T>> {
        self.hooks.on_call.take()
    }

    pub(crate) fn fire_done(&mut self, value: Option<T>) {
        if let Some(f) = self.hooks.on_done.take() {
            f(value);
        }
    }

    pub(crate) fn fire_timeout(&mut self) {
        if let Some(f) = self.hooks.on_timeout.take() {
            f();
        }
    }

    pub(crate) fn fire_cancel(&mut self) {
        if let Some(f) = self.hooks.on_cancel.take() {
            f();
        }
    }

    pub(crate) fn set_terminal_hooks(&mut self, done: DoneHook<T>, timeout: Hook, cancel: Hook) {
        self.hooks.on_done = Some(done);
        self.hooks.on_timeout = Some(timeout);
        self.hooks.on_cancel = Some(cancel);
    }
}

impl<T> Drop for Task<T> {
    fn drop(&mut self) {
        self.stats.record_destroyed();
    }
}

impl<T> fmt::Debug for Task<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("timeout", &self.timeout)
            .field("parent", &self.parent)
            .field("children", &self.children)
            .field("state", &self.state)
            .field("escalated", &self.escalated)
            .finish_non_exhaustive()
    }
}
