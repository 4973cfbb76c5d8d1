//! # Serial and parallel fan-out/fan-in.
//!
//! Composite behavior lives on the scheduler because it needs to trigger the
//! children it owns. A composite is notified of each child's terminal event:
//!
//! ```text
//! Serial   call        ─► call(head)
//!          child_done  ─► head ? drop child; empty ? done(self) : call(new head)
//! Parallel call        ─► call(every child)
//!          child_done  ─► drop child; empty ? done(self) : wait
//! both     child_timeout / child_cancelled
//!                      ─► drop child; escalated; own timeout := 0 (expires next sweep)
//! ```
//!
//! A child timeout never cancels siblings directly. The composite expires on
//! the following sweep, and its own timeout then cancels whatever is left.
//! Once escalated, a composite is never completed by its remaining children.

use crate::core::Scheduler;
use crate::events::{Event, EventKind};
use crate::tasks::{TaskId, TaskKind};

impl<T: Send + 'static> Scheduler<T> {
    /// Calls the lowest-id child of a serial task; completes it if none is left.
    ///
    /// Children that finish while being called (empty composites) are stepped
    /// over here rather than through `child_done`, so the stack stays flat
    /// however many of them are lined up.
    pub(crate) fn call_head(&mut self, id: TaskId) {
        loop {
            let head = match self.task_mut(id) {
                Some(task) if task.escalated => return,
                Some(task) => {
                    task.advancing = true;
                    task.children.first().copied()
                }
                None => return,
            };
            let Some(child) = head else {
                self.trigger_done(id, None);
                return;
            };

            let called = self.trigger_call(child);
            if self.is_registered(child) {
                break;
            }
            if !called {
                // Finished out of order before it became head.
                tracing::debug!(task = %id, child = %child, "skipping settled child");
                if let Some(task) = self.task_mut(id) {
                    task.children.remove(&child);
                }
            }
        }
        if let Some(task) = self.task_mut(id) {
            task.advancing = false;
        }
    }

    /// Calls every child of a parallel task; completes it if it has none.
    pub(crate) fn call_all(&mut self, id: TaskId) {
        let children: Vec<TaskId> = match self.task_mut(id) {
            Some(task) => task.children.iter().copied().collect(),
            None => return,
        };
        if children.is_empty() {
            self.trigger_done(id, None);
            return;
        }
        for child in children {
            // An earlier child may have completed the parent already.
            if !self.is_registered(id) {
                break;
            }
            self.trigger_call(child);
        }
    }

    pub(crate) fn child_done(&mut self, parent: TaskId, child: TaskId) {
        let Some(task) = self.task_mut(parent) else {
            return;
        };
        let kind = task.kind();
        let was_head = task.children.first() == Some(&child);
        if kind == TaskKind::Serial && !was_head {
            return;
        }
        task.children.remove(&child);
        if task.escalated || task.advancing {
            return;
        }
        let empty = task.children.is_empty();

        match kind {
            TaskKind::Leaf => {}
            TaskKind::Serial => {
                if empty {
                    self.trigger_done(parent, None);
                } else {
                    self.call_head(parent);
                }
            }
            TaskKind::Parallel => {
                if empty {
                    self.trigger_done(parent, None);
                }
            }
        }
    }

    pub(crate) fn child_timeout(&mut self, parent: TaskId, child: TaskId) {
        self.escalate(parent, child, "child timed out");
    }

    pub(crate) fn child_cancelled(&mut self, parent: TaskId, child: TaskId) {
        self.escalate(parent, child, "child cancelled");
    }

    /// Drops `child` from `parent` and forces `parent` to expire on the next sweep.
    fn escalate(&mut self, parent: TaskId, child: TaskId, why: &str) {
        let Some(task) = self.task_mut(parent) else {
            return;
        };
        if !task.kind().is_composite() {
            return;
        }
        task.children.remove(&child);
        task.escalate();

        tracing::debug!(task = %parent, child = %child, "{why}; escalating timeout");
        self.index_by_time(parent);
        self.publish(self.has_bus().then(|| {
            Event::new(EventKind::TimeoutEscalated)
                .with_task(parent)
                .with_reason(format!("{why}: {child}"))
        }));
    }
}
