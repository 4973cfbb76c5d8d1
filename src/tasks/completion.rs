//! # Awaitable terminal outcome of a task.
//!
//! [`Task::completion`] turns the callback-style terminal events into a future,
//! which is how async collaborators (an RPC client, a cache) translate a task's
//! timeout or cancellation into their own error:
//!
//! ```text
//! done(value) ─► Ok(value)
//! timeout()   ─► Err(TaskError::Timeout { elapsed })
//! cancel()    ─► Err(TaskError::Canceled)
//! dropped     ─► Err(TaskError::Dropped)
//! ```

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};

use tokio::sync::oneshot;

use crate::error::TaskError;
use crate::tasks::Task;

type Outcome<T> = Result<Option<T>, TaskError>;
type Slot<T> = Arc<Mutex<Option<oneshot::Sender<Outcome<T>>>>>;

/// Future resolving once the task reaches a terminal state.
#[derive(Debug)]
pub struct Completion<T> {
    rx: oneshot::Receiver<Outcome<T>>,
}

impl<T> Future for Completion<T> {
    type Output = Outcome<T>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx)
            .poll(cx)
            .map(|res| res.unwrap_or(Err(TaskError::Dropped)))
    }
}

fn resolve<T>(slot: &Slot<T>, outcome: Outcome<T>) {
    let tx = match slot.lock() {
        Ok(mut guard) => guard.take(),
        Err(poisoned) => poisoned.into_inner().take(),
    };
    if let Some(tx) = tx {
        let _ = tx.send(outcome);
    }
}

impl<T: Send + 'static> Task<T> {
    /// Installs terminal callbacks that resolve the returned [`Completion`].
    ///
    /// Replaces any `on_done`/`on_timeout`/`on_cancel` set so far; `on_call` is kept.
    pub fn completion(&mut self) -> Completion<T> {
        let (tx, rx) = oneshot::channel();
        let slot: Slot<T> = Arc::new(Mutex::new(Some(tx)));
        let created = self.created();

        let on_done = {
            let slot = Arc::clone(&slot);
            Box::new(move |value: Option<T>| resolve(&slot, Ok(value)))
        };
        let on_timeout = {
            let slot = Arc::clone(&slot);
            Box::new(move || {
                resolve(
                    &slot,
                    Err(TaskError::Timeout {
                        elapsed: created.elapsed(),
                    }),
                )
            })
        };
        let on_cancel = Box::new(move || resolve(&slot, Err(TaskError::Canceled)));

        self.set_terminal_hooks(on_done, on_timeout, on_cancel);
        Completion { rx }
    }
}
