//! # Driver: hosts a scheduler on a tokio task and ticks it.
//!
//! The scheduler itself performs no I/O and spawns nothing; something has to
//! call [`Scheduler::run`] periodically from one thread. [`Driver`] is that
//! host for tokio applications.
//!
//! ## Flow
//! ```text
//! Driver::run(token)
//!   ├─► listener: Bus ─► SubscriberSet::emit(&Event)      (if subscribers)
//!   ├─► loop {
//!   │     select! {
//!   │       token.cancelled()          ─► break
//!   │       OS signal (optional)       ─► break
//!   │       interval.tick()            ─► scheduler.run()
//!   │     }
//!   │   }
//!   ├─► publish ShutdownRequested
//!   ├─► cancel_on_shutdown ? scheduler.cancel_all()
//!   └─► flush listener, shut subscribers down, return the scheduler
//! ```
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use tokio_util::sync::CancellationToken;
//! use taskweave::{Driver, Scheduler, SchedulerConfig};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let cfg = SchedulerConfig { tick: Duration::from_millis(5), ..Default::default() };
//!     let scheduler: Scheduler<String> = Scheduler::new(cfg);
//!     let handle = scheduler.handle();
//!
//!     let mut get = handle.task().on_call(|ctx| {
//!         let _ = ctx.done("pong".to_string());
//!     });
//!     let reply = get.completion();
//!     handle.emit(get).unwrap();
//!
//!     let token = CancellationToken::new();
//!     let driver = Driver::new(scheduler).spawn(token.clone());
//!
//!     assert_eq!(reply.await.unwrap().as_deref(), Some("pong"));
//!     token.cancel();
//!     let scheduler = driver.await.unwrap();
//!     assert_eq!(scheduler.stats().done, 1);
//! }
//! ```

use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::core::{Scheduler, shutdown};
use crate::events::{Event, EventKind};
use crate::subscribers::{Subscribe, SubscriberSet};

/// Periodic host of a [`Scheduler`].
pub struct Driver<T> {
    scheduler: Scheduler<T>,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl<T: Send + 'static> Driver<T> {
    pub fn new(scheduler: Scheduler<T>) -> Self {
        Self {
            scheduler,
            subscribers: Vec::new(),
        }
    }

    /// Sets event subscribers.
    ///
    /// They only receive events if the scheduler was built with an event bus
    /// (`SchedulerBuilder::with_events`).
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Access to the scheduler before the driver starts.
    pub fn scheduler_mut(&mut self) -> &mut Scheduler<T> {
        &mut self.scheduler
    }

    /// Runs the driver on a new tokio task.
    pub fn spawn(self, token: CancellationToken) -> JoinHandle<Scheduler<T>> {
        tokio::spawn(self.run(token))
    }

    /// Ticks the scheduler until `token` is cancelled (or a signal arrives, if
    /// enabled), then shuts down and hands the scheduler back.
    pub async fn run(self, token: CancellationToken) -> Scheduler<T> {
        let Driver {
            mut scheduler,
            subscribers,
        } = self;

        let tick = scheduler.config().tick_clamped();
        let handle_signals = scheduler.config().handle_signals;
        let listener_stop = CancellationToken::new();
        let listener = spawn_listener(&scheduler, subscribers, listener_stop.clone());

        let mut interval = time::interval(tick);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let signal = shutdown::signal_or_pending(handle_signals);
        tokio::pin!(signal);

        tracing::debug!(tick_ms = tick.as_millis() as u64, "driver started");
        loop {
            tokio::select! {
                biased;
                _ = token.cancelled() => break,
                _ = &mut signal => {
                    tracing::info!("shutdown signal received");
                    break;
                }
                _ = interval.tick() => scheduler.run(),
            }
        }

        scheduler.publish(Some(Event::new(EventKind::ShutdownRequested)));
        if scheduler.config().cancel_on_shutdown {
            let roots = scheduler.cancel_all();
            tracing::debug!(roots, "cancelled in-flight tasks on shutdown");
        }
        tracing::debug!(stats = %scheduler.stat_string(), "driver stopped");

        listener_stop.cancel();
        if let Some(join) = listener {
            if let Ok(set) = join.await {
                set.shutdown().await;
            }
        }
        scheduler
    }
}

/// Forwards bus events into a [`SubscriberSet`] until `stop` is cancelled and
/// the already-published backlog is delivered.
fn spawn_listener<T: Send + 'static>(
    scheduler: &Scheduler<T>,
    subscribers: Vec<Arc<dyn Subscribe>>,
    stop: CancellationToken,
) -> Option<JoinHandle<SubscriberSet>> {
    let bus = scheduler.bus()?.clone();
    if subscribers.is_empty() {
        return None;
    }

    let mut rx = bus.subscribe();
    let set = SubscriberSet::new(subscribers, Some(bus));
    Some(tokio::spawn(async move {
        loop {
            tokio::select! {
                biased;
                msg = rx.recv() => match msg {
                    Ok(ev) => set.emit(&ev),
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!(skipped = n, "event listener lagged");
                    }
                },
                _ = stop.cancelled() => break,
            }
        }
        set
    }))
}
