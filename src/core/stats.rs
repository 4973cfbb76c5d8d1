//! # Scheduler statistics.
//!
//! Plain atomic counters, shared between the scheduler, its handles and every
//! task it constructed. Used for observability only, never for control.
//!
//! | Counter              | Kind    | Updated                                   |
//! |----------------------|---------|-------------------------------------------|
//! | `constructed`        | counter | task constructed                          |
//! | `destroyed`          | counter | task dropped                              |
//! | `called`             | counter | `trigger_call`                            |
//! | `done`               | counter | `trigger_done`                            |
//! | `timed_out`          | counter | `trigger_timeout`                         |
//! | `cancelled`          | counter | `trigger_cancel` (each task in a cascade) |
//! | `queue_ready`        | gauge   | live: +1 on emit, -1 on drain             |
//! | `queue_wait`         | gauge   | snapshot at the start of `run()`          |
//! | `queue_wait_by_time` | gauge   | snapshot at the start of `run()`          |

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Live counters.
#[derive(Debug, Default)]
pub struct Stats {
    constructed: AtomicU64,
    destroyed: AtomicU64,
    called: AtomicU64,
    done: AtomicU64,
    timed_out: AtomicU64,
    cancelled: AtomicU64,
    queue_ready: AtomicU64,
    queue_wait: AtomicU64,
    queue_wait_by_time: AtomicU64,
}

/// Point-in-time copy of [`Stats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub constructed: u64,
    pub destroyed: u64,
    pub called: u64,
    pub done: u64,
    pub timed_out: u64,
    pub cancelled: u64,
    pub queue_ready: u64,
    pub queue_wait: u64,
    pub queue_wait_by_time: u64,
}

impl Stats {
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            constructed: self.constructed.load(Ordering::Relaxed),
            destroyed: self.destroyed.load(Ordering::Relaxed),
            called: self.called.load(Ordering::Relaxed),
            done: self.done.load(Ordering::Relaxed),
            timed_out: self.timed_out.load(Ordering::Relaxed),
            cancelled: self.cancelled.load(Ordering::Relaxed),
            queue_ready: self.queue_ready.load(Ordering::Relaxed),
            queue_wait: self.queue_wait.load(Ordering::Relaxed),
            queue_wait_by_time: self.queue_wait_by_time.load(Ordering::Relaxed),
        }
    }

    #[inline]
    pub(crate) fn record_constructed(&self) {
        self.constructed.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_destroyed(&self) {
        self.destroyed.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_called(&self) {
        self.called.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_done(&self) {
        self.done.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_timed_out(&self) {
        self.timed_out.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_cancelled(&self) {
        self.cancelled.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn ready_pushed(&self) {
        self.queue_ready.fetch_add(1, Ordering::Relaxed);
    }

    /// Saturating decrement of the ready gauge.
    pub(crate) fn ready_popped(&self) {
        let _ = self
            .queue_ready
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| n.checked_sub(1));
    }

    pub(crate) fn set_wait_depths(&self, wait: usize, wait_by_time: usize) {
        self.queue_wait.store(wait as u64, Ordering::Relaxed);
        self.queue_wait_by_time
            .store(wait_by_time as u64, Ordering::Relaxed);
    }
}

impl StatsSnapshot {
    /// Tasks constructed but not yet dropped.
    pub fn alive(&self) -> u64 {
        self.constructed.saturating_sub(self.destroyed)
    }
}

impl fmt::Display for StatsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "construct={} destroyed={} call={} done={} timeout={} cancel={} \
             queue_ready={} queue_wait={} queue_wait_by_time={}",
            self.constructed,
            self.destroyed,
            self.called,
            self.done,
            self.timed_out,
            self.cancelled,
            self.queue_ready,
            self.queue_wait,
            self.queue_wait_by_time,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ready_gauge_never_underflows() {
        let stats = Stats::default();
        stats.ready_popped();
        assert_eq!(stats.snapshot().queue_ready, 0);
        stats.ready_pushed();
        stats.ready_pushed();
        stats.ready_popped();
        assert_eq!(stats.snapshot().queue_ready, 1);
    }

    #[test]
    fn test_display_lists_every_counter() {
        let stats = Stats::default();
        stats.record_constructed();
        stats.record_called();
        stats.record_timed_out();
        stats.set_wait_depths(3, 2);
        let text = stats.snapshot().to_string();
        assert_eq!(
            text,
            "construct=1 destroyed=0 call=1 done=0 timeout=1 cancel=0 \
             queue_ready=0 queue_wait=3 queue_wait_by_time=2"
        );
    }

    #[test]
    fn test_alive_is_constructed_minus_destroyed() {
        let snap = StatsSnapshot {
            constructed: 5,
            destroyed: 3,
            ..StatsSnapshot::default()
        };
        assert_eq!(snap.alive(), 2);
    }
}
