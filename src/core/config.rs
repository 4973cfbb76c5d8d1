//! # Scheduler configuration.
//!
//! Provides [`SchedulerConfig`] centralized settings for a scheduler and its driver.
//!
//! Config is used in two ways:
//! 1. **Scheduler creation**: `Scheduler::new(config)` / `Scheduler::builder(config)`
//! 2. **Task defaults**: tasks created through a [`Handle`](crate::Handle) start with
//!    `default_timeout`
//!
//! ## Sentinel values
//! - `default_timeout = 0s` → tasks never time out unless configured per task
//! - `max_batch = 0` → the drain step takes everything queued at that moment

use std::time::Duration;

use crate::tasks::Timeout;

/// Configuration for a [`Scheduler`](crate::Scheduler) and its [`Driver`](crate::Driver).
///
/// ## Field semantics
/// - `tick`: period between two `run()` calls made by the driver
/// - `default_timeout`: initial timeout of handle-built tasks (`0s` = never)
/// - `max_batch`: commands drained per `run()` (`0` = unlimited)
/// - `bus_capacity`: event bus ring buffer size (min 1)
/// - `cancel_on_shutdown`: driver cancels everything in flight when it stops
/// - `handle_signals`: driver also stops on SIGINT/SIGTERM/SIGQUIT (Ctrl-C elsewhere)
#[derive(Clone, Debug)]
pub struct SchedulerConfig {
    /// Period of the driver's `run()` tick. Timeout precision is bounded by it.
    pub tick: Duration,

    /// Default task timeout.
    ///
    /// - `Duration::ZERO` = never
    /// - `> 0` = measured from task construction
    pub default_timeout: Duration,

    /// Maximum number of queued commands (emissions, completions, cancellations)
    /// processed by a single `run()`. Leftovers wait for the next tick.
    pub max_batch: usize,

    /// Capacity of the event bus broadcast channel.
    pub bus_capacity: usize,

    /// Cancel every in-flight task when the driver stops.
    pub cancel_on_shutdown: bool,

    /// Stop the driver on OS termination signals.
    pub handle_signals: bool,
}

impl SchedulerConfig {
    /// Returns the default task timeout as a [`Timeout`].
    #[inline]
    pub fn default_timeout(&self) -> Timeout {
        if self.default_timeout == Duration::ZERO {
            Timeout::Never
        } else {
            Timeout::After(self.default_timeout)
        }
    }

    /// Returns the drain limit as an `Option`.
    ///
    /// - `None` → unlimited
    /// - `Some(n)` → at most `n` commands per `run()`
    #[inline]
    pub fn batch_limit(&self) -> Option<usize> {
        if self.max_batch == 0 {
            None
        } else {
            Some(self.max_batch)
        }
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }

    /// Returns a tick period clamped to at least 1ms.
    #[inline]
    pub fn tick_clamped(&self) -> Duration {
        self.tick.max(Duration::from_millis(1))
    }
}

impl Default for SchedulerConfig {
    /// Default configuration:
    ///
    /// - `tick = 20ms`
    /// - `default_timeout = 0s` (never)
    /// - `max_batch = 0` (unlimited)
    /// - `bus_capacity = 1024`
    /// - `cancel_on_shutdown = true`
    /// - `handle_signals = false`
    fn default() -> Self {
        Self {
            tick: Duration::from_millis(20),
            default_timeout: Duration::ZERO,
            max_batch: 0,
            bus_capacity: 1024,
            cancel_on_shutdown: true,
            handle_signals: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_sentinels() {
        let cfg = SchedulerConfig::default();
        assert_eq!(cfg.default_timeout(), Timeout::Never);
        assert_eq!(cfg.batch_limit(), None);
    }

    #[test]
    fn test_explicit_values() {
        let cfg = SchedulerConfig {
            default_timeout: Duration::from_millis(250),
            max_batch: 64,
            bus_capacity: 0,
            tick: Duration::ZERO,
            ..SchedulerConfig::default()
        };
        assert_eq!(
            cfg.default_timeout(),
            Timeout::After(Duration::from_millis(250))
        );
        assert_eq!(cfg.batch_limit(), Some(64));
        assert_eq!(cfg.bus_capacity_clamped(), 1);
        assert_eq!(cfg.tick_clamped(), Duration::from_millis(1));
    }
}
