//! Runtime core: scheduler, composites and hosting.
//!
//! Internal modules:
//! - [`scheduler`]: ready queue, wait indices, `run()` and the four triggers;
//! - [`composite`]: serial/parallel fan-out and fan-in rules;
//! - [`handle`]: thread-safe submission and completion reporting;
//! - [`driver`]: tokio host calling `run()` on a fixed tick;
//! - [`stats`]: observability counters;
//! - [`config`]: scheduler settings;
//! - [`shutdown`]: OS signal handling for the driver.

mod builder;
mod composite;
mod config;
mod driver;
mod handle;
mod scheduler;
mod shutdown;
mod stats;

pub use builder::SchedulerBuilder;
pub use config::SchedulerConfig;
pub use driver::Driver;
pub use handle::Handle;
pub use scheduler::Scheduler;
pub use stats::{Stats, StatsSnapshot};
