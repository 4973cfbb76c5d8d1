//! # Event subscribers.
//!
//! This module provides the [`Subscribe`] trait and the [`SubscriberSet`]
//! fan-out used by the [`Driver`](crate::Driver) to deliver scheduler events.
//!
//! ## Architecture
//! ```text
//! Scheduler ── publish(Event) ──► Bus ──► Driver listener ──► SubscriberSet
//!                                                              │
//!                                             ┌────────┬───────┴────┐
//!                                             ▼        ▼            ▼
//!                                         LogWriter  Metrics     Custom
//! ```

#[cfg(feature = "logging")]
mod log;
mod set;
mod subscribe;

#[cfg(feature = "logging")]
pub use log::LogWriter;
pub use set::SubscriberSet;
pub use subscribe::Subscribe;
