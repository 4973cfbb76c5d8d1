//! # LogWriter — event printer
//!
//! A minimal subscriber that renders incoming [`Event`]s through `tracing`.
//! Use it for tests or demos.
//!
//! ## Example output
//! ```text
//! [called] task=12 kind=serial timeout_ms=500
//! [done] task=10 parent=12 elapsed_ms=31
//! [timeout] task=11 parent=12 elapsed_ms=503 timeout_ms=500
//! [escalated] task=12 reason="child timed out: 11"
//! [cancelled] task=13 parent=12
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

fn opt<D: std::fmt::Display>(v: Option<D>) -> String {
    v.map_or_else(|| "-".to_string(), |v| v.to_string())
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let task = opt(e.task);
        let parent = opt(e.parent);
        match e.kind {
            EventKind::TaskCalled => tracing::info!(
                "[called] task={task} kind={} timeout_ms={}",
                opt(e.task_kind.map(|k| k.as_label())),
                opt(e.timeout_ms),
            ),
            EventKind::TaskDone => tracing::info!(
                "[done] task={task} parent={parent} elapsed_ms={}",
                opt(e.elapsed_ms)
            ),
            EventKind::TaskTimedOut => tracing::info!(
                "[timeout] task={task} parent={parent} elapsed_ms={} timeout_ms={}",
                opt(e.elapsed_ms),
                opt(e.timeout_ms),
            ),
            EventKind::TaskCancelled => tracing::info!("[cancelled] task={task} parent={parent}"),
            EventKind::TimeoutEscalated => {
                tracing::info!("[escalated] task={task} reason={:?}", e.reason)
            }
            EventKind::ShutdownRequested => tracing::info!("[shutdown-requested]"),
            EventKind::SubscriberOverflow => {
                tracing::warn!("[subscriber-overflow] reason={:?}", e.reason)
            }
            EventKind::SubscriberPanicked => {
                tracing::warn!("[subscriber-panicked] reason={:?}", e.reason)
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
