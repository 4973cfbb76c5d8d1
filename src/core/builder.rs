use std::sync::Arc;

use crate::{
    core::{Scheduler, SchedulerConfig},
    events::Bus,
    tasks::IdGenerator,
};

/// Builder for constructing a [`Scheduler`] with optional features.
pub struct SchedulerBuilder {
    cfg: SchedulerConfig,
    ids: Option<Arc<IdGenerator>>,
    bus: Option<Bus>,
}

impl SchedulerBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: SchedulerConfig) -> Self {
        Self {
            cfg,
            ids: None,
            bus: None,
        }
    }

    /// Shares an id generator with other schedulers.
    ///
    /// Without it, the scheduler owns a fresh generator starting at 1.
    pub fn with_ids(mut self, ids: Arc<IdGenerator>) -> Self {
        self.ids = Some(ids);
        self
    }

    /// Publishes lifecycle events on a new bus sized by `bus_capacity`.
    pub fn with_events(mut self) -> Self {
        self.bus = Some(Bus::new(self.cfg.bus_capacity_clamped()));
        self
    }

    /// Publishes lifecycle events on an existing bus.
    pub fn with_bus(mut self, bus: Bus) -> Self {
        self.bus = Some(bus);
        self
    }

    /// Builds the scheduler.
    pub fn build<T: Send + 'static>(self) -> Scheduler<T> {
        let ids = self.ids.unwrap_or_default();
        Scheduler::from_parts(self.cfg, ids, self.bus)
    }
}
