//! Per-tick context handed to behavior units, and the frame metrics object.

use std::time::Duration;

use horde_ecs::World;
use horde_event::EventBus;

/// Frame counters, explicitly constructed by the host and passed by
/// reference to anything that reports - there is no global monitor.
#[derive(Debug, Default, Clone)]
pub struct Metrics {
    /// Completed ticks.
    pub frames: u64,
    /// Wall-clock duration of the most recent tick.
    pub last_frame: Duration,
    /// Isolated behavior unit faults, cumulative.
    pub system_faults: u64,
    /// Candidate pairs handed to the narrow distance test, cumulative.
    pub pairs_tested: u64,
    /// Overlapping pairs reported, cumulative.
    pub pairs_overlapping: u64,
    /// Events published on the bus, cumulative. Synced from the bus by the
    /// host after each frame.
    pub events_published: u64,
}

impl Metrics {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

/// Everything a behavior unit may touch during one lifecycle call.
///
/// Component references borrowed from `world` must not outlive the call.
pub struct SystemContext<'a> {
    pub world: &'a mut World,
    pub events: &'a EventBus,
    pub metrics: &'a mut Metrics,
}

impl<'a> SystemContext<'a> {
    #[must_use]
    pub fn new(world: &'a mut World, events: &'a EventBus, metrics: &'a mut Metrics) -> Self {
        Self {
            world,
            events,
            metrics,
        }
    }
}
