//! The host-facing runtime object.

use horde_ecs::World;
use horde_event::EventBus;
use horde_tick::{Metrics, Scheduler, SchedulerError, System, SystemContext};

/// Owns the four runtime parts and drives them as one unit.
///
/// The host calls [`tick`](Self::tick) once per frame with the elapsed
/// milliseconds; the value is passed through unclamped, so frame pacing and
/// spiral-of-death policy stay with the host.
pub struct Simulation {
    world: World,
    events: EventBus,
    scheduler: Scheduler,
    metrics: Metrics,
}

impl Default for Simulation {
    fn default() -> Self {
        Self::new()
    }
}

impl Simulation {
    #[must_use]
    pub fn new() -> Self {
        Self {
            world: World::new(),
            events: EventBus::new(),
            scheduler: Scheduler::new(),
            metrics: Metrics::new(),
        }
    }

    /// Register a behavior unit. When the simulation is already started the
    /// unit's `init` hook runs immediately.
    pub fn register_system(&mut self, system: Box<dyn System>) -> Result<(), SchedulerError> {
        let mut ctx = SystemContext::new(&mut self.world, &self.events, &mut self.metrics);
        self.scheduler.register(system, &mut ctx)
    }

    /// Remove a behavior unit by name. Returns whether it existed.
    pub fn unregister_system(&mut self, name: &str) -> bool {
        let mut ctx = SystemContext::new(&mut self.world, &self.events, &mut self.metrics);
        self.scheduler.unregister(name, &mut ctx)
    }

    /// Initialize every registered unit. Idempotent.
    pub fn start(&mut self) {
        let mut ctx = SystemContext::new(&mut self.world, &self.events, &mut self.metrics);
        self.scheduler.initialize(&mut ctx);
    }

    /// Advance the simulation by one frame of `dt_ms` milliseconds.
    ///
    /// No-op before [`start`](Self::start) or after
    /// [`shutdown`](Self::shutdown).
    pub fn tick(&mut self, dt_ms: f32) {
        let mut ctx = SystemContext::new(&mut self.world, &self.events, &mut self.metrics);
        self.scheduler.update(&mut ctx, dt_ms);
        self.metrics.events_published = self.events.published_count();
    }

    /// Tear every unit down in reverse order. Idempotent; the simulation
    /// refuses further registration afterwards.
    pub fn shutdown(&mut self) {
        let mut ctx = SystemContext::new(&mut self.world, &self.events, &mut self.metrics);
        self.scheduler.shutdown(&mut ctx);
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.scheduler.is_running()
    }

    #[must_use]
    pub const fn world(&self) -> &World {
        &self.world
    }

    pub const fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// The event bus handle. Cloneable; subscriptions made through a clone
    /// are visible to systems on the next dispatch.
    #[must_use]
    pub const fn events(&self) -> &EventBus {
        &self.events
    }

    #[must_use]
    pub const fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    #[must_use]
    pub const fn metrics(&self) -> &Metrics {
        &self.metrics
    }
}

impl core::fmt::Debug for Simulation {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Simulation")
            .field("running", &self.is_running())
            .field("entities", &self.world.len())
            .field("systems", &self.scheduler.len())
            .field("frames", &self.metrics.frames)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_before_start_is_a_noop() {
        let mut sim = Simulation::new();
        sim.tick(16.0);
        assert_eq!(sim.metrics().frames, 0);
    }

    #[test]
    fn test_lifecycle_counts_frames() {
        let mut sim = Simulation::new();
        sim.start();
        assert!(sim.is_running());
        sim.tick(16.0);
        sim.tick(16.0);
        assert_eq!(sim.metrics().frames, 2);

        sim.shutdown();
        assert!(!sim.is_running());
        sim.tick(16.0);
        assert_eq!(sim.metrics().frames, 2);
    }
}
