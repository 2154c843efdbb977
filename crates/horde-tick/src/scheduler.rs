//! Registration, ordering, and lifecycle of behavior units.
//!
//! Structural mistakes (duplicate names, wiring after teardown) fail fast;
//! runtime faults inside a unit's hooks are isolated per unit so a single
//! misbehaving system degrades rather than halting the frame.

use std::time::Instant;

use crate::context::{Metrics, SystemContext};
use crate::system::System;

/// Wiring-time errors. These indicate a programming mistake, not a runtime
/// condition, and are raised to the caller.
#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
    #[error("a system named `{0}` is already registered")]
    DuplicateName(String),
    #[error("scheduler has been shut down")]
    ShutDown,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum State {
    /// Registered units wait for `initialize`.
    Idle,
    Running,
    /// Terminal; registration and updates are refused.
    Stopped,
}

struct Slot {
    /// Registration order, breaks priority ties.
    seq: u64,
    system: Box<dyn System>,
}

/// Owns the registered behavior units and drives their lifecycle in
/// ascending priority order (descending for shutdown).
pub struct Scheduler {
    slots: Vec<Slot>,
    next_seq: u64,
    state: State,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            slots: Vec::new(),
            next_seq: 0,
            state: State::Idle,
        }
    }

    /// Register a unit, re-sorting the execution order.
    ///
    /// If the scheduler is already running, the unit's `init` hook runs
    /// immediately (fault-isolated).
    pub fn register(
        &mut self,
        system: Box<dyn System>,
        ctx: &mut SystemContext<'_>,
    ) -> Result<(), SchedulerError> {
        if self.state == State::Stopped {
            return Err(SchedulerError::ShutDown);
        }
        if self.slots.iter().any(|slot| slot.system.name() == system.name()) {
            return Err(SchedulerError::DuplicateName(system.name().to_owned()));
        }

        let seq = self.next_seq;
        self.next_seq += 1;
        self.slots.push(Slot { seq, system });
        self.sort_slots();

        if self.state == State::Running {
            if let Some(slot) = self.slots.iter_mut().find(|slot| slot.seq == seq) {
                let result = slot.system.init(ctx);
                isolate(slot.system.name(), "init", result, ctx.metrics);
            }
        }
        Ok(())
    }

    /// Remove a unit by name, running its `shutdown` hook first when the
    /// scheduler is running. Returns whether the unit existed.
    pub fn unregister(&mut self, name: &str, ctx: &mut SystemContext<'_>) -> bool {
        let Some(index) = self.slots.iter().position(|slot| slot.system.name() == name) else {
            return false;
        };
        let mut slot = self.slots.remove(index);
        if self.state == State::Running {
            let result = slot.system.shutdown(ctx);
            isolate(slot.system.name(), "shutdown", result, ctx.metrics);
        }
        true
    }

    /// Run every unit's `init` hook in priority order. Idempotent.
    pub fn initialize(&mut self, ctx: &mut SystemContext<'_>) {
        if self.state != State::Idle {
            return;
        }
        self.state = State::Running;
        tracing::debug!(systems = self.slots.len(), "scheduler starting");
        for slot in &mut self.slots {
            let result = slot.system.init(ctx);
            isolate(slot.system.name(), "init", result, ctx.metrics);
        }
    }

    /// Advance one frame: every unit's `update`, ascending priority.
    ///
    /// No-op unless running. A fault in one unit is logged and counted and
    /// the remaining units still run this frame.
    pub fn update(&mut self, ctx: &mut SystemContext<'_>, dt_ms: f32) {
        if self.state != State::Running {
            return;
        }
        let started = Instant::now();
        for slot in &mut self.slots {
            let result = slot.system.update(ctx, dt_ms);
            isolate(slot.system.name(), "update", result, ctx.metrics);
        }
        ctx.metrics.frames += 1;
        ctx.metrics.last_frame = started.elapsed();
    }

    /// Run every unit's `shutdown` hook in strict reverse priority order.
    /// Idempotent; the scheduler refuses further registration afterwards.
    pub fn shutdown(&mut self, ctx: &mut SystemContext<'_>) {
        match self.state {
            State::Stopped => return,
            State::Idle => {
                // Never initialized; nothing to unwind.
                self.state = State::Stopped;
                return;
            }
            State::Running => {}
        }
        self.state = State::Stopped;
        tracing::debug!(systems = self.slots.len(), "scheduler stopping");
        for slot in self.slots.iter_mut().rev() {
            let result = slot.system.shutdown(ctx);
            isolate(slot.system.name(), "shutdown", result, ctx.metrics);
        }
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.state == State::Running
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Registered unit names in effective execution order.
    #[must_use]
    pub fn execution_order(&self) -> Vec<&'static str> {
        self.slots.iter().map(|slot| slot.system.name()).collect()
    }

    fn sort_slots(&mut self) {
        self.slots
            .sort_by_key(|slot| (slot.system.priority(), slot.seq));
    }
}

impl core::fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Scheduler")
            .field("state", &self.state)
            .field("systems", &self.execution_order())
            .finish()
    }
}

/// Log and count a fault without letting it abort the frame.
fn isolate(name: &str, stage: &str, result: eyre::Result<()>, metrics: &mut Metrics) {
    if let Err(error) = result {
        metrics.system_faults += 1;
        tracing::error!(system = name, stage, %error, "system fault isolated");
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use horde_ecs::World;
    use horde_event::EventBus;

    use super::*;

    type Log = Rc<RefCell<Vec<String>>>;

    struct Recorder {
        name: &'static str,
        priority: i32,
        log: Log,
        fail_update: bool,
    }

    impl Recorder {
        fn boxed(name: &'static str, priority: i32, log: &Log) -> Box<dyn System> {
            Box::new(Self {
                name,
                priority,
                log: Rc::clone(log),
                fail_update: false,
            })
        }

        fn failing(name: &'static str, priority: i32, log: &Log) -> Box<dyn System> {
            Box::new(Self {
                name,
                priority,
                log: Rc::clone(log),
                fail_update: true,
            })
        }
    }

    impl System for Recorder {
        fn name(&self) -> &'static str {
            self.name
        }

        fn priority(&self) -> i32 {
            self.priority
        }

        fn init(&mut self, _ctx: &mut SystemContext<'_>) -> eyre::Result<()> {
            self.log.borrow_mut().push(format!("init:{}", self.name));
            Ok(())
        }

        fn update(&mut self, _ctx: &mut SystemContext<'_>, _dt_ms: f32) -> eyre::Result<()> {
            self.log.borrow_mut().push(format!("update:{}", self.name));
            if self.fail_update {
                eyre::bail!("{} refused to update", self.name);
            }
            Ok(())
        }

        fn shutdown(&mut self, _ctx: &mut SystemContext<'_>) -> eyre::Result<()> {
            self.log.borrow_mut().push(format!("shutdown:{}", self.name));
            Ok(())
        }
    }

    struct Harness {
        world: World,
        events: EventBus,
        metrics: Metrics,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                world: World::new(),
                events: EventBus::new(),
                metrics: Metrics::new(),
            }
        }

        fn ctx(&mut self) -> SystemContext<'_> {
            SystemContext::new(&mut self.world, &self.events, &mut self.metrics)
        }
    }

    #[test]
    fn test_update_runs_in_ascending_priority_order() {
        let log: Log = Log::default();
        let mut harness = Harness::new();
        let mut scheduler = Scheduler::new();

        // Registered out of order on purpose.
        for (name, priority) in [("c", 30), ("a", 10), ("b", 20)] {
            scheduler
                .register(Recorder::boxed(name, priority, &log), &mut harness.ctx())
                .unwrap();
        }
        scheduler.initialize(&mut harness.ctx());
        log.borrow_mut().clear();

        scheduler.update(&mut harness.ctx(), 16.0);
        assert_eq!(*log.borrow(), vec!["update:a", "update:b", "update:c"]);
    }

    #[test]
    fn test_priority_ties_keep_registration_order() {
        let log: Log = Log::default();
        let mut harness = Harness::new();
        let mut scheduler = Scheduler::new();

        for name in ["first", "second"] {
            scheduler
                .register(Recorder::boxed(name, 10, &log), &mut harness.ctx())
                .unwrap();
        }
        scheduler.initialize(&mut harness.ctx());
        log.borrow_mut().clear();

        scheduler.update(&mut harness.ctx(), 16.0);
        assert_eq!(*log.borrow(), vec!["update:first", "update:second"]);
    }

    #[test]
    fn test_shutdown_is_reverse_of_init_order() {
        let log: Log = Log::default();
        let mut harness = Harness::new();
        let mut scheduler = Scheduler::new();

        for (name, priority) in [("mid", 20), ("early", 10), ("late", 30)] {
            scheduler
                .register(Recorder::boxed(name, priority, &log), &mut harness.ctx())
                .unwrap();
        }
        scheduler.initialize(&mut harness.ctx());
        scheduler.shutdown(&mut harness.ctx());

        assert_eq!(
            *log.borrow(),
            vec![
                "init:early",
                "init:mid",
                "init:late",
                "shutdown:late",
                "shutdown:mid",
                "shutdown:early",
            ]
        );
    }

    #[test]
    fn test_duplicate_name_is_rejected() {
        let log: Log = Log::default();
        let mut harness = Harness::new();
        let mut scheduler = Scheduler::new();

        scheduler
            .register(Recorder::boxed("ai", 10, &log), &mut harness.ctx())
            .unwrap();
        let err = scheduler
            .register(Recorder::boxed("ai", 20, &log), &mut harness.ctx())
            .unwrap_err();
        assert!(matches!(err, SchedulerError::DuplicateName(name) if name == "ai"));
    }

    #[test]
    fn test_register_after_shutdown_is_rejected() {
        let log: Log = Log::default();
        let mut harness = Harness::new();
        let mut scheduler = Scheduler::new();

        scheduler.initialize(&mut harness.ctx());
        scheduler.shutdown(&mut harness.ctx());

        let err = scheduler
            .register(Recorder::boxed("late", 10, &log), &mut harness.ctx())
            .unwrap_err();
        assert!(matches!(err, SchedulerError::ShutDown));
    }

    #[test]
    fn test_register_while_running_inits_immediately() {
        let log: Log = Log::default();
        let mut harness = Harness::new();
        let mut scheduler = Scheduler::new();

        scheduler.initialize(&mut harness.ctx());
        scheduler
            .register(Recorder::boxed("hot", 10, &log), &mut harness.ctx())
            .unwrap();

        assert_eq!(*log.borrow(), vec!["init:hot"]);
    }

    #[test]
    fn test_update_before_initialize_is_noop() {
        let log: Log = Log::default();
        let mut harness = Harness::new();
        let mut scheduler = Scheduler::new();

        scheduler
            .register(Recorder::boxed("idle", 10, &log), &mut harness.ctx())
            .unwrap();
        scheduler.update(&mut harness.ctx(), 16.0);
        assert!(log.borrow().is_empty());
        assert_eq!(harness.metrics.frames, 0);
    }

    #[test]
    fn test_fault_in_one_unit_does_not_stop_the_frame() {
        let log: Log = Log::default();
        let mut harness = Harness::new();
        let mut scheduler = Scheduler::new();

        scheduler
            .register(Recorder::failing("broken", 10, &log), &mut harness.ctx())
            .unwrap();
        scheduler
            .register(Recorder::boxed("healthy", 20, &log), &mut harness.ctx())
            .unwrap();
        scheduler.initialize(&mut harness.ctx());
        log.borrow_mut().clear();

        scheduler.update(&mut harness.ctx(), 16.0);

        assert_eq!(*log.borrow(), vec!["update:broken", "update:healthy"]);
        assert_eq!(harness.metrics.system_faults, 1);
        assert_eq!(harness.metrics.frames, 1);
    }

    #[test]
    fn test_unregister_runs_shutdown_when_running() {
        let log: Log = Log::default();
        let mut harness = Harness::new();
        let mut scheduler = Scheduler::new();

        scheduler
            .register(Recorder::boxed("temp", 10, &log), &mut harness.ctx())
            .unwrap();
        scheduler.initialize(&mut harness.ctx());

        assert!(scheduler.unregister("temp", &mut harness.ctx()));
        assert!(!scheduler.unregister("temp", &mut harness.ctx()));
        assert_eq!(*log.borrow(), vec!["init:temp", "shutdown:temp"]);
        assert!(scheduler.is_empty());
    }

    #[test]
    fn test_initialize_is_idempotent() {
        let log: Log = Log::default();
        let mut harness = Harness::new();
        let mut scheduler = Scheduler::new();

        scheduler
            .register(Recorder::boxed("once", 10, &log), &mut harness.ctx())
            .unwrap();
        scheduler.initialize(&mut harness.ctx());
        scheduler.initialize(&mut harness.ctx());
        assert_eq!(*log.borrow(), vec!["init:once"]);
    }
}
