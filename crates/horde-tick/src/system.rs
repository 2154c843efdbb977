//! The behavior unit trait and frame phase constants.

use crate::context::SystemContext;

/// Coarse frame phases, encoded as priority bands.
///
/// Lower priorities run first, so each phase sees already-updated state from
/// the phase before it within the same frame. Systems are free to pick
/// priorities between bands; these constants only anchor the convention.
pub mod phase {
    /// Input capture and intent resolution.
    pub const INPUT: i32 = 100;
    /// AI decisions and steering.
    pub const AI: i32 = 200;
    /// Movement integration and collision.
    pub const PHYSICS: i32 = 300;
    /// Gameplay rules reacting to physics outcomes.
    pub const GAMEPLAY: i32 = 400;
    /// State synchronization for external render/audio collaborators.
    pub const PRESENT: i32 = 500;
}

/// A named, priority-tagged unit of per-frame logic.
///
/// Lifecycle: `init` once on scheduler start (or immediately on registration
/// if the scheduler is already running), `update` once per tick, `shutdown`
/// once in reverse priority order on teardown. A unit holding subscriptions
/// or caches must release them in `shutdown`.
///
/// Faults returned from any hook are isolated by the scheduler: logged,
/// counted, and never allowed to abort the rest of the frame.
pub trait System {
    fn name(&self) -> &'static str;

    /// Ordering key; lower runs first, ties keep registration order.
    fn priority(&self) -> i32;

    fn init(&mut self, _ctx: &mut SystemContext<'_>) -> eyre::Result<()> {
        Ok(())
    }

    /// Advance one frame. `dt_ms` is wall-clock milliseconds since the
    /// previous tick, forwarded unclamped from the host.
    fn update(&mut self, ctx: &mut SystemContext<'_>, dt_ms: f32) -> eyre::Result<()>;

    fn shutdown(&mut self, _ctx: &mut SystemContext<'_>) -> eyre::Result<()> {
        Ok(())
    }
}
