//! Horde core - the host-facing runtime.
//!
//! Bundles the entity store, event bus, and scheduler behind a single
//! [`Simulation`] object with a synchronous per-frame `tick` contract, and
//! ships the built-in behavior units (velocity integration, depleted-health
//! sweep) that the collision pass composes with.

mod health;
mod movement;
mod simulation;

pub use health::HealthSweep;
pub use movement::Movement;
pub use simulation::Simulation;

/// Prelude for convenient imports across the whole runtime.
pub mod prelude {
    pub use horde_collision::prelude::*;
    pub use horde_ecs::prelude::*;
    pub use horde_event::prelude::*;
    pub use horde_tick::prelude::*;

    pub use crate::{HealthSweep, Movement, Simulation};
}
