//! Horde tick - registration, priority ordering, and lifecycle of behavior
//! units.
//!
//! # Tick Execution Model
//!
//! ```text
//! Tick N (one synchronous call, no suspension points):
//! ┌──────────────────────────────────────────────────────────┐
//! │  INPUT     systems (priority ~100)                       │
//! │  AI        systems (priority ~200)                       │
//! │  PHYSICS   systems (priority ~300, incl. broad-phase)    │
//! │  GAMEPLAY  systems (priority ~400)                       │
//! │  PRESENT   systems (priority ~500)                       │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! Within a frame, units run in strictly ascending priority order; faults in
//! one unit are isolated so every other unit still runs.

mod context;
mod scheduler;
mod system;

pub use context::{Metrics, SystemContext};
pub use scheduler::{Scheduler, SchedulerError};
pub use system::{System, phase};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{Metrics, Scheduler, System, SystemContext, phase};
}
