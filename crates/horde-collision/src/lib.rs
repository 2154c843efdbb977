//! Horde collision - spatial-hash broad-phase over bounding circles.
//!
//! Pipeline per frame: snapshot positions and colliders, bucket every
//! entity into a uniform cell grid, test layer-eligible pairs cell by
//! cell (each unordered pair exactly once), then resolve overlaps
//! symmetrically and publish one categorized event per contact.

mod broadphase;
mod grid;
mod matrix;

pub use broadphase::{BroadPhase, BroadPhaseConfig};
pub use grid::{CellCoord, CellRange, DEFAULT_CELL_SIZE, SpatialGrid};
pub use matrix::{CollisionMatrix, LayerMask};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{BroadPhase, BroadPhaseConfig, CollisionMatrix, LayerMask};
}
