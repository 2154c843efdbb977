//! Horde ECS - entity and component store for the simulation core.
//!
//! # Key Concepts
//!
//! - **Entity**: an opaque generational handle to one in-game object
//! - **Component**: kind-tagged plain data attached to an entity, at most
//!   one per kind (`Position`, `Velocity`, `Health`, `Collider`, `AiState`,
//!   `SpriteState`)
//! - **Query**: a fresh "with all of / without any of" snapshot of matching
//!   entities, never cached across frames
//!
//! The component set is a closed sum type so behavior code matches on it
//! exhaustively; string names exist only at the wiring boundary
//! ([`std::str::FromStr`] on [`ComponentKind`] and [`Layer`]).

mod component;
mod entity;
mod layer;
mod math;
mod query;
mod world;

pub use component::{
    AiMode, AiState, Collider, Component, ComponentKind, ComponentValue, Health, Position,
    SpriteState, Velocity,
};
pub use entity::{Entity, EntityAllocator, EntityIndex, Generation};
pub use layer::{Layer, LayerPair};
pub use math::Vec2;
pub use query::QueryBuilder;
pub use world::World;

/// Failure to resolve a boundary string to a closed kind.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseKindError {
    #[error("unknown component kind `{0}`")]
    UnknownComponent(String),
    #[error("unknown collision layer `{0}`")]
    UnknownLayer(String),
}

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{
        AiState, Collider, Component, ComponentKind, ComponentValue, Entity, Health, Layer,
        LayerPair, Position, SpriteState, Velocity, World,
    };
}
