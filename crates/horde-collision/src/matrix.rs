//! Layer compatibility.
//!
//! The matrix decides which layer pairs are even eligible for a distance
//! test. It is symmetric by construction: `allow`/`forbid` always set both
//! directions.

use bitflags::bitflags;
use horde_ecs::Layer;

bitflags! {
    /// Bit set of collision layers.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct LayerMask: u8 {
        const ACTOR = 1 << 0;
        const HAZARD = 1 << 1;
        const PROJECTILE = 1 << 2;
        const PICKUP = 1 << 3;
        const TERRAIN = 1 << 4;
    }
}

impl From<Layer> for LayerMask {
    fn from(layer: Layer) -> Self {
        match layer {
            Layer::Actor => Self::ACTOR,
            Layer::Hazard => Self::HAZARD,
            Layer::Projectile => Self::PROJECTILE,
            Layer::Pickup => Self::PICKUP,
            Layer::Terrain => Self::TERRAIN,
        }
    }
}

/// Symmetric layer-vs-layer eligibility table.
///
/// External tooling extends this surface when new entity categories are
/// added; the default table covers the arena survival set.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CollisionMatrix {
    /// For each layer (indexed by discriminant), the set it may touch.
    masks: [LayerMask; Layer::ALL.len()],
}

impl Default for CollisionMatrix {
    /// The standard table:
    ///
    /// - actors collide with everything, themselves included
    /// - projectiles hit actors, hazards, and terrain
    /// - hazards never interact with each other, pickups, or terrain
    /// - pickups are only ever touched by actors
    /// - terrain blocks movers, never itself
    fn default() -> Self {
        let mut matrix = Self::empty();
        matrix.allow(Layer::Actor, Layer::Actor);
        matrix.allow(Layer::Actor, Layer::Hazard);
        matrix.allow(Layer::Actor, Layer::Projectile);
        matrix.allow(Layer::Actor, Layer::Pickup);
        matrix.allow(Layer::Actor, Layer::Terrain);
        matrix.allow(Layer::Projectile, Layer::Hazard);
        matrix.allow(Layer::Projectile, Layer::Terrain);
        matrix
    }
}

impl CollisionMatrix {
    /// A table where nothing collides.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            masks: [LayerMask::empty(); Layer::ALL.len()],
        }
    }

    /// Enable testing between two layers (both directions).
    pub fn allow(&mut self, a: Layer, b: Layer) {
        self.masks[a as usize] |= LayerMask::from(b);
        self.masks[b as usize] |= LayerMask::from(a);
    }

    /// Disable testing between two layers (both directions).
    pub fn forbid(&mut self, a: Layer, b: Layer) {
        self.masks[a as usize] &= !LayerMask::from(b);
        self.masks[b as usize] &= !LayerMask::from(a);
    }

    /// Whether a pair of layers is eligible for a distance test at all.
    #[must_use]
    pub fn allows(&self, a: Layer, b: Layer) -> bool {
        self.masks[a as usize].contains(LayerMask::from(b))
    }
}
