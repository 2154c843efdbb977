//! Collision layers.
//!
//! Every collidable entity carries exactly one [`Layer`] on its collider.
//! Which layer pairs are actually tested for overlap is decided by the
//! compatibility matrix in the collision crate; the layer set itself lives
//! here because it is a component field.

use std::fmt;
use std::str::FromStr;

use crate::ParseKindError;

/// Category label for a collidable entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Layer {
    Actor = 0,
    Hazard = 1,
    Projectile = 2,
    Pickup = 3,
    Terrain = 4,
}

impl Layer {
    pub const ALL: [Layer; 5] = [
        Layer::Actor,
        Layer::Hazard,
        Layer::Projectile,
        Layer::Pickup,
        Layer::Terrain,
    ];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Actor => "actor",
            Self::Hazard => "hazard",
            Self::Projectile => "projectile",
            Self::Pickup => "pickup",
            Self::Terrain => "terrain",
        }
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Layer {
    type Err = ParseKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "actor" => Ok(Self::Actor),
            "hazard" => Ok(Self::Hazard),
            "projectile" => Ok(Self::Projectile),
            "pickup" => Ok(Self::Pickup),
            "terrain" => Ok(Self::Terrain),
            _ => Err(ParseKindError::UnknownLayer(s.to_owned())),
        }
    }
}

/// An unordered pair of layers, stored in canonical (sorted) order.
///
/// Used to label collision events: `(hazard, actor)` and `(actor, hazard)`
/// are the same pair and compare equal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LayerPair {
    lo: Layer,
    hi: Layer,
}

impl LayerPair {
    #[must_use]
    pub fn new(a: Layer, b: Layer) -> Self {
        if a <= b {
            Self { lo: a, hi: b }
        } else {
            Self { lo: b, hi: a }
        }
    }

    #[must_use]
    pub const fn lo(self) -> Layer {
        self.lo
    }

    #[must_use]
    pub const fn hi(self) -> Layer {
        self.hi
    }
}

impl fmt::Display for LayerPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}+{}", self.lo, self.hi)
    }
}

impl FromStr for LayerPair {
    type Err = ParseKindError;

    /// Parse `"actor+hazard"` style labels; order does not matter.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (a, b) = s
            .split_once('+')
            .ok_or_else(|| ParseKindError::UnknownLayer(s.to_owned()))?;
        Ok(Self::new(a.parse()?, b.parse()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pair_is_order_insensitive() {
        let ab = LayerPair::new(Layer::Actor, Layer::Hazard);
        let ba = LayerPair::new(Layer::Hazard, Layer::Actor);
        assert_eq!(ab, ba);
        assert_eq!(ab.lo(), Layer::Actor);
        assert_eq!(ab.hi(), Layer::Hazard);
    }

    #[test]
    fn test_pair_display_and_parse() {
        let pair = LayerPair::new(Layer::Projectile, Layer::Hazard);
        assert_eq!(pair.to_string(), "hazard+projectile");
        assert_eq!("projectile+hazard".parse::<LayerPair>().unwrap(), pair);
        assert!("projectile".parse::<LayerPair>().is_err());
        assert!("projectile+lava".parse::<LayerPair>().is_err());
    }

    #[test]
    fn test_layer_roundtrip() {
        for layer in Layer::ALL {
            assert_eq!(layer.name().parse::<Layer>().unwrap(), layer);
        }
    }
}
