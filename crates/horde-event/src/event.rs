//! Event records.
//!
//! Events are immutable-by-convention facts: a kind, a timestamp, an
//! optional originating entity, and a strongly shaped payload. The payload
//! is a closed sum type - one variant per kind - so consumers never guess
//! at a payload's shape at runtime.

use std::fmt;
use std::str::FromStr;

use horde_ecs::{Entity, Layer, LayerPair, ParseKindError, Vec2};

/// Discriminant identifying a category of published event.
///
/// Collision kinds are parameterized by the (order-normalized) layer pair,
/// so `actor+hazard` and `projectile+hazard` are distinct subscribable
/// categories.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    Collision(LayerPair),
    Damage,
    Death,
    Spawned,
    Despawned,
    Pickup,
    WaveCleared,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Collision(pair) => write!(f, "collision:{pair}"),
            Self::Damage => f.write_str("damage"),
            Self::Death => f.write_str("death"),
            Self::Spawned => f.write_str("spawned"),
            Self::Despawned => f.write_str("despawned"),
            Self::Pickup => f.write_str("pickup"),
            Self::WaveCleared => f.write_str("wave_cleared"),
        }
    }
}

/// Failure to resolve a boundary string to an event kind.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseEventError {
    #[error("unknown event kind `{0}`")]
    Unknown(String),
    #[error(transparent)]
    Layer(#[from] ParseKindError),
}

impl FromStr for EventKind {
    type Err = ParseEventError;

    /// Boundary table for configuration-driven wiring: `"damage"`,
    /// `"collision:actor+hazard"`, ...
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(pair) = s.strip_prefix("collision:") {
            return Ok(Self::Collision(pair.parse()?));
        }
        match s {
            "damage" => Ok(Self::Damage),
            "death" => Ok(Self::Death),
            "spawned" => Ok(Self::Spawned),
            "despawned" => Ok(Self::Despawned),
            "pickup" => Ok(Self::Pickup),
            "wave_cleared" => Ok(Self::WaveCleared),
            _ => Err(ParseEventError::Unknown(s.to_owned())),
        }
    }
}

/// One overlapping pair reported by the broad-phase.
///
/// Transient: produced fresh every frame and discarded after resolution and
/// event emission.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CollisionContact {
    pub a: Entity,
    pub b: Entity,
    pub layer_a: Layer,
    pub layer_b: Layer,
    /// Distance between centers.
    pub distance: f32,
    /// Penetration depth: radius sum minus distance.
    pub overlap: f32,
    /// Unit vector from `a` toward `b`; `(1, 0)` when the centers coincide.
    pub normal: Vec2,
}

impl CollisionContact {
    #[must_use]
    pub fn layers(&self) -> LayerPair {
        LayerPair::new(self.layer_a, self.layer_b)
    }
}

/// Event payloads, one shaped variant per kind.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum EventData {
    Collision(CollisionContact),
    Damage { target: Entity, amount: f32 },
    Death { entity: Entity },
    Spawned { entity: Entity },
    Despawned { entity: Entity },
    Pickup { item: Entity, by: Entity },
    WaveCleared { wave: u32 },
}

impl EventData {
    #[must_use]
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Collision(contact) => EventKind::Collision(contact.layers()),
            Self::Damage { .. } => EventKind::Damage,
            Self::Death { .. } => EventKind::Death,
            Self::Spawned { .. } => EventKind::Spawned,
            Self::Despawned { .. } => EventKind::Despawned,
            Self::Pickup { .. } => EventKind::Pickup,
            Self::WaveCleared { .. } => EventKind::WaveCleared,
        }
    }
}

/// A published event: fire-and-forget, immutable by convention.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GameEvent {
    /// Milliseconds since the bus was created.
    pub timestamp_ms: f64,
    /// Entity the event originated from, when one exists.
    pub source: Option<Entity>,
    pub data: EventData,
}

impl GameEvent {
    #[must_use]
    pub fn kind(&self) -> EventKind {
        self.data.kind()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_strings_roundtrip() {
        let kinds = [
            EventKind::Damage,
            EventKind::Death,
            EventKind::Spawned,
            EventKind::Despawned,
            EventKind::Pickup,
            EventKind::WaveCleared,
            EventKind::Collision(LayerPair::new(Layer::Hazard, Layer::Actor)),
        ];
        for kind in kinds {
            assert_eq!(kind.to_string().parse::<EventKind>().unwrap(), kind);
        }
        assert!("teleport".parse::<EventKind>().is_err());
    }

    #[test]
    fn test_collision_kind_normalizes_layer_order() {
        let contact = CollisionContact {
            a: Entity::from_bits(1),
            b: Entity::from_bits(2),
            layer_a: Layer::Hazard,
            layer_b: Layer::Actor,
            distance: 10.0,
            overlap: 2.0,
            normal: Vec2::UNIT_X,
        };
        assert_eq!(
            EventData::Collision(contact).kind(),
            EventKind::Collision(LayerPair::new(Layer::Actor, Layer::Hazard))
        );
    }
}
