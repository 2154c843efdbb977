//! The closed set of component kinds and their payloads.
//!
//! Component kinds are a fixed enum rather than open string tags so that a
//! `match` over them is exhaustiveness-checked; the string names only appear
//! at the wiring boundary via [`FromStr`].

use std::str::FromStr;

use crate::{Entity, Layer, ParseKindError};

/// Discriminant for the closed component set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ComponentKind {
    Position = 0,
    Velocity = 1,
    Health = 2,
    Collider = 3,
    AiState = 4,
    SpriteState = 5,
}

impl ComponentKind {
    pub const ALL: [ComponentKind; 6] = [
        ComponentKind::Position,
        ComponentKind::Velocity,
        ComponentKind::Health,
        ComponentKind::Collider,
        ComponentKind::AiState,
        ComponentKind::SpriteState,
    ];

    /// Number of kinds; sizes the per-kind table array in the store.
    pub const COUNT: usize = Self::ALL.len();

    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Position => "position",
            Self::Velocity => "velocity",
            Self::Health => "health",
            Self::Collider => "collider",
            Self::AiState => "ai_state",
            Self::SpriteState => "sprite_state",
        }
    }
}

impl FromStr for ComponentKind {
    type Err = ParseKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "position" => Ok(Self::Position),
            "velocity" => Ok(Self::Velocity),
            "health" => Ok(Self::Health),
            "collider" => Ok(Self::Collider),
            "ai_state" => Ok(Self::AiState),
            "sprite_state" => Ok(Self::SpriteState),
            _ => Err(ParseKindError::UnknownComponent(s.to_owned())),
        }
    }
}

/// World-space position in pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Velocity in pixels per second.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Velocity {
    pub dx: f32,
    pub dy: f32,
}

impl Velocity {
    #[must_use]
    pub const fn new(dx: f32, dy: f32) -> Self {
        Self { dx, dy }
    }
}

/// Hit points.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Health {
    pub current: f32,
    pub max: f32,
}

impl Health {
    #[must_use]
    pub const fn full(max: f32) -> Self {
        Self { current: max, max }
    }

    #[must_use]
    pub fn is_depleted(&self) -> bool {
        self.current <= 0.0
    }
}

/// Bounding circle plus collision layer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Collider {
    pub radius: f32,
    pub layer: Layer,
}

impl Collider {
    #[must_use]
    pub const fn new(radius: f32, layer: Layer) -> Self {
        Self { radius, layer }
    }
}

/// Coarse behavior mode for AI-driven actors.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AiMode {
    #[default]
    Idle,
    Wander,
    Seek,
    Flee,
}

/// AI bookkeeping: current mode, chase target, decision cooldown.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct AiState {
    pub mode: AiMode,
    pub target: Option<Entity>,
    pub cooldown_ms: f32,
}

/// Animation bookkeeping consumed by the external render collaborator.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SpriteState {
    pub frame: u32,
    pub elapsed_ms: f32,
    pub flip_x: bool,
}

/// One component instance: a kind-tagged payload.
///
/// At most one instance per kind may be attached to an entity; inserting a
/// second replaces the first (last-write-wins).
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Component {
    Position(Position),
    Velocity(Velocity),
    Health(Health),
    Collider(Collider),
    AiState(AiState),
    SpriteState(SpriteState),
}

impl Component {
    #[must_use]
    pub const fn kind(&self) -> ComponentKind {
        match self {
            Self::Position(_) => ComponentKind::Position,
            Self::Velocity(_) => ComponentKind::Velocity,
            Self::Health(_) => ComponentKind::Health,
            Self::Collider(_) => ComponentKind::Collider,
            Self::AiState(_) => ComponentKind::AiState,
            Self::SpriteState(_) => ComponentKind::SpriteState,
        }
    }
}

/// Typed view into the [`Component`] sum type.
///
/// Lets the store offer `get_as::<Position>()` style accessors without
/// callers matching on the enum themselves.
pub trait ComponentValue: Sized {
    const KIND: ComponentKind;

    fn from_ref(component: &Component) -> Option<&Self>;
    fn from_mut(component: &mut Component) -> Option<&mut Self>;
    fn into_component(self) -> Component;
}

macro_rules! impl_component_value {
    ($($payload:ident => $kind:ident),+ $(,)?) => {
        $(
            impl ComponentValue for $payload {
                const KIND: ComponentKind = ComponentKind::$kind;

                fn from_ref(component: &Component) -> Option<&Self> {
                    match component {
                        Component::$kind(value) => Some(value),
                        _ => None,
                    }
                }

                fn from_mut(component: &mut Component) -> Option<&mut Self> {
                    match component {
                        Component::$kind(value) => Some(value),
                        _ => None,
                    }
                }

                fn into_component(self) -> Component {
                    Component::$kind(self)
                }
            }

            impl From<$payload> for Component {
                fn from(value: $payload) -> Self {
                    Component::$kind(value)
                }
            }
        )+
    };
}

impl_component_value! {
    Position => Position,
    Velocity => Velocity,
    Health => Health,
    Collider => Collider,
    AiState => AiState,
    SpriteState => SpriteState,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_is_total() {
        for kind in ComponentKind::ALL {
            assert_eq!(kind.name().parse::<ComponentKind>().unwrap(), kind);
        }
        assert!("mana".parse::<ComponentKind>().is_err());
    }

    #[test]
    fn test_component_reports_its_kind() {
        let component: Component = Position::new(1.0, 2.0).into();
        assert_eq!(component.kind(), ComponentKind::Position);
    }

    #[test]
    fn test_typed_view_rejects_wrong_kind() {
        let component: Component = Velocity::new(1.0, 0.0).into();
        assert!(Position::from_ref(&component).is_none());
        assert_eq!(
            Velocity::from_ref(&component),
            Some(&Velocity::new(1.0, 0.0))
        );
    }
}
