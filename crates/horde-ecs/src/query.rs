//! Runtime query builder over the component store.
//!
//! Queries are a declarative filter ("has all of A, none of B") built by
//! method chaining, in the style of a runtime query DSL rather than
//! type-level generics. Results are a plain `Vec<Entity>` snapshot evaluated
//! fresh on every `run()` - deliberately uncached, so destruction elsewhere
//! in the frame can never invalidate a stored result. The scalability
//! tradeoff (every query walks the live set) is accepted for a population of
//! hundreds.

use smallvec::SmallVec;

use crate::component::{ComponentKind, ComponentValue};
use crate::entity::Entity;
use crate::world::World;

/// Builder for a "with all of / without any of" entity filter.
pub struct QueryBuilder<'w> {
    world: &'w World,
    with: SmallVec<[ComponentKind; 4]>,
    without: SmallVec<[ComponentKind; 4]>,
}

impl<'w> QueryBuilder<'w> {
    #[must_use]
    pub fn new(world: &'w World) -> Self {
        Self {
            world,
            with: SmallVec::new(),
            without: SmallVec::new(),
        }
    }

    /// Require the entity to have a component of this kind.
    #[must_use]
    pub fn with(mut self, kind: ComponentKind) -> Self {
        self.with.push(kind);
        self
    }

    /// Typed variant of [`with`](Self::with).
    #[must_use]
    pub fn with_value<T: ComponentValue>(self) -> Self {
        self.with(T::KIND)
    }

    /// Exclude entities that have a component of this kind.
    #[must_use]
    pub fn without(mut self, kind: ComponentKind) -> Self {
        self.without.push(kind);
        self
    }

    /// Typed variant of [`without`](Self::without).
    #[must_use]
    pub fn without_value<T: ComponentValue>(self) -> Self {
        self.without(T::KIND)
    }

    fn matches(&self, entity: Entity) -> bool {
        self.with.iter().all(|&kind| self.world.has(entity, kind))
            && !self.without.iter().any(|&kind| self.world.has(entity, kind))
    }

    /// Evaluate the filter against the current store contents.
    ///
    /// Entities come back in slot order, which is not guaranteed stable
    /// across mutations within the same frame.
    #[must_use]
    pub fn run(&self) -> Vec<Entity> {
        self.world
            .iter_entities()
            .filter(|&entity| self.matches(entity))
            .collect()
    }

    /// Number of matching entities without materializing the result.
    #[must_use]
    pub fn count(&self) -> usize {
        self.world
            .iter_entities()
            .filter(|&entity| self.matches(entity))
            .count()
    }
}
