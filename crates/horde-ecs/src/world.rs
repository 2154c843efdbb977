//! World - the component store and entity registry.
//!
//! Owns all component data exclusively; behavior units borrow references for
//! the duration of one update call. Every operation on a dead or unknown
//! entity degrades gracefully (no-op for mutators, `None`/`false` for
//! readers) because entities routinely die mid-frame.

use hashbrown::HashMap;

use crate::component::{Component, ComponentKind, ComponentValue};
use crate::entity::{Entity, EntityAllocator};
use crate::query::QueryBuilder;

/// Container for all entities and their components.
pub struct World {
    entities: EntityAllocator,
    /// One table per component kind, indexed by `ComponentKind::index()`.
    /// Keyed by full handle (index + generation), so a stale handle from a
    /// recycled slot misses instead of reading the new occupant's data.
    tables: [HashMap<Entity, Component>; ComponentKind::COUNT],
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl World {
    #[must_use]
    pub fn new() -> Self {
        Self {
            entities: EntityAllocator::new(),
            tables: std::array::from_fn(|_| HashMap::new()),
        }
    }

    // ==================== Entity Operations ====================

    /// Create a fresh entity with no components.
    pub fn spawn(&mut self) -> Entity {
        let entity = self.entities.allocate();
        tracing::trace!(%entity, "spawn");
        entity
    }

    /// Destroy an entity and drop all of its components atomically.
    ///
    /// Destroying a dead or unknown entity is a no-op; returns whether the
    /// entity was alive.
    pub fn despawn(&mut self, entity: Entity) -> bool {
        if !self.entities.deallocate(entity) {
            return false;
        }
        for table in &mut self.tables {
            table.remove(&entity);
        }
        tracing::trace!(%entity, "despawn");
        true
    }

    #[must_use]
    pub fn is_alive(&self, entity: Entity) -> bool {
        self.entities.is_alive(entity)
    }

    /// Number of live entities.
    #[must_use]
    pub const fn len(&self) -> u32 {
        self.entities.alive_count()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.entities.alive_count() == 0
    }

    /// Iterate all live entities in slot order.
    pub fn iter_entities(&self) -> impl Iterator<Item = Entity> + '_ {
        self.entities.iter_live()
    }

    // ==================== Component Operations ====================

    /// Attach a component to an entity, replacing any existing component of
    /// the same kind (last-write-wins).
    ///
    /// Returns `false` (and stores nothing) if the entity is not alive.
    pub fn insert(&mut self, entity: Entity, component: impl Into<Component>) -> bool {
        if !self.entities.is_alive(entity) {
            return false;
        }
        let component = component.into();
        self.tables[component.kind().index()].insert(entity, component);
        true
    }

    /// Detach and return a component, if present.
    pub fn remove(&mut self, entity: Entity, kind: ComponentKind) -> Option<Component> {
        self.tables[kind.index()].remove(&entity)
    }

    #[must_use]
    pub fn get(&self, entity: Entity, kind: ComponentKind) -> Option<&Component> {
        self.tables[kind.index()].get(&entity)
    }

    #[must_use]
    pub fn get_mut(&mut self, entity: Entity, kind: ComponentKind) -> Option<&mut Component> {
        self.tables[kind.index()].get_mut(&entity)
    }

    #[must_use]
    pub fn has(&self, entity: Entity, kind: ComponentKind) -> bool {
        self.tables[kind.index()].contains_key(&entity)
    }

    /// Typed read access: `world.get_as::<Position>(entity)`.
    #[must_use]
    pub fn get_as<T: ComponentValue>(&self, entity: Entity) -> Option<&T> {
        self.get(entity, T::KIND).and_then(T::from_ref)
    }

    /// Typed write access.
    #[must_use]
    pub fn get_as_mut<T: ComponentValue>(&mut self, entity: Entity) -> Option<&mut T> {
        self.get_mut(entity, T::KIND).and_then(T::from_mut)
    }

    // ==================== Queries ====================

    /// Start building a "with all of / without any of" query.
    ///
    /// Results are evaluated fresh on `run()`; nothing is cached between
    /// frames.
    #[must_use]
    pub fn query(&self) -> QueryBuilder<'_> {
        QueryBuilder::new(self)
    }
}

impl core::fmt::Debug for World {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("World")
            .field("entities", &self.entities.alive_count())
            .finish_non_exhaustive()
    }
}
