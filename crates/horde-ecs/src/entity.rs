//! Entity identifiers with generational indices.
//!
//! Slots are recycled through a free list; the generation counter is bumped
//! on every recycle so a stale handle to a destroyed entity can never alias
//! the entity that later reuses its slot.

use std::fmt;

/// Generation counter for one entity slot.
///
/// Incremented each time the slot is recycled, invalidating any `Entity`
/// handle that still carries the old generation.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Generation(u32);

impl Generation {
    #[must_use]
    pub const fn new() -> Self {
        Self(0)
    }

    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }

    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "gen{}", self.0)
    }
}

/// Raw slot index into the entity table.
pub type EntityIndex = u32;

/// An opaque handle to one in-game object.
///
/// Carries no data of its own; components attached to it live in the
/// [`World`](crate::World). A handle whose slot has been recycled is simply
/// "not found" everywhere, never stale data.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Entity {
    index: EntityIndex,
    generation: Generation,
}

impl Entity {
    #[must_use]
    pub const fn new(index: EntityIndex, generation: Generation) -> Self {
        Self { index, generation }
    }

    #[must_use]
    pub const fn index(self) -> EntityIndex {
        self.index
    }

    #[must_use]
    pub const fn generation(self) -> Generation {
        self.generation
    }

    /// Pack the handle into a single `u64`, e.g. for atomics in tests.
    #[must_use]
    pub const fn to_bits(self) -> u64 {
        ((self.generation.0 as u64) << 32) | (self.index as u64)
    }

    #[must_use]
    pub const fn from_bits(bits: u64) -> Self {
        Self {
            index: bits as u32,
            generation: Generation((bits >> 32) as u32),
        }
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Entity({}v{})", self.index, self.generation.0)
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.index, self.generation.0)
    }
}

/// Slot allocator with generation tracking and a free list.
pub struct EntityAllocator {
    /// Current generation of every slot ever allocated.
    generations: Vec<Generation>,
    /// Whether the slot currently holds a live entity.
    live: Vec<bool>,
    /// Recycled slot indices available for reuse.
    free_list: Vec<EntityIndex>,
    alive_count: u32,
}

impl Default for EntityAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityAllocator {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            generations: Vec::new(),
            live: Vec::new(),
            free_list: Vec::new(),
            alive_count: 0,
        }
    }

    /// Allocate a fresh entity, reusing a recycled slot when one is free.
    pub fn allocate(&mut self) -> Entity {
        self.alive_count += 1;

        if let Some(index) = self.free_list.pop() {
            self.live[index as usize] = true;
            Entity::new(index, self.generations[index as usize])
        } else {
            let index = self.generations.len() as EntityIndex;
            self.generations.push(Generation::new());
            self.live.push(true);
            Entity::new(index, Generation::new())
        }
    }

    /// Release an entity's slot for reuse.
    ///
    /// Returns `false` (and does nothing) if the handle is already dead.
    pub fn deallocate(&mut self, entity: Entity) -> bool {
        if !self.is_alive(entity) {
            return false;
        }

        let index = entity.index() as usize;
        self.generations[index] = self.generations[index].next();
        self.live[index] = false;
        self.free_list.push(entity.index());
        self.alive_count -= 1;
        true
    }

    #[must_use]
    pub fn is_alive(&self, entity: Entity) -> bool {
        let index = entity.index() as usize;
        index < self.generations.len()
            && self.live[index]
            && self.generations[index] == entity.generation()
    }

    #[must_use]
    pub const fn alive_count(&self) -> u32 {
        self.alive_count
    }

    /// Total number of slots ever allocated, live or not.
    #[must_use]
    pub fn slot_count(&self) -> usize {
        self.generations.len()
    }

    /// Iterate all live entities in slot order.
    pub fn iter_live(&self) -> impl Iterator<Item = Entity> + '_ {
        self.generations
            .iter()
            .zip(self.live.iter())
            .enumerate()
            .filter_map(|(index, (generation, live))| {
                live.then(|| Entity::new(index as EntityIndex, *generation))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocate_sequential_indices() {
        let mut allocator = EntityAllocator::new();

        let a = allocator.allocate();
        let b = allocator.allocate();

        assert_eq!(a.index(), 0);
        assert_eq!(b.index(), 1);
        assert!(allocator.is_alive(a));
        assert!(allocator.is_alive(b));
        assert_eq!(allocator.alive_count(), 2);
    }

    #[test]
    fn test_recycled_slot_gets_new_generation() {
        let mut allocator = EntityAllocator::new();

        let a = allocator.allocate();
        assert!(allocator.deallocate(a));
        assert!(!allocator.is_alive(a));

        let b = allocator.allocate();
        assert_eq!(b.index(), a.index());
        assert_ne!(b.generation(), a.generation());
        assert!(allocator.is_alive(b));
        // The old handle stays dead even though the slot is live again.
        assert!(!allocator.is_alive(a));
    }

    #[test]
    fn test_double_deallocate_is_noop() {
        let mut allocator = EntityAllocator::new();

        let a = allocator.allocate();
        assert!(allocator.deallocate(a));
        assert!(!allocator.deallocate(a));
        assert_eq!(allocator.alive_count(), 0);
    }

    #[test]
    fn test_iter_live_skips_dead_slots() {
        let mut allocator = EntityAllocator::new();

        let a = allocator.allocate();
        let b = allocator.allocate();
        let c = allocator.allocate();
        allocator.deallocate(b);

        let live: Vec<_> = allocator.iter_live().collect();
        assert_eq!(live, vec![a, c]);
    }

    #[test]
    fn test_bits_roundtrip() {
        let entity = Entity::new(12345, Generation(678));
        assert_eq!(Entity::from_bits(entity.to_bits()), entity);
    }
}
