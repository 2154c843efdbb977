//! The per-frame collision pass.
//!
//! Each frame: rebuild the spatial grid from current positions, enumerate
//! candidate pairs cell by cell (each unordered pair exactly once, via the
//! anchor-cell rule), run the circle-vs-circle narrow test on eligible
//! pairs, push overlapping entities apart symmetrically, and publish one
//! categorized event per overlapping pair.

use horde_ecs::{Collider, Entity, Layer, Position, Vec2, World};
use horde_event::{CollisionContact, EventBus, EventData};
use horde_tick::{System, SystemContext, phase};

use crate::grid::{CellRange, DEFAULT_CELL_SIZE, SpatialGrid};
use crate::matrix::CollisionMatrix;

/// Broad-phase tuning surface.
#[derive(Clone, Debug)]
pub struct BroadPhaseConfig {
    /// Grid cell edge length in world units.
    pub cell_size: f32,
    /// Layer eligibility table.
    pub matrix: CollisionMatrix,
}

impl Default for BroadPhaseConfig {
    fn default() -> Self {
        Self {
            cell_size: DEFAULT_CELL_SIZE,
            matrix: CollisionMatrix::default(),
        }
    }
}

/// Snapshot of one collidable entity, taken at the start of the pass.
#[derive(Clone, Copy, Debug)]
struct Entry {
    entity: Entity,
    x: f32,
    y: f32,
    radius: f32,
    layer: Layer,
    range: CellRange,
}

/// The collision behavior unit.
///
/// Runs in the PHYSICS phase; scratch buffers (entry list, grid, contact
/// list) are reused across frames, so a steady-state pass allocates
/// nothing.
pub struct BroadPhase {
    config: BroadPhaseConfig,
    entries: Vec<Entry>,
    grid: SpatialGrid,
    contacts: Vec<CollisionContact>,
    pairs_tested: usize,
}

impl Default for BroadPhase {
    fn default() -> Self {
        Self::new(BroadPhaseConfig::default())
    }
}

impl BroadPhase {
    #[must_use]
    pub fn new(config: BroadPhaseConfig) -> Self {
        let grid = SpatialGrid::new(config.cell_size);
        Self {
            config,
            entries: Vec::new(),
            grid,
            contacts: Vec::new(),
            pairs_tested: 0,
        }
    }

    /// Rebuild the grid and compute this frame's overlapping pairs.
    ///
    /// Entities missing either Position or Collider are silently excluded;
    /// a frame with no collidable entities degenerates to a no-op.
    pub fn detect(&mut self, world: &World) -> &[CollisionContact] {
        self.entries.clear();
        self.grid.clear();
        self.contacts.clear();
        self.pairs_tested = 0;

        for entity in world
            .query()
            .with_value::<Position>()
            .with_value::<Collider>()
            .run()
        {
            let (Some(position), Some(collider)) = (
                world.get_as::<Position>(entity),
                world.get_as::<Collider>(entity),
            ) else {
                continue;
            };
            let range = CellRange::of_circle(
                position.x,
                position.y,
                collider.radius,
                self.config.cell_size,
            );
            let index = self.entries.len() as u32;
            self.entries.push(Entry {
                entity,
                x: position.x,
                y: position.y,
                radius: collider.radius,
                layer: collider.layer,
                range,
            });
            self.grid.insert(index, range);
        }

        let mut tested = 0usize;
        for (coord, occupants) in self.grid.iter() {
            if occupants.len() < 2 {
                continue;
            }
            for i in 0..occupants.len() {
                for j in (i + 1)..occupants.len() {
                    let a = self.entries[occupants[i] as usize];
                    let b = self.entries[occupants[j] as usize];

                    if !self.config.matrix.allows(a.layer, b.layer) {
                        continue;
                    }
                    // A pair sharing several cells is tested only where the
                    // current cell is the pair's anchor.
                    if coord != a.range.anchor_with(&b.range) {
                        continue;
                    }

                    tested += 1;
                    let delta = Vec2::new(b.x - a.x, b.y - a.y);
                    let distance = delta.length();
                    let radius_sum = a.radius + b.radius;
                    if distance >= radius_sum {
                        continue;
                    }

                    let normal = if distance > 0.0 {
                        delta.scaled(1.0 / distance)
                    } else {
                        Vec2::UNIT_X
                    };
                    self.contacts.push(CollisionContact {
                        a: a.entity,
                        b: b.entity,
                        layer_a: a.layer,
                        layer_b: b.layer,
                        distance,
                        overlap: radius_sum - distance,
                        normal,
                    });
                }
            }
        }
        self.pairs_tested = tested;

        tracing::trace!(
            entities = self.entries.len(),
            cells = self.grid.occupied_cells(),
            tested,
            overlapping = self.contacts.len(),
            "collision pass"
        );
        &self.contacts
    }

    /// Push each overlapping pair apart: half the overlap depth per entity,
    /// along the contact normal. Symmetric and mass-agnostic.
    pub fn resolve(&self, world: &mut World) {
        for contact in &self.contacts {
            let half = contact.overlap * 0.5;
            if let Some(position) = world.get_as_mut::<Position>(contact.a) {
                position.x -= contact.normal.x * half;
                position.y -= contact.normal.y * half;
            }
            if let Some(position) = world.get_as_mut::<Position>(contact.b) {
                position.x += contact.normal.x * half;
                position.y += contact.normal.y * half;
            }
        }
    }

    /// Publish one collision event per overlapping pair, labeled by the
    /// normalized layer pair.
    pub fn emit(&self, world: &mut World, events: &EventBus) {
        for contact in &self.contacts {
            events.publish_with(world, EventData::Collision(*contact), None);
        }
    }

    /// Contacts from the most recent [`detect`](Self::detect) pass.
    #[must_use]
    pub fn contacts(&self) -> &[CollisionContact] {
        &self.contacts
    }

    /// Candidate pairs that reached the distance test last pass.
    #[must_use]
    pub const fn pairs_tested(&self) -> usize {
        self.pairs_tested
    }
}

impl System for BroadPhase {
    fn name(&self) -> &'static str {
        "collision-broadphase"
    }

    fn priority(&self) -> i32 {
        phase::PHYSICS
    }

    fn update(&mut self, ctx: &mut SystemContext<'_>, _dt_ms: f32) -> eyre::Result<()> {
        self.detect(ctx.world);
        self.resolve(ctx.world);
        ctx.metrics.pairs_tested += self.pairs_tested as u64;
        ctx.metrics.pairs_overlapping += self.contacts.len() as u64;
        self.emit(ctx.world, ctx.events);
        Ok(())
    }
}
