//! Uniform spatial hash over bounding circles.
//!
//! The grid is an acceleration index, not an authoritative store: it is
//! rebuilt from current positions every frame and safe to discard at any
//! time. Cells are unbounded in extent (hash map keyed by cell coordinate),
//! so the arena needs no fixed world size.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

/// Cell edge length in world units. Tuned for actor radii in the 5-30
/// range: big enough that most entities touch one cell, small enough that a
/// cell rarely holds more than a handful of occupants.
pub const DEFAULT_CELL_SIZE: f32 = 64.0;

/// Discretized cell coordinate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CellCoord {
    pub x: i32,
    pub y: i32,
}

impl CellCoord {
    /// Cell containing a world-space point.
    #[must_use]
    pub fn at(world_x: f32, world_y: f32, cell_size: f32) -> Self {
        Self {
            x: (world_x / cell_size).floor() as i32,
            y: (world_y / cell_size).floor() as i32,
        }
    }
}

/// Inclusive rectangle of cells spanned by a bounding circle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CellRange {
    pub min: CellCoord,
    pub max: CellCoord,
}

impl CellRange {
    /// Cells touched by the axis-aligned bounding box of a circle.
    #[must_use]
    pub fn of_circle(x: f32, y: f32, radius: f32, cell_size: f32) -> Self {
        Self {
            min: CellCoord::at(x - radius, y - radius, cell_size),
            max: CellCoord::at(x + radius, y + radius, cell_size),
        }
    }

    /// The lexicographically smallest cell shared by two overlapping
    /// ranges: the component-wise max of the minima.
    ///
    /// When two entities appear together in any cell, their ranges overlap
    /// on both axes, so this cell is occupied by both. Pair tests run only
    /// in this anchor cell, which is what guarantees each unordered pair is
    /// evaluated at most once per frame.
    #[must_use]
    pub fn anchor_with(&self, other: &Self) -> CellCoord {
        CellCoord {
            x: self.min.x.max(other.min.x),
            y: self.min.y.max(other.min.y),
        }
    }

    /// Iterate every cell in the range, row-major.
    pub fn iter(&self) -> impl Iterator<Item = CellCoord> + use<> {
        let (min, max) = (self.min, self.max);
        (min.y..=max.y).flat_map(move |y| (min.x..=max.x).map(move |x| CellCoord { x, y }))
    }
}

/// Cell coordinate to occupant list. Occupants are indices into the
/// caller's per-frame entry buffer, not entity handles, so pair loops stay
/// plain array lookups.
pub struct SpatialGrid {
    cell_size: f32,
    cells: FxHashMap<CellCoord, SmallVec<[u32; 8]>>,
}

impl SpatialGrid {
    #[must_use]
    pub fn new(cell_size: f32) -> Self {
        Self {
            cell_size,
            cells: FxHashMap::default(),
        }
    }

    #[must_use]
    pub const fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Drop all occupants, keeping allocated capacity for the next frame.
    pub fn clear(&mut self) {
        self.cells.clear();
    }

    /// Insert an entry index into every cell its range touches.
    pub fn insert(&mut self, index: u32, range: CellRange) {
        for coord in range.iter() {
            self.cells.entry(coord).or_default().push(index);
        }
    }

    /// Iterate occupied cells and their occupant lists.
    pub fn iter(&self) -> impl Iterator<Item = (CellCoord, &[u32])> {
        self.cells.iter().map(|(coord, list)| (*coord, list.as_slice()))
    }

    /// Number of occupied cells.
    #[must_use]
    pub fn occupied_cells(&self) -> usize {
        self.cells.len()
    }
}

impl core::fmt::Debug for SpatialGrid {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SpatialGrid")
            .field("cell_size", &self.cell_size)
            .field("occupied_cells", &self.cells.len())
            .finish()
    }
}
