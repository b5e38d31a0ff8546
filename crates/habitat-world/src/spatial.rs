//! Spatial hash grid shared by the obstacle and signal registries.
//!
//! The plane is bucketed into square cells of `cell_size` world units,
//! keyed by `(floor(x / cell_size), floor(y / cell_size))`. Each entity is
//! filed under every cell its footprint overlaps: one cell for a point,
//! a block of cells for a rectangle. A reverse index remembers which cells
//! each id occupies so removal never scans the whole grid.
//!
//! A footprint spanning more than [`MAX_FOOTPRINT_CELLS`] cells is not
//! filed cell by cell. It goes on an overflow list that every query
//! treats as a candidate, so one huge obstacle cannot exhaust memory.
//!
//! Cells are a broad-phase filter only. Every query finishes with an exact
//! geometric test against the stored footprint.
//!
//! Each cell carries a summary value `A` owned by the caller. The grid
//! never computes it; callers refresh it for the cells returned by
//! [`SpatialHashGrid::insert`] and [`SpatialHashGrid::remove`] before doing
//! anything else.

use std::collections::{BTreeMap, BTreeSet};

use habitat_types::{Rect, Vec2};

use crate::error::WorldError;
use crate::geometry::{self, GEOMETRY_EPSILON};

/// Largest number of cells a single footprint is filed under.
pub const MAX_FOOTPRINT_CELLS: i64 = 4096;

/// Integer cell coordinates.
pub type CellKey = (i32, i32);

/// The shape an entity occupies in the grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Footprint {
    /// A single point (signals, creatures).
    Point(Vec2),
    /// An axis-aligned rectangle (obstacles).
    Rect(Rect),
}

impl Footprint {
    /// Minimum and maximum corners of the bounding box.
    fn bounds(&self) -> (Vec2, Vec2) {
        match self {
            Self::Point(p) => (*p, *p),
            Self::Rect(r) => (r.min(), r.max()),
        }
    }

    /// Distance from `point` to the footprint (zero when inside).
    pub fn distance_to(&self, point: Vec2) -> f64 {
        match self {
            Self::Point(p) => p.distance(point),
            Self::Rect(r) => r.distance_to(point),
        }
    }

    /// Whether `point` lies on the footprint.
    pub fn contains(&self, point: Vec2) -> bool {
        match self {
            Self::Point(p) => p.distance_squared(point) <= GEOMETRY_EPSILON * GEOMETRY_EPSILON,
            Self::Rect(r) => r.contains(point),
        }
    }

    /// Whether the segment `start..end` touches the footprint.
    pub fn intersects_segment(&self, start: Vec2, end: Vec2) -> bool {
        match self {
            Self::Point(p) => geometry::point_segment_distance(*p, start, end) <= GEOMETRY_EPSILON,
            Self::Rect(r) => geometry::segment_intersects_rect(start, end, r),
        }
    }
}

/// One bucket of the grid.
#[derive(Debug, Clone)]
pub struct GridCell<K, A> {
    members: BTreeSet<K>,
    summary: A,
}

impl<K, A: Default> Default for GridCell<K, A> {
    fn default() -> Self {
        Self {
            members: BTreeSet::new(),
            summary: A::default(),
        }
    }
}

impl<K, A> GridCell<K, A> {
    /// Ids filed under this cell.
    pub const fn members(&self) -> &BTreeSet<K> {
        &self.members
    }

    /// Caller-maintained aggregate for this cell.
    pub const fn summary(&self) -> &A {
        &self.summary
    }
}

#[derive(Debug, Clone)]
struct Entry {
    footprint: Footprint,
    cells: Vec<CellKey>,
}

/// Bucketing index from world cells to the ids overlapping them.
#[derive(Debug, Clone)]
pub struct SpatialHashGrid<K, A = ()> {
    cell_size: f64,
    cells: BTreeMap<CellKey, GridCell<K, A>>,
    entries: BTreeMap<K, Entry>,
    overflow: BTreeSet<K>,
}

impl<K, A> SpatialHashGrid<K, A>
where
    K: Copy + Ord,
    A: Default,
{
    /// Create an empty grid.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::InvalidConfig`] unless `cell_size` is finite
    /// and positive.
    pub fn new(cell_size: f64) -> Result<Self, WorldError> {
        if !(cell_size.is_finite() && cell_size > 0.0) {
            return Err(WorldError::InvalidConfig {
                reason: format!("cell_size must be finite and positive, got {cell_size}"),
            });
        }
        Ok(Self {
            cell_size,
            cells: BTreeMap::new(),
            entries: BTreeMap::new(),
            overflow: BTreeSet::new(),
        })
    }

    /// Edge length of a cell in world units.
    pub const fn cell_size(&self) -> f64 {
        self.cell_size
    }

    /// Cell containing `position`.
    ///
    /// Coordinates beyond the `i32` range saturate; NaN maps to 0.
    #[allow(clippy::cast_possible_truncation)]
    pub fn cell_key(&self, position: Vec2) -> CellKey {
        (
            (position.x / self.cell_size).floor() as i32,
            (position.y / self.cell_size).floor() as i32,
        )
    }

    /// Number of indexed ids.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no ids are indexed.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of allocated cells, including empty ones awaiting
    /// [`maintain`](Self::maintain).
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Whether `id` is indexed.
    pub fn contains(&self, id: K) -> bool {
        self.entries.contains_key(&id)
    }

    /// The cell at `key`, if allocated.
    pub fn cell(&self, key: CellKey) -> Option<&GridCell<K, A>> {
        self.cells.get(&key)
    }

    /// Cells currently occupied by `id`.
    pub fn cells_of(&self, id: K) -> &[CellKey] {
        self.entries.get(&id).map_or(&[], |e| e.cells.as_slice())
    }

    /// Ids whose footprint was too large to file cell by cell.
    pub const fn overflow(&self) -> &BTreeSet<K> {
        &self.overflow
    }

    /// Overflow ids whose footprint's bounding box covers the cell `key`.
    pub fn overflow_covering(&self, key: CellKey) -> Vec<K> {
        self.overflow
            .iter()
            .copied()
            .filter(|id| {
                self.entries.get(id).is_some_and(|e| {
                    let (min, max) = e.footprint.bounds();
                    let (lo, hi) = (self.cell_key(min), self.cell_key(max));
                    (lo.0..=hi.0).contains(&key.0) && (lo.1..=hi.1).contains(&key.1)
                })
            })
            .collect()
    }

    /// Replace the summary of an allocated cell. Unallocated cells are
    /// left alone.
    pub fn set_summary(&mut self, key: CellKey, summary: A) {
        if let Some(cell) = self.cells.get_mut(&key) {
            cell.summary = summary;
        }
    }

    /// File `id` under every cell its footprint overlaps, replacing any
    /// previous footprint. Returns every cell whose membership changed.
    ///
    /// Footprints spanning more than [`MAX_FOOTPRINT_CELLS`] cells go on
    /// the overflow list and occupy no cell.
    pub fn insert(&mut self, id: K, footprint: Footprint) -> Vec<CellKey> {
        let mut touched = self.remove(id);

        let (min, max) = footprint.bounds();
        let (min_cell, max_cell) = (self.cell_key(min), self.cell_key(max));
        if window_size(min_cell, max_cell) > MAX_FOOTPRINT_CELLS {
            self.overflow.insert(id);
            self.entries.insert(
                id,
                Entry {
                    footprint,
                    cells: Vec::new(),
                },
            );
            return touched;
        }

        let mut cells = Vec::new();
        for cx in min_cell.0..=max_cell.0 {
            for cy in min_cell.1..=max_cell.1 {
                let key = (cx, cy);
                self.cells.entry(key).or_default().members.insert(id);
                cells.push(key);
            }
        }

        touched.extend(cells.iter().copied());
        touched.sort_unstable();
        touched.dedup();

        self.entries.insert(id, Entry { footprint, cells });
        touched
    }

    /// Remove `id` from every cell it occupies. Returns the cells whose
    /// membership changed (empty when `id` was not indexed). Emptied cells
    /// stay allocated until [`maintain`](Self::maintain).
    pub fn remove(&mut self, id: K) -> Vec<CellKey> {
        let Some(entry) = self.entries.remove(&id) else {
            return Vec::new();
        };
        self.overflow.remove(&id);
        for key in &entry.cells {
            if let Some(cell) = self.cells.get_mut(key) {
                cell.members.remove(&id);
            }
        }
        entry.cells
    }

    /// Ids whose footprint contains `position`, in ascending order.
    pub fn query_point(&self, position: Vec2) -> Vec<K> {
        let key = self.cell_key(position);
        let mut candidates = self.overflow.clone();
        if let Some(cell) = self.cells.get(&key) {
            candidates.extend(cell.members.iter().copied());
        }
        candidates
            .into_iter()
            .filter(|id| {
                self.entries
                    .get(id)
                    .is_some_and(|e| e.footprint.contains(position))
            })
            .collect()
    }

    /// Ids whose footprint lies within `radius` of `center`, in ascending
    /// order.
    ///
    /// Visits every cell within `ceil(radius / cell_size)` of the centre
    /// cell, then keeps candidates whose exact distance is at most `radius`.
    pub fn query_radius(&self, center: Vec2, radius: f64) -> Vec<K> {
        if radius.is_nan() || radius < 0.0 {
            return Vec::new();
        }
        let reach = Vec2::new(radius, radius);
        let candidates = self.members_in_window(
            self.cell_key(center - reach),
            self.cell_key(center + reach),
        );
        candidates
            .into_iter()
            .filter(|id| {
                self.entries
                    .get(id)
                    .is_some_and(|e| e.footprint.distance_to(center) <= radius)
            })
            .collect()
    }

    /// Ids whose footprint touches the segment `start..end`, in ascending
    /// order.
    pub fn query_segment(&self, start: Vec2, end: Vec2) -> Vec<K> {
        let min = Vec2::new(start.x.min(end.x), start.y.min(end.y));
        let max = Vec2::new(start.x.max(end.x), start.y.max(end.y));
        let candidates = self.members_in_window(self.cell_key(min), self.cell_key(max));
        candidates
            .into_iter()
            .filter(|id| {
                self.entries
                    .get(id)
                    .is_some_and(|e| e.footprint.intersects_segment(start, end))
            })
            .collect()
    }

    /// Drop every cell with no members. Returns how many were dropped.
    pub fn maintain(&mut self) -> usize {
        let before = self.cells.len();
        self.cells.retain(|_, cell| !cell.members.is_empty());
        before.saturating_sub(self.cells.len())
    }

    /// Remove every id and cell.
    pub fn clear(&mut self) {
        self.cells.clear();
        self.entries.clear();
        self.overflow.clear();
    }

    /// Union of the overflow list and the members of every cell in the
    /// inclusive window.
    ///
    /// When the window spans more cells than are allocated, the allocated
    /// cells are scanned instead, so huge radii cost no more than a full
    /// scan.
    fn members_in_window(&self, min: CellKey, max: CellKey) -> BTreeSet<K> {
        let window = window_size(min, max);
        let allocated = i64::try_from(self.cells.len()).unwrap_or(i64::MAX);

        let mut members = self.overflow.clone();
        if window > allocated {
            for (key, cell) in &self.cells {
                if key.0 >= min.0 && key.0 <= max.0 && key.1 >= min.1 && key.1 <= max.1 {
                    members.extend(cell.members.iter().copied());
                }
            }
        } else {
            for cx in min.0..=max.0 {
                for cy in min.1..=max.1 {
                    if let Some(cell) = self.cells.get(&(cx, cy)) {
                        members.extend(cell.members.iter().copied());
                    }
                }
            }
        }
        members
    }
}

/// Number of cells in the inclusive window `min..=max`.
fn window_size(min: CellKey, max: CellKey) -> i64 {
    let width = i64::from(max.0).saturating_sub(i64::from(min.0)).saturating_add(1);
    let height = i64::from(max.1).saturating_sub(i64::from(min.1)).saturating_add(1);
    width.saturating_mul(height)
}
