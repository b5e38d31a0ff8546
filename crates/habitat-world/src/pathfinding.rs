//! Bounded A* search over an 8-connected unit lattice.
//!
//! The lattice is anchored at the start position, so every explored node
//! is `start + (dx, dy)` for integer offsets. Terrain is read through a
//! [`PathTerrain`]: lattice cells are sampled for their cost, and every
//! step between two nodes is checked as a segment so walls thinner than
//! the lattice spacing still stop the search. Diagonal steps are also
//! refused when either orthogonal neighbour is impassable.
//!
//! Frontier ordering is total and deterministic: lowest `f`, then lowest
//! `h`, then the lexicographically smallest lattice offset.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use habitat_types::{PathNode, TerrainCost, Vec2};
use ordered_float::OrderedFloat;

/// The search stops once the node it pops is this close to the goal.
pub const GOAL_TOLERANCE: f64 = 1.0;

/// Lattice offset from the start position.
type Offset = (i64, i64);

/// Frontier key: `(f, h, offset)`.
type FrontierKey = (OrderedFloat<f64>, OrderedFloat<f64>, Offset);

const NEIGHBORS: [Offset; 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// Why a search returned no path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchFailure {
    /// The reachable region was fully explored without nearing the goal.
    Exhausted,
    /// The expansion budget ran out first.
    BudgetSpent,
    /// Start or goal was not a finite position.
    InvalidInput,
}

/// Terrain as seen by the search.
pub trait PathTerrain {
    /// Blocked flag and movement cost at `position`.
    fn terrain_at(&mut self, position: Vec2) -> TerrainCost;

    /// Whether walking straight from `from` to `to` passes through
    /// something impassable.
    fn step_blocked(&mut self, from: Vec2, to: Vec2) -> bool;
}

#[derive(Debug, Clone, Copy)]
struct Visit {
    g: f64,
    h: f64,
    movement_cost: f64,
}

#[allow(clippy::cast_precision_loss)]
fn lattice_position(start: Vec2, offset: Offset) -> Vec2 {
    Vec2::new(start.x + offset.0 as f64, start.y + offset.1 as f64)
}

fn impassable(cost: TerrainCost) -> bool {
    cost.blocked || !cost.movement_cost.is_finite()
}

/// Terrain at a lattice offset, sampled at most once per search.
fn sample<T: PathTerrain>(
    cache: &mut BTreeMap<Offset, TerrainCost>,
    terrain: &mut T,
    start: Vec2,
    offset: Offset,
) -> TerrainCost {
    *cache
        .entry(offset)
        .or_insert_with(|| terrain.terrain_at(lattice_position(start, offset)))
}

/// Find a path from `start` to `goal`.
///
/// Each step costs its length times the movement cost of the cell it
/// enters; blocked or infinite-cost cells are never entered, and neither
/// are steps whose segment is blocked or that cut a blocked corner. The start is
/// always entered at cost zero, whatever the terrain there. Terrain at
/// each lattice cell is sampled at most once per search.
///
/// When the search reaches a node within [`GOAL_TOLERANCE`] of the goal,
/// the goal itself is appended as the final step unless it or the last
/// segment is blocked.
///
/// # Errors
///
/// Returns the reason no path was produced; callers surface it as an
/// empty path.
pub fn search<T: PathTerrain>(
    start: Vec2,
    goal: Vec2,
    max_expansions: usize,
    terrain: &mut T,
) -> Result<Vec<PathNode>, SearchFailure> {
    if !start.is_finite() || !goal.is_finite() {
        return Err(SearchFailure::InvalidInput);
    }

    let mut visits: BTreeMap<Offset, Visit> = BTreeMap::new();
    let mut parents: BTreeMap<Offset, Offset> = BTreeMap::new();
    let mut cache: BTreeMap<Offset, TerrainCost> = BTreeMap::new();
    let mut closed: BTreeSet<Offset> = BTreeSet::new();
    let mut frontier: BTreeSet<FrontierKey> = BTreeSet::new();

    let origin: Offset = (0, 0);
    let h0 = start.distance(goal);
    visits.insert(
        origin,
        Visit {
            g: 0.0,
            h: h0,
            movement_cost: 1.0,
        },
    );
    frontier.insert((OrderedFloat(h0), OrderedFloat(h0), origin));

    let mut expansions = 0_usize;
    while let Some((_, _, current)) = frontier.pop_first() {
        if !closed.insert(current) {
            continue;
        }
        expansions = expansions.saturating_add(1);
        if expansions > max_expansions {
            return Err(SearchFailure::BudgetSpent);
        }

        let Some(visit) = visits.get(&current).copied() else {
            continue;
        };
        let position = lattice_position(start, current);
        if visit.h <= GOAL_TOLERANCE {
            let mut path = reconstruct(start, current, &visits, &parents);
            if visit.h > f64::EPSILON {
                let cost = terrain.terrain_at(goal);
                if !impassable(cost) && !terrain.step_blocked(position, goal) {
                    let g = visit.h.mul_add(cost.movement_cost, visit.g);
                    path.push(PathNode {
                        position: goal,
                        g_cost: g,
                        h_cost: 0.0,
                        f_cost: g,
                        movement_cost: cost.movement_cost,
                    });
                }
            }
            return Ok(path);
        }

        for (dx, dy) in NEIGHBORS {
            let (Some(nx), Some(ny)) = (current.0.checked_add(dx), current.1.checked_add(dy))
            else {
                continue;
            };
            let next = (nx, ny);
            if closed.contains(&next) {
                continue;
            }
            let next_position = lattice_position(start, next);
            let cost = sample(&mut cache, terrain, start, next);
            if impassable(cost) {
                continue;
            }
            if dx != 0
                && dy != 0
                && (impassable(sample(&mut cache, terrain, start, (nx, current.1)))
                    || impassable(sample(&mut cache, terrain, start, (current.0, ny))))
            {
                continue;
            }
            if terrain.step_blocked(position, next_position) {
                continue;
            }

            let step = position.distance(next_position);
            let tentative = step.mul_add(cost.movement_cost, visit.g);
            let is_better = visits.get(&next).is_none_or(|v| tentative < v.g);
            if !is_better {
                continue;
            }

            let h = next_position.distance(goal);
            if let Some(old) = visits.get(&next) {
                frontier.remove(&(OrderedFloat(old.g + old.h), OrderedFloat(old.h), next));
            }
            visits.insert(
                next,
                Visit {
                    g: tentative,
                    h,
                    movement_cost: cost.movement_cost,
                },
            );
            parents.insert(next, current);
            frontier.insert((OrderedFloat(tentative + h), OrderedFloat(h), next));
        }
    }

    Err(SearchFailure::Exhausted)
}

fn reconstruct(
    start: Vec2,
    end: Offset,
    visits: &BTreeMap<Offset, Visit>,
    parents: &BTreeMap<Offset, Offset>,
) -> Vec<PathNode> {
    let mut offsets = VecDeque::new();
    let mut current = end;
    offsets.push_front(current);
    while let Some(&parent) = parents.get(&current) {
        offsets.push_front(parent);
        current = parent;
    }

    offsets
        .into_iter()
        .filter_map(|offset| {
            visits.get(&offset).map(|v| PathNode {
                position: lattice_position(start, offset),
                g_cost: v.g,
                h_cost: v.h,
                f_cost: v.g + v.h,
                movement_cost: v.movement_cost,
            })
        })
        .collect()
}

/// Total Euclidean length of a path.
pub fn path_length(path: &[PathNode]) -> f64 {
    path.iter()
        .zip(path.iter().skip(1))
        .map(|(a, b)| a.position.distance(b.position))
        .sum()
}
