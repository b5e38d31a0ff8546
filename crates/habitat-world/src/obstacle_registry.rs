//! Obstacle storage, spatial lookup, and terrain queries.
//!
//! The [`ObstacleRegistry`] is the single owner of every [`Obstacle`] in the
//! world. Obstacles live in a generational arena and are filed in a
//! [`SpatialHashGrid`] under every cell their footprint overlaps. Each grid
//! cell caches a [`CellTerrain`] summary that is recomputed whenever the
//! cell's membership changes.
//!
//! Queries:
//! - [`check_interaction`](ObstacleRegistry::check_interaction): the combined
//!   effect of stepping onto a position. Rolls status effects and harvests
//!   resources, so it takes `&mut self`.
//! - [`movement_cost_at`](ObstacleRegistry::movement_cost_at): the read-only
//!   subset used for cost estimates.
//! - [`calculate_line_of_sight`](ObstacleRegistry::calculate_line_of_sight)
//! - [`find_path`](ObstacleRegistry::find_path)
//! - [`detect_obstacles`](ObstacleRegistry::detect_obstacles)

use habitat_types::{
    InteractionResult, LineOfSight, Obstacle, ObstacleDetection, ObstacleId,
    ObstaclePropertyOverrides, ObstacleType, PathNode, TerrainCost, Vec2,
};
use rand::Rng;
use slotmap::SlotMap;
use tracing::{debug, warn};

use crate::config::ObstacleConfig;
use crate::creature::Creature;
use crate::error::WorldError;
use crate::obstacle;
use crate::pathfinding::{self, PathTerrain, SearchFailure};
use crate::spatial::{CellKey, Footprint, SpatialHashGrid};

/// Line of sight is clear while at least this much light gets through.
pub const VISIBILITY_THRESHOLD: f64 = 0.1;

/// Cached aggregate of the obstacles filed under one grid cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellTerrain {
    /// No occupant of the cell is impassable.
    pub passable: bool,
    /// Mean movement cost of the passable occupants (1 when there are none).
    pub mean_movement_cost: f64,
}

impl Default for CellTerrain {
    fn default() -> Self {
        Self {
            passable: true,
            mean_movement_cost: 1.0,
        }
    }
}

/// Owner of every obstacle in the world.
#[derive(Debug, Clone)]
pub struct ObstacleRegistry {
    config: ObstacleConfig,
    obstacles: SlotMap<ObstacleId, Obstacle>,
    grid: SpatialHashGrid<ObstacleId, CellTerrain>,
}

impl ObstacleRegistry {
    /// Create an empty registry.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::InvalidConfig`] if the configuration fails
    /// [`ObstacleConfig::validate`].
    pub fn new(config: ObstacleConfig) -> Result<Self, WorldError> {
        config.validate()?;
        let grid = SpatialHashGrid::new(config.grid_size)?;
        Ok(Self {
            config,
            obstacles: SlotMap::with_key(),
            grid,
        })
    }

    /// The configuration this registry was built with.
    pub const fn config(&self) -> &ObstacleConfig {
        &self.config
    }

    /// Number of stored obstacles.
    pub fn len(&self) -> usize {
        self.obstacles.len()
    }

    /// Whether the registry holds no obstacles.
    pub fn is_empty(&self) -> bool {
        self.obstacles.is_empty()
    }

    /// Look up an obstacle.
    pub fn get(&self, id: ObstacleId) -> Option<&Obstacle> {
        self.obstacles.get(id)
    }

    // -------------------------------------------------------------------
    // Mutation
    // -------------------------------------------------------------------

    /// Store a fully specified obstacle under a fresh id.
    ///
    /// The record's own `id` is ignored and its properties are normalized.
    pub fn add_obstacle(&mut self, obstacle: Obstacle) -> ObstacleId {
        let id = self.obstacles.insert_with_key(|id| Obstacle {
            id,
            properties: obstacle.properties.normalized(),
            ..obstacle
        });
        if let Some((footprint, obstacle_type)) = self
            .obstacles
            .get(id)
            .map(|o| (o.footprint, o.obstacle_type))
        {
            let touched = self.grid.insert(id, Footprint::Rect(footprint));
            self.refresh_cells(&touched);
            debug!(
                obstacle_id = ?id,
                ?obstacle_type,
                cells = touched.len(),
                "Obstacle added"
            );
        }

        if self.obstacles.len() > self.config.max_obstacles {
            warn!(
                count = self.obstacles.len(),
                max = self.config.max_obstacles,
                "Obstacle count exceeds configured maximum"
            );
        }
        id
    }

    /// Create an obstacle from its type defaults layered with `overrides`,
    /// store it, and return the stored record.
    pub fn create_obstacle(
        &mut self,
        obstacle_type: ObstacleType,
        position: Vec2,
        dimensions: Vec2,
        overrides: &ObstaclePropertyOverrides,
    ) -> Obstacle {
        let mut created = obstacle::build_obstacle(
            ObstacleId::default(),
            obstacle_type,
            position,
            dimensions,
            overrides,
        );
        created.id = self.add_obstacle(created.clone());
        created
    }

    /// Remove an obstacle from storage and from every grid cell it
    /// occupies. Returns `false` if the id is unknown.
    pub fn remove_obstacle(&mut self, id: ObstacleId) -> bool {
        if self.obstacles.remove(id).is_none() {
            return false;
        }
        let touched = self.grid.remove(id);
        self.refresh_cells(&touched);
        debug!(obstacle_id = ?id, "Obstacle removed");
        true
    }

    /// Remove every obstacle.
    pub fn clear_obstacles(&mut self) {
        self.obstacles.clear();
        self.grid.clear();
    }

    /// Advance the registry by `delta_time`.
    ///
    /// Regenerates resource-yielding obstacles (when enabled) and drops
    /// empty grid cells. Returns the total units regenerated.
    pub fn update(&mut self, delta_time: f64) -> f64 {
        let mut regenerated = 0.0;
        if self.config.resource_generation && delta_time > 0.0 {
            for obstacle in self.obstacles.values_mut() {
                let (Some(resources), Some(remaining)) = (
                    obstacle.properties.resources,
                    obstacle.resources_remaining.as_mut(),
                ) else {
                    continue;
                };
                let before = *remaining;
                *remaining = resources
                    .generation_rate
                    .mul_add(delta_time, before)
                    .min(resources.capacity);
                regenerated += (*remaining - before).max(0.0);
            }
        }
        let pruned = self.grid.maintain();
        debug!(regenerated, pruned, "Obstacle registry updated");
        regenerated
    }

    // -------------------------------------------------------------------
    // Lookup
    // -------------------------------------------------------------------

    /// Every stored obstacle, in arena order.
    pub fn all_obstacles(&self) -> impl Iterator<Item = &Obstacle> + '_ {
        self.obstacles.values()
    }

    /// Obstacles whose footprint contains `position`, ordered by id.
    pub fn obstacles_at_position(&self, position: Vec2) -> Vec<&Obstacle> {
        self.ids_at(position)
            .into_iter()
            .filter_map(|id| self.obstacles.get(id))
            .collect()
    }

    /// Obstacles whose footprint lies within `radius` of `center`, ordered
    /// by id.
    pub fn obstacles_in_radius(&self, center: Vec2, radius: f64) -> Vec<&Obstacle> {
        let ids = if self.config.spatial_hashing {
            self.grid.query_radius(center, radius)
        } else {
            self.scan(|o| o.footprint.distance_to(center) <= radius)
        };
        ids.into_iter()
            .filter_map(|id| self.obstacles.get(id))
            .collect()
    }

    /// Terrain summary of the grid cell containing `position`.
    ///
    /// Read from the cell's cache, except when an overflow obstacle covers
    /// the cell; then the summary is recomputed over both.
    pub fn cell_terrain(&self, position: Vec2) -> CellTerrain {
        let key = self.grid.cell_key(position);
        let cell = self.grid.cell(key);
        let oversized = self.grid.overflow_covering(key);
        if oversized.is_empty() {
            return cell.map(|c| *c.summary()).unwrap_or_default();
        }
        let members = cell.into_iter().flat_map(|c| c.members().iter().copied());
        summarize(
            members
                .chain(oversized)
                .filter_map(|id| self.obstacles.get(id)),
        )
    }

    // -------------------------------------------------------------------
    // Interaction
    // -------------------------------------------------------------------

    /// Resolve what happens to `creature` at `target`.
    ///
    /// Folds over every obstacle containing `target`: `blocked` and
    /// `vision_blocked` are ORed, movement cost, signal attenuation and
    /// hiding take the maximum, damage sums. Each status effect is rolled
    /// against its probability. Resource obstacles grant up to their
    /// harvest amount and are depleted by what they grant.
    pub fn check_interaction(
        &mut self,
        creature: &impl Creature,
        target: Vec2,
        rng: &mut impl Rng,
    ) -> InteractionResult {
        let mut result = InteractionResult::default();
        let mut every_blocker_climbable = true;

        for id in self.ids_at(target) {
            let Some(obstacle) = self.obstacles.get_mut(id) else {
                continue;
            };
            let props = &obstacle.properties;

            if props.passable {
                result.movement_cost = result.movement_cost.max(props.movement_cost);
            } else if self.config.collision_detection {
                result.blocked = true;
                result.movement_cost = f64::INFINITY;
                result.climb_cost = result.climb_cost.max(props.climb_cost);
                every_blocker_climbable &= props.climbable;
            }

            result.damage += props.damage;
            result.damage_per_tick += props.damage_per_tick;

            if self.config.status_effects {
                for effect in &props.status_effects {
                    if rng.random::<f64>() < effect.probability {
                        result.status_effects.push(*effect);
                    }
                }
            }
            if self.config.signal_attenuation {
                result.signal_attenuation = result.signal_attenuation.max(props.signal_blocking);
            }
            if self.config.vision_blocking {
                result.vision_blocked |= props.vision_blocking;
            }
            result.hiding_bonus = result.hiding_bonus.max(props.hiding_value);

            if let (Some(resources), Some(remaining)) =
                (props.resources, obstacle.resources_remaining.as_mut())
            {
                let granted = resources.harvest_amount.min(*remaining).max(0.0);
                *remaining = (*remaining - granted).max(0.0);
                result.resources_gained += granted;
            }
        }

        result.climbable = result.blocked && every_blocker_climbable;
        if result.resources_gained > 0.0 || result.blocked {
            debug!(
                creature_id = %creature.id(),
                blocked = result.blocked,
                resources = result.resources_gained,
                "Obstacle interaction"
            );
        }
        result
    }

    /// Blocked flag and movement cost at `position`, without rolling
    /// effects or touching resources.
    pub fn movement_cost_at(&self, position: Vec2) -> TerrainCost {
        let mut cost = TerrainCost::OPEN;
        for obstacle in self.obstacles_at_position(position) {
            let props = &obstacle.properties;
            if props.passable {
                cost.movement_cost = cost.movement_cost.max(props.movement_cost);
            } else if self.config.collision_detection {
                cost.blocked = true;
            }
        }
        if cost.blocked {
            cost.movement_cost = f64::INFINITY;
        }
        cost
    }

    /// How much of the view from `start` to `end` survives the
    /// vision-blocking obstacles the segment crosses.
    pub fn calculate_line_of_sight(&self, start: Vec2, end: Vec2) -> LineOfSight {
        let distance = start.distance(end);
        if !self.config.vision_blocking {
            return LineOfSight {
                visible: true,
                blocked_by: Vec::new(),
                transparency: 1.0,
                distance,
            };
        }

        let mut transparency = 1.0;
        let mut blocked_by = Vec::new();
        for id in self.ids_crossing(start, end) {
            let Some(obstacle) = self.obstacles.get(id) else {
                continue;
            };
            if obstacle.properties.vision_blocking {
                transparency *= obstacle.properties.transparency;
                blocked_by.push(id);
            }
        }

        LineOfSight {
            visible: transparency > VISIBILITY_THRESHOLD,
            blocked_by,
            transparency,
            distance,
        }
    }

    /// Obstacles crossed by the segment `start..end`, ordered by id.
    pub fn obstacles_crossing(&self, start: Vec2, end: Vec2) -> Vec<&Obstacle> {
        self.ids_crossing(start, end)
            .into_iter()
            .filter_map(|id| self.obstacles.get(id))
            .collect()
    }

    /// Whether walking straight from `from` to `to` passes through an
    /// impassable obstacle. Obstacles containing `from` are ignored so a
    /// creature can always step out of the one it stands in.
    pub fn step_blocked(&self, from: Vec2, to: Vec2) -> bool {
        if !self.config.collision_detection {
            return false;
        }
        self.ids_crossing(from, to)
            .into_iter()
            .filter_map(|id| self.obstacles.get(id))
            .any(|o| !o.properties.passable && !o.footprint.contains(from))
    }

    /// A* path for `creature` from `start` to `end`.
    ///
    /// No step of the path crosses an impassable obstacle. Returns an empty
    /// path when the goal is unreachable or the search budget runs out. With `pathfinding_consumes_resources` set, every
    /// sampled cell goes through [`check_interaction`](Self::check_interaction)
    /// and may roll effects and deplete resources.
    pub fn find_path(
        &mut self,
        creature: &impl Creature,
        start: Vec2,
        end: Vec2,
        rng: &mut impl Rng,
    ) -> Vec<PathNode> {
        let budget = self.config.max_path_expansions;
        let mut view = PathView {
            registry: self,
            creature,
            rng,
        };
        let result = pathfinding::search(start, end, budget, &mut view);

        match result {
            Ok(path) => path,
            Err(SearchFailure::BudgetSpent) => {
                warn!(
                    creature_id = %creature.id(),
                    budget,
                    "Path search budget exhausted"
                );
                Vec::new()
            }
            Err(reason) => {
                debug!(creature_id = %creature.id(), ?reason, "No path found");
                Vec::new()
            }
        }
    }

    /// Obstacles within `range` of `creature`, nearest first, with an
    /// approachability and danger assessment for each.
    pub fn detect_obstacles(&self, creature: &impl Creature, range: f64) -> Vec<ObstacleDetection> {
        let origin = creature.position();
        let mut detections: Vec<ObstacleDetection> = self
            .obstacles_in_radius(origin, range)
            .into_iter()
            .map(|o| {
                let nearest = o.footprint.closest_point(origin);
                ObstacleDetection {
                    obstacle_id: o.id,
                    obstacle_type: o.obstacle_type,
                    distance: o.footprint.distance_to(origin),
                    direction: (nearest - origin).normalized(),
                    approachability: obstacle::approachability(&o.properties),
                    danger_level: obstacle::danger_level(&o.properties),
                    hiding_value: o.properties.hiding_value,
                }
            })
            .collect();
        detections.sort_by(|a, b| {
            a.distance
                .total_cmp(&b.distance)
                .then_with(|| a.obstacle_id.cmp(&b.obstacle_id))
        });
        detections
    }

    // -------------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------------

    fn ids_at(&self, position: Vec2) -> Vec<ObstacleId> {
        if self.config.spatial_hashing {
            self.grid.query_point(position)
        } else {
            self.scan(|o| o.footprint.contains(position))
        }
    }

    fn ids_crossing(&self, start: Vec2, end: Vec2) -> Vec<ObstacleId> {
        if self.config.spatial_hashing {
            self.grid.query_segment(start, end)
        } else {
            self.scan(|o| Footprint::Rect(o.footprint).intersects_segment(start, end))
        }
    }

    /// Linear scan used when spatial hashing is disabled.
    fn scan(&self, keep: impl Fn(&Obstacle) -> bool) -> Vec<ObstacleId> {
        let mut ids: Vec<ObstacleId> = self
            .obstacles
            .iter()
            .filter(|(_, o)| keep(o))
            .map(|(id, _)| id)
            .collect();
        ids.sort_unstable();
        ids
    }

    /// Recompute the cached terrain of every cell in `keys`.
    fn refresh_cells(&mut self, keys: &[CellKey]) {
        for &key in keys {
            let Some(cell) = self.grid.cell(key) else {
                continue;
            };
            let summary = summarize(
                cell.members()
                    .iter()
                    .filter_map(|id| self.obstacles.get(*id)),
            );
            self.grid.set_summary(key, summary);
        }
    }
}

/// The registry as the path search sees it.
struct PathView<'a, C, R> {
    registry: &'a mut ObstacleRegistry,
    creature: &'a C,
    rng: &'a mut R,
}

impl<C: Creature, R: Rng> PathTerrain for PathView<'_, C, R> {
    fn terrain_at(&mut self, position: Vec2) -> TerrainCost {
        if self.registry.config.pathfinding_consumes_resources {
            let r = self
                .registry
                .check_interaction(self.creature, position, &mut *self.rng);
            TerrainCost {
                blocked: r.blocked,
                movement_cost: r.movement_cost,
            }
        } else {
            self.registry.movement_cost_at(position)
        }
    }

    fn step_blocked(&mut self, from: Vec2, to: Vec2) -> bool {
        self.registry.step_blocked(from, to)
    }
}

fn summarize<'a>(occupants: impl Iterator<Item = &'a Obstacle>) -> CellTerrain {
    let mut passable = true;
    let mut total = 0.0;
    let mut count = 0_u32;
    for obstacle in occupants {
        if obstacle.properties.passable {
            total += obstacle.properties.movement_cost;
            count = count.saturating_add(1);
        } else {
            passable = false;
        }
    }
    let mean_movement_cost = if count > 0 {
        total / f64::from(count)
    } else {
        1.0
    };
    CellTerrain {
        passable,
        mean_movement_cost,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use habitat_types::{ResourceProperties, StatusEffect, StatusEffectType};
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;
    use crate::creature::fixture::TestCreature;

    fn registry() -> ObstacleRegistry {
        ObstacleRegistry::new(ObstacleConfig::default()).unwrap()
    }

    fn linear_registry() -> ObstacleRegistry {
        ObstacleRegistry::new(ObstacleConfig {
            spatial_hashing: false,
            ..ObstacleConfig::default()
        })
        .unwrap()
    }

    fn place(reg: &mut ObstacleRegistry, t: ObstacleType, x: f64, y: f64, w: f64, h: f64) -> ObstacleId {
        reg.create_obstacle(
            t,
            Vec2::new(x, y),
            Vec2::new(w, h),
            &ObstaclePropertyOverrides::default(),
        )
        .id
    }

    fn ids(obstacles: &[&Obstacle]) -> Vec<ObstacleId> {
        obstacles.iter().map(|o| o.id).collect()
    }

    #[test]
    fn created_obstacle_is_stored_under_returned_id() {
        let mut reg = registry();
        let created = reg.create_obstacle(
            ObstacleType::Tree,
            Vec2::new(1.0, 1.0),
            Vec2::new(2.0, 2.0),
            &ObstaclePropertyOverrides::default(),
        );
        assert_eq!(reg.get(created.id), Some(&created));
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn removing_unknown_id_returns_false() {
        let mut reg = registry();
        let id = place(&mut reg, ObstacleType::Rock, 0.0, 0.0, 1.0, 1.0);
        assert!(reg.remove_obstacle(id));
        assert!(!reg.remove_obstacle(id));
        assert!(reg.is_empty());
    }

    #[test]
    fn removal_purges_every_cell() {
        let mut reg = registry();
        let id = place(&mut reg, ObstacleType::SolidBarrier, 5.0, 5.0, 25.0, 25.0);
        assert!(reg.remove_obstacle(id));
        for (x, y) in [(6.0, 6.0), (15.0, 15.0), (29.0, 29.0)] {
            assert!(reg.obstacles_at_position(Vec2::new(x, y)).is_empty());
        }
    }

    #[test]
    fn impassable_obstacle_blocks() {
        let mut reg = registry();
        let mut rng = SmallRng::seed_from_u64(1);
        let critter = TestCreature::at(0.0, 0.0);
        place(&mut reg, ObstacleType::SolidBarrier, 10.0, 10.0, 4.0, 4.0);
        let result = reg.check_interaction(&critter, Vec2::new(12.0, 12.0), &mut rng);
        assert!(result.blocked);
        assert!(!result.climbable);
        assert!(result.movement_cost.is_infinite());
        assert!(result.vision_blocked);
        assert!((result.signal_attenuation - 0.8).abs() < f64::EPSILON);
    }

    #[test]
    fn open_ground_is_neutral() {
        let mut reg = registry();
        let mut rng = SmallRng::seed_from_u64(1);
        let critter = TestCreature::at(0.0, 0.0);
        place(&mut reg, ObstacleType::SolidBarrier, 10.0, 10.0, 4.0, 4.0);
        let result = reg.check_interaction(&critter, Vec2::new(50.0, 50.0), &mut rng);
        assert_eq!(result, InteractionResult::default());
    }

    #[test]
    fn overlapping_obstacles_fold() {
        let mut reg = registry();
        let mut rng = SmallRng::seed_from_u64(3);
        let critter = TestCreature::at(0.0, 0.0);
        place(&mut reg, ObstacleType::Water, 0.0, 0.0, 4.0, 4.0);
        place(&mut reg, ObstacleType::Hazard, 1.0, 1.0, 4.0, 4.0);
        place(&mut reg, ObstacleType::Shelter, 2.0, 2.0, 4.0, 4.0);
        let result = reg.check_interaction(&critter, Vec2::new(3.0, 3.0), &mut rng);
        assert!(!result.blocked);
        // Max, not sum.
        assert!((result.movement_cost - 3.0).abs() < f64::EPSILON);
        assert!((result.damage - 5.0).abs() < f64::EPSILON);
        assert!((result.hiding_bonus - 0.8).abs() < f64::EPSILON);
        assert!((result.signal_attenuation - 0.6).abs() < f64::EPSILON);
        // Shelter triggers with probability 1.
        assert!(
            result
                .status_effects
                .iter()
                .any(|e| e.effect_type == StatusEffectType::Sheltered)
        );
    }

    #[test]
    fn climbable_only_when_every_blocker_is() {
        let mut reg = registry();
        let mut rng = SmallRng::seed_from_u64(3);
        let critter = TestCreature::at(0.0, 0.0);
        place(&mut reg, ObstacleType::Rock, 0.0, 0.0, 2.0, 2.0);
        place(&mut reg, ObstacleType::Cliff, 1.0, 1.0, 2.0, 2.0);
        let both = reg.check_interaction(&critter, Vec2::new(1.5, 1.5), &mut rng);
        assert!(both.blocked && both.climbable);
        assert!((both.climb_cost - 5.0).abs() < f64::EPSILON);

        place(&mut reg, ObstacleType::SolidBarrier, 1.0, 1.0, 1.0, 1.0);
        let mixed = reg.check_interaction(&critter, Vec2::new(1.5, 1.5), &mut rng);
        assert!(mixed.blocked && !mixed.climbable);
    }

    #[test]
    fn harvesting_depletes_and_floors_at_zero() {
        let mut reg = registry();
        let mut rng = SmallRng::seed_from_u64(5);
        let critter = TestCreature::at(0.0, 0.0);
        let overrides = ObstaclePropertyOverrides {
            resources: Some(ResourceProperties {
                generation_rate: 1.0,
                capacity: 15.0,
                harvest_amount: 10.0,
            }),
            ..ObstaclePropertyOverrides::default()
        };
        let id = reg
            .create_obstacle(
                ObstacleType::ResourcePoint,
                Vec2::ZERO,
                Vec2::new(2.0, 2.0),
                &overrides,
            )
            .id;
        let target = Vec2::new(1.0, 1.0);
        let first = reg.check_interaction(&critter, target, &mut rng);
        let second = reg.check_interaction(&critter, target, &mut rng);
        let third = reg.check_interaction(&critter, target, &mut rng);
        assert!((first.resources_gained - 10.0).abs() < f64::EPSILON);
        assert!((second.resources_gained - 5.0).abs() < f64::EPSILON);
        assert!(third.resources_gained.abs() < f64::EPSILON);
        assert_eq!(reg.get(id).and_then(|o| o.resources_remaining), Some(0.0));

        // Regeneration is capped at capacity.
        assert!((reg.update(4.0) - 4.0).abs() < f64::EPSILON);
        reg.update(100.0);
        assert_eq!(reg.get(id).and_then(|o| o.resources_remaining), Some(15.0));
    }

    #[test]
    fn regeneration_can_be_disabled() {
        let mut reg = ObstacleRegistry::new(ObstacleConfig {
            resource_generation: false,
            ..ObstacleConfig::default()
        })
        .unwrap();
        let mut rng = SmallRng::seed_from_u64(5);
        let critter = TestCreature::at(0.0, 0.0);
        let id = place(&mut reg, ObstacleType::ResourcePoint, 0.0, 0.0, 2.0, 2.0);
        reg.check_interaction(&critter, Vec2::new(1.0, 1.0), &mut rng);
        assert!(reg.update(10.0).abs() < f64::EPSILON);
        assert_eq!(reg.get(id).and_then(|o| o.resources_remaining), Some(90.0));
    }

    #[test]
    fn disabled_toggles_suppress_their_outputs() {
        let mut reg = ObstacleRegistry::new(ObstacleConfig {
            collision_detection: false,
            signal_attenuation: false,
            vision_blocking: false,
            status_effects: false,
            ..ObstacleConfig::default()
        })
        .unwrap();
        let mut rng = SmallRng::seed_from_u64(5);
        let critter = TestCreature::at(0.0, 0.0);
        place(&mut reg, ObstacleType::Cave, 0.0, 0.0, 4.0, 4.0);
        place(&mut reg, ObstacleType::SolidBarrier, 0.0, 0.0, 4.0, 4.0);
        let result = reg.check_interaction(&critter, Vec2::new(2.0, 2.0), &mut rng);
        assert!(!result.blocked);
        assert!(!result.vision_blocked);
        assert!(result.signal_attenuation.abs() < f64::EPSILON);
        assert!(result.status_effects.is_empty());
        assert!(reg.calculate_line_of_sight(Vec2::new(-5.0, 2.0), Vec2::new(9.0, 2.0)).visible);
    }

    #[test]
    fn effect_rolls_follow_the_seed() {
        let overrides = ObstaclePropertyOverrides {
            status_effects: Some(vec![StatusEffect::new(
                StatusEffectType::Burning,
                1.0,
                2,
                0.5,
            )]),
            ..ObstaclePropertyOverrides::default()
        };
        let run = |seed: u64| {
            let mut reg = registry();
            reg.create_obstacle(ObstacleType::Hazard, Vec2::ZERO, Vec2::new(1.0, 1.0), &overrides);
            let mut rng = SmallRng::seed_from_u64(seed);
            let critter = TestCreature::at(0.0, 0.0);
            (0..32)
                .map(|_| {
                    reg.check_interaction(&critter, Vec2::new(0.5, 0.5), &mut rng)
                        .status_effects
                        .len()
                })
                .collect::<Vec<_>>()
        };
        assert_eq!(run(9), run(9));
        let triggered: usize = run(9).iter().sum();
        assert!(triggered > 0 && triggered < 32);
    }

    #[test]
    fn read_only_cost_leaves_resources_alone() {
        let mut reg = registry();
        let id = place(&mut reg, ObstacleType::ResourcePoint, 0.0, 0.0, 2.0, 2.0);
        let cost = reg.movement_cost_at(Vec2::new(1.0, 1.0));
        assert!(!cost.blocked);
        assert!((cost.movement_cost - 1.2).abs() < f64::EPSILON);
        assert_eq!(reg.get(id).and_then(|o| o.resources_remaining), Some(100.0));
    }

    #[test]
    fn cell_summary_tracks_membership() {
        let mut reg = registry();
        let p = Vec2::new(3.0, 3.0);
        assert_eq!(reg.cell_terrain(p), CellTerrain::default());

        place(&mut reg, ObstacleType::Water, 0.0, 0.0, 2.0, 2.0);
        place(&mut reg, ObstacleType::PartialBarrier, 4.0, 4.0, 2.0, 2.0);
        let terrain = reg.cell_terrain(p);
        assert!(terrain.passable);
        assert!((terrain.mean_movement_cost - 2.5).abs() < f64::EPSILON);

        let wall = place(&mut reg, ObstacleType::SolidBarrier, 7.0, 7.0, 1.0, 1.0);
        assert!(!reg.cell_terrain(p).passable);
        reg.remove_obstacle(wall);
        assert!(reg.cell_terrain(p).passable);
    }

    #[test]
    fn line_of_sight_multiplies_transparency() {
        let mut reg = registry();
        place(&mut reg, ObstacleType::Tree, 3.0, -1.0, 1.0, 2.0);
        place(&mut reg, ObstacleType::PartialBarrier, 6.0, -1.0, 1.0, 2.0);
        let los = reg.calculate_line_of_sight(Vec2::ZERO, Vec2::new(10.0, 0.0));
        assert_eq!(los.blocked_by.len(), 2);
        assert!((los.transparency - 0.3).abs() < 1e-12);
        assert!(los.visible);
        assert!((los.distance - 10.0).abs() < f64::EPSILON);

        place(&mut reg, ObstacleType::Rock, 8.0, -1.0, 1.0, 2.0);
        let los = reg.calculate_line_of_sight(Vec2::ZERO, Vec2::new(10.0, 0.0));
        assert!(!los.visible);
        assert!(los.transparency.abs() < f64::EPSILON);
    }

    #[test]
    fn non_occluding_obstacles_do_not_count() {
        let mut reg = registry();
        place(&mut reg, ObstacleType::Water, 3.0, -1.0, 2.0, 2.0);
        let los = reg.calculate_line_of_sight(Vec2::ZERO, Vec2::new(10.0, 0.0));
        assert!(los.visible);
        assert!(los.blocked_by.is_empty());
        assert_eq!(reg.obstacles_crossing(Vec2::ZERO, Vec2::new(10.0, 0.0)).len(), 1);
    }

    #[test]
    fn linear_scan_matches_grid() {
        let mut hashed = registry();
        let mut linear = linear_registry();
        for reg in [&mut hashed, &mut linear] {
            place(reg, ObstacleType::Tree, 3.0, 3.0, 2.0, 2.0);
            place(reg, ObstacleType::Rock, 30.0, 4.0, 5.0, 1.0);
            place(reg, ObstacleType::Cave, -12.0, -12.0, 8.0, 8.0);
        }
        for point in [Vec2::new(4.0, 4.0), Vec2::new(31.0, 4.5), Vec2::new(-9.0, -9.0)] {
            assert_eq!(
                hashed.obstacles_at_position(point).len(),
                linear.obstacles_at_position(point).len()
            );
        }
        assert_eq!(
            hashed.obstacles_in_radius(Vec2::ZERO, 10.0).len(),
            linear.obstacles_in_radius(Vec2::ZERO, 10.0).len()
        );
        let a = hashed.calculate_line_of_sight(Vec2::new(-20.0, -10.0), Vec2::new(40.0, 5.0));
        let b = linear.calculate_line_of_sight(Vec2::new(-20.0, -10.0), Vec2::new(40.0, 5.0));
        assert_eq!(a.blocked_by.len(), b.blocked_by.len());
        assert!((a.transparency - b.transparency).abs() < 1e-12);
    }

    #[test]
    fn position_queries_are_idempotent() {
        let mut reg = registry();
        place(&mut reg, ObstacleType::Tree, 0.0, 0.0, 3.0, 3.0);
        place(&mut reg, ObstacleType::Shelter, 1.0, 1.0, 3.0, 3.0);
        let p = Vec2::new(2.0, 2.0);
        let first = ids(&reg.obstacles_at_position(p));
        let second = ids(&reg.obstacles_at_position(p));
        assert_eq!(first.len(), 2);
        assert_eq!(first, second);
    }

    #[test]
    fn detections_are_sorted_by_distance() {
        let mut reg = registry();
        let far = place(&mut reg, ObstacleType::Rock, 8.0, 0.0, 1.0, 1.0);
        let near = place(&mut reg, ObstacleType::Hazard, 2.0, 0.0, 1.0, 1.0);
        place(&mut reg, ObstacleType::Tree, 40.0, 0.0, 1.0, 1.0);
        let critter = TestCreature::at(0.0, 0.5);
        let found = reg.detect_obstacles(&critter, 10.0);
        assert_eq!(
            found.iter().map(|d| d.obstacle_id).collect::<Vec<_>>(),
            vec![near, far]
        );
        let nearest = found.first().unwrap();
        assert!((nearest.distance - 2.0).abs() < f64::EPSILON);
        assert_eq!(nearest.direction, Vec2::new(1.0, 0.0));
        assert!(nearest.danger_level > 0.0);
    }

    #[test]
    fn path_goes_around_a_wall() {
        let mut reg = registry();
        let mut rng = SmallRng::seed_from_u64(11);
        let critter = TestCreature::at(0.0, 0.0);
        let wall = place(&mut reg, ObstacleType::SolidBarrier, 5.0, -5.0, 1.0, 10.0);
        let path = reg.find_path(&critter, Vec2::ZERO, Vec2::new(10.0, 0.0), &mut rng);
        assert!(!path.is_empty());
        assert_eq!(path.last().map(|n| n.position), Some(Vec2::new(10.0, 0.0)));
        let footprint = reg.get(wall).unwrap().footprint;
        assert!(path.iter().all(|n| !footprint.contains(n.position)));
    }

    #[test]
    fn oversized_obstacle_still_blocks_and_shapes_terrain() {
        let mut reg = registry();
        place(&mut reg, ObstacleType::Water, -5.0e5, -5.0e5, 1.0e6, 1.0e6);
        let p = Vec2::new(12.0, -7.0);
        let terrain = reg.cell_terrain(p);
        assert!(terrain.passable);
        assert!(terrain.mean_movement_cost > 1.0);
        assert_eq!(reg.obstacles_at_position(p).len(), 1);

        let wall = place(&mut reg, ObstacleType::SolidBarrier, 11.0, -8.0, 2.0, 2.0);
        assert!(!reg.cell_terrain(p).passable);
        reg.remove_obstacle(wall);
        assert!(reg.cell_terrain(p).passable);
    }

    #[test]
    fn step_through_a_thin_wall_is_blocked() {
        let mut reg = registry();
        place(&mut reg, ObstacleType::SolidBarrier, 0.4, -2.0, 0.2, 4.0);
        assert!(reg.step_blocked(Vec2::ZERO, Vec2::new(1.0, 0.0)));
        assert!(!reg.step_blocked(Vec2::ZERO, Vec2::new(0.0, 1.0)));
        // Leaving the wall from inside it is allowed.
        assert!(!reg.step_blocked(Vec2::new(0.5, 0.0), Vec2::new(1.5, 0.0)));

        let mut ghost = ObstacleRegistry::new(ObstacleConfig {
            collision_detection: false,
            ..ObstacleConfig::default()
        })
        .unwrap();
        place(&mut ghost, ObstacleType::SolidBarrier, 0.4, -2.0, 0.2, 4.0);
        assert!(!ghost.step_blocked(Vec2::ZERO, Vec2::new(1.0, 0.0)));
    }

    #[test]
    fn exhausted_budget_returns_empty_path() {
        let mut reg = ObstacleRegistry::new(ObstacleConfig {
            max_path_expansions: 50,
            ..ObstacleConfig::default()
        })
        .unwrap();
        let mut rng = SmallRng::seed_from_u64(11);
        let critter = TestCreature::at(0.0, 0.0);
        let path = reg.find_path(&critter, Vec2::ZERO, Vec2::new(100.0, 0.0), &mut rng);
        assert!(path.is_empty());
    }

    #[test]
    fn consuming_pathfinding_harvests_along_the_way() {
        let mut reg = registry();
        let mut rng = SmallRng::seed_from_u64(11);
        let critter = TestCreature::at(0.0, 0.0);
        let field = place(&mut reg, ObstacleType::ResourcePoint, 2.0, -1.0, 2.0, 2.0);
        reg.find_path(&critter, Vec2::ZERO, Vec2::new(6.0, 0.0), &mut rng);
        let left = reg.get(field).and_then(|o| o.resources_remaining).unwrap();
        assert!(left < 100.0);

        let mut reg = ObstacleRegistry::new(ObstacleConfig {
            pathfinding_consumes_resources: false,
            ..ObstacleConfig::default()
        })
        .unwrap();
        let field = place(&mut reg, ObstacleType::ResourcePoint, 2.0, -1.0, 2.0, 2.0);
        reg.find_path(&critter, Vec2::ZERO, Vec2::new(6.0, 0.0), &mut rng);
        assert_eq!(reg.get(field).and_then(|o| o.resources_remaining), Some(100.0));
    }
}
