//! The tick cycle that drives the habitat.
//!
//! Each tick runs these phases in order:
//!
//! 1. **Clock** -- advance the world clock by one tick.
//! 2. **Terrain** -- regenerate resource obstacles and tidy the obstacle grid.
//! 3. **Signal sync** -- hand the current obstacle set to the signal
//!    registry as attenuators (an empty set when obstacle signal
//!    attenuation is switched off).
//! 4. **Signal decay** -- decay and expire signals in flight.
//! 5. **Perception** -- assemble a [`Perception`] for every living
//!    creature. Only the random generator is mutated.
//! 6. **Decision** -- collect [`Intent`]s from the [`BehaviorSource`].
//! 7. **Resolution** -- apply intents one creature at a time in id order:
//!    moves go through the obstacle interaction check, emissions through
//!    the signal registry, rests recover energy.
//! 8. **Vitals** -- tick status effects, age creatures, remove the dead.
//!
//! Every random draw comes from the [`Ecosystem`]'s single seeded
//! generator, so two ecosystems built from the same configuration and
//! driven by deterministic behaviour produce identical summaries.

use std::collections::BTreeMap;

use habitat_types::{CreatureId, Vec2};
use habitat_world::{Creature, ObstacleRegistry, SignalRegistry, WorldError};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::behavior::{BehaviorError, BehaviorSource, Intent};
use crate::clock::{ClockError, WorldClock};
use crate::config::{CreatureConfig, SimulationConfig};
use crate::creature::{CreatureState, seeded_id};
use crate::perception::{self, Perception};
use crate::scenario::{Scenario, ScenarioError};

/// Attempts made to find an unblocked spawn point per creature.
const SPAWN_ATTEMPTS: u32 = 16;

/// Errors that can occur while building or running the ecosystem.
#[derive(Debug, thiserror::Error)]
pub enum TickError {
    /// The world clock failed.
    #[error("clock error: {source}")]
    Clock {
        /// The underlying clock error.
        #[from]
        source: ClockError,
    },

    /// A registry could not be built.
    #[error("world error: {source}")]
    World {
        /// The underlying registry error.
        #[from]
        source: WorldError,
    },

    /// The behaviour source failed.
    #[error("behavior error: {source}")]
    Behavior {
        /// The underlying behaviour error.
        #[from]
        source: BehaviorError,
    },

    /// The scenario could not be applied.
    #[error("scenario error: {source}")]
    Scenario {
        /// The underlying scenario error.
        #[from]
        source: ScenarioError,
    },
}

/// Summary of what happened during a single tick.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TickSummary {
    /// The tick number that was executed.
    pub tick: u64,
    /// Simulated time elapsed after this tick.
    pub elapsed: f64,
    /// Creatures alive at the end of the tick.
    pub creatures_alive: usize,
    /// Creatures that died this tick, in id order.
    pub deaths: Vec<CreatureId>,
    /// Moves that were carried out.
    pub moves: u32,
    /// Moves refused because the target was blocked.
    pub moves_blocked: u32,
    /// Signals emitted.
    pub signals_emitted: u32,
    /// Emissions refused for lack of energy.
    pub signals_rejected: u32,
    /// Signals that decayed or aged out.
    pub signals_expired: usize,
    /// Signals in flight at the end of the tick.
    pub signals_active: usize,
    /// Resource units regenerated by obstacles.
    pub resources_regenerated: f64,
    /// Energy lost to obstacle contact and harmful effects.
    pub damage_taken: f64,
}

/// The whole simulated world: clock, registries, creatures, and the random
/// generator every subsystem draws from.
#[derive(Debug)]
pub struct Ecosystem {
    clock: WorldClock,
    obstacles: ObstacleRegistry,
    signals: SignalRegistry,
    creatures: BTreeMap<CreatureId, CreatureState>,
    creature_config: CreatureConfig,
    attenuate_signals: bool,
    seed: u64,
    spawned: u64,
    rng: SmallRng,
}

impl Ecosystem {
    /// Build an empty ecosystem from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`TickError::Clock`] for an unusable tick delta and
    /// [`TickError::World`] for an unusable registry configuration.
    pub fn new(config: &SimulationConfig) -> Result<Self, TickError> {
        let clock = WorldClock::new(&config.world)?;
        let obstacles = ObstacleRegistry::new(config.obstacles.clone())?;
        let mut signals = SignalRegistry::new(config.signals.clone())?;
        signals.set_environment(config.environment.signal_environment());

        Ok(Self {
            clock,
            obstacles,
            signals,
            creatures: BTreeMap::new(),
            creature_config: config.creatures.clone(),
            attenuate_signals: config.obstacles.signal_attenuation,
            seed: config.world.seed,
            spawned: 0,
            rng: SmallRng::seed_from_u64(config.world.seed),
        })
    }

    /// Build an ecosystem and populate it from a scenario.
    ///
    /// # Errors
    ///
    /// Returns any error of [`Ecosystem::new`], or [`TickError::Scenario`]
    /// if the scenario fails validation.
    pub fn from_scenario(
        config: &SimulationConfig,
        scenario: &Scenario,
    ) -> Result<Self, TickError> {
        scenario.validate()?;
        let mut ecosystem = Self::new(config)?;
        for spec in &scenario.obstacles {
            ecosystem.obstacles.create_obstacle(
                spec.obstacle_type,
                spec.position,
                spec.dimensions,
                &spec.overrides,
            );
        }
        let starting_energy = ecosystem.creature_config.starting_energy;
        for spec in &scenario.creatures {
            ecosystem.spawn(
                spec.position,
                spec.energy.unwrap_or(starting_energy),
                spec.age,
            );
        }
        info!(
            obstacles = ecosystem.obstacles.len(),
            creatures = ecosystem.creatures.len(),
            "Scenario loaded"
        );
        Ok(ecosystem)
    }

    /// Spawn the configured initial population at random unblocked points
    /// within the spawn radius. Returns how many creatures were placed.
    pub fn populate(&mut self) -> usize {
        let radius = self.creature_config.spawn_radius.max(0.0);
        let energy = self.creature_config.starting_energy;
        let mut placed = 0_usize;
        for _ in 0..self.creature_config.initial_count {
            let spot = (0..SPAWN_ATTEMPTS)
                .map(|_| random_point_in_disc(&mut self.rng, radius))
                .find(|&p| !self.obstacles.movement_cost_at(p).blocked);
            match spot {
                Some(position) => {
                    self.spawn(position, energy, 0);
                    placed = placed.saturating_add(1);
                }
                None => warn!(radius, "No unblocked spawn point found"),
            }
        }
        info!(placed, "Initial population spawned");
        placed
    }

    /// Add a living creature and return its id.
    ///
    /// Ids are derived from the world seed and the spawn order, so a
    /// replayed run hands out the same ids.
    pub fn spawn(&mut self, position: Vec2, energy: f64, age: u64) -> CreatureId {
        let id = seeded_id(self.seed, self.spawned);
        self.spawned = self.spawned.saturating_add(1);
        self.creatures
            .insert(id, CreatureState::new(id, position, energy, age));
        debug!(creature_id = %id, x = position.x, y = position.y, "Creature spawned");
        id
    }

    /// The world clock.
    pub const fn clock(&self) -> &WorldClock {
        &self.clock
    }

    /// The obstacle registry.
    pub const fn obstacles(&self) -> &ObstacleRegistry {
        &self.obstacles
    }

    /// Mutable access to the obstacle registry (scenario editing).
    pub const fn obstacles_mut(&mut self) -> &mut ObstacleRegistry {
        &mut self.obstacles
    }

    /// The signal registry.
    pub const fn signals(&self) -> &SignalRegistry {
        &self.signals
    }

    /// Mutable access to the signal registry (weather changes).
    pub const fn signals_mut(&mut self) -> &mut SignalRegistry {
        &mut self.signals
    }

    /// Every living creature, in id order.
    pub fn creatures(&self) -> impl Iterator<Item = &CreatureState> + '_ {
        self.creatures.values()
    }

    /// Look up a living creature.
    pub fn creature(&self, id: CreatureId) -> Option<&CreatureState> {
        self.creatures.get(&id)
    }
}

/// Execute one complete tick of the simulation.
///
/// # Errors
///
/// Returns [`TickError::Clock`] if the tick counter overflows, or
/// [`TickError::Behavior`] if the behaviour source fails.
pub fn run_tick(
    eco: &mut Ecosystem,
    behavior: &mut dyn BehaviorSource,
) -> Result<TickSummary, TickError> {
    // --- Phase 1: Clock ---
    let tick = eco.clock.advance()?;
    let dt = eco.clock.tick_delta();

    // --- Phase 2: Terrain ---
    let resources_regenerated = eco.obstacles.update(dt);

    // --- Phase 3: Signal sync ---
    if eco.attenuate_signals {
        eco.signals.set_obstacles(eco.obstacles.all_obstacles());
    } else {
        eco.signals.set_obstacles(core::iter::empty());
    }

    // --- Phase 4: Signal decay ---
    let signals_expired = eco.signals.update(dt);

    // --- Phase 5: Perception ---
    let perceptions = phase_perception(eco, tick);

    // --- Phase 6: Decision ---
    let decisions = behavior.decide(tick, &perceptions)?;

    // --- Phase 7: Resolution ---
    let mut summary = TickSummary {
        tick,
        resources_regenerated,
        signals_expired,
        ..TickSummary::default()
    };
    for (id, intents) in &decisions {
        for intent in intents {
            resolve_intent(eco, *id, intent, &mut summary);
        }
    }

    // --- Phase 8: Vitals ---
    for creature in eco.creatures.values_mut() {
        let outcome = creature.tick_effects();
        summary.damage_taken += (-outcome.energy_delta).max(0.0);
    }
    let dead: Vec<CreatureId> = eco
        .creatures
        .values()
        .filter(|c| !c.alive)
        .map(|c| c.id)
        .collect();
    for id in &dead {
        if let Some(creature) = eco.creatures.remove(id) {
            info!(tick, creature_id = %id, age = creature.age, "Creature died");
        }
    }

    summary.deaths = dead;
    summary.elapsed = eco.clock.elapsed();
    summary.creatures_alive = eco.creatures.len();
    summary.signals_active = eco.signals.len();

    info!(
        tick,
        alive = summary.creatures_alive,
        moves = summary.moves,
        blocked = summary.moves_blocked,
        emitted = summary.signals_emitted,
        expired = summary.signals_expired,
        active_signals = summary.signals_active,
        "Tick completed"
    );
    Ok(summary)
}

/// Phase 5: one perception per living creature, in id order.
fn phase_perception(eco: &mut Ecosystem, tick: u64) -> BTreeMap<CreatureId, Perception> {
    let range = eco.creature_config.perception_range;
    eco.creatures
        .values()
        .filter(|c| c.alive)
        .map(|c| {
            let p = perception::assemble_perception(
                tick,
                c,
                &eco.obstacles,
                &eco.signals,
                range,
                &mut eco.rng,
            );
            (c.id, p)
        })
        .collect()
}

/// Phase 7 for a single intent. Intents for dead or unknown creatures are
/// dropped.
fn resolve_intent(
    eco: &mut Ecosystem,
    id: CreatureId,
    intent: &Intent,
    summary: &mut TickSummary,
) {
    let Some(creature) = eco.creatures.get_mut(&id) else {
        return;
    };
    if !creature.alive {
        return;
    }

    match intent {
        Intent::Rest => creature.rest(eco.creature_config.rest_recovery),
        Intent::Emit(request) => {
            if eco.signals.emit_signal(creature, request.clone()).is_some() {
                summary.signals_emitted = summary.signals_emitted.saturating_add(1);
            } else {
                summary.signals_rejected = summary.signals_rejected.saturating_add(1);
            }
        }
        Intent::Move { heading } => {
            let direction = heading.normalized();
            if direction.length() <= 0.0 {
                return;
            }
            let step = eco.creature_config.step_length * creature.speed_factor();
            let target = creature.position + direction * step;
            let contact = eco
                .obstacles
                .check_interaction(&*creature, target, &mut eco.rng);

            let climb =
                contact.blocked && contact.climbable && creature.energy > contact.climb_cost;
            if contact.blocked && !climb {
                summary.moves_blocked = summary.moves_blocked.saturating_add(1);
                debug!(creature_id = %id, x = target.x, y = target.y, "Move blocked");
                return;
            }
            if climb {
                creature.spend_energy(contact.climb_cost);
            }

            let walk_cost = if contact.movement_cost.is_finite() {
                step * contact.movement_cost * eco.creature_config.move_energy_per_unit
            } else {
                0.0
            };
            creature.spend_energy(walk_cost);
            creature.position = target;

            let before = creature.energy;
            creature.apply_interaction(&contact);
            summary.damage_taken += (contact.damage + contact.damage_per_tick).min(before);
            summary.moves = summary.moves.saturating_add(1);
        }
    }
}

fn random_point_in_disc(rng: &mut impl Rng, radius: f64) -> Vec2 {
    let angle = rng.random_range(0.0..core::f64::consts::TAU);
    let distance = radius * rng.random::<f64>().sqrt();
    Vec2::new(angle.cos(), angle.sin()) * distance
}
