//! Behaviour sources and the intents they produce.
//!
//! During the Decision phase of the tick cycle the engine hands every
//! living creature's [`Perception`] to a [`BehaviorSource`] and receives a
//! list of [`Intent`]s back. Intents are requests, not outcomes: the tick
//! cycle still runs each move through the obstacle registry and each
//! emission through the signal registry, either of which may refuse it.
//!
//! - [`StubBehavior`] rests every creature and is used to exercise the
//!   tick cycle in isolation.
//! - [`ReactiveBehavior`] steers by what the creature perceives: away from
//!   threats and repelling signals, toward food and attracting signals, and
//!   raises the alarm when it spots a hazard nobody has warned about yet.

use std::collections::BTreeMap;

use habitat_types::{CreatureId, ObstacleType, SignalRequest, SignalType, Vec2};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde_json::json;

use crate::perception::Perception;

/// Errors that can occur during the decision phase.
#[derive(Debug, thiserror::Error)]
pub enum BehaviorError {
    /// An internal error in the behaviour source.
    #[error("behavior source error: {message}")]
    Internal {
        /// Description of the error.
        message: String,
    },
}

/// Something a creature wants to do this tick.
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    /// Stay put and recover energy.
    Rest,
    /// Take one step along `heading` (need not be normalized).
    Move {
        /// Direction of travel.
        heading: Vec2,
    },
    /// Emit a signal at the creature's position.
    Emit(SignalRequest),
}

/// A source of creature decisions.
pub trait BehaviorSource {
    /// Decide what every perceiving creature does this tick.
    ///
    /// Intents for one creature are applied in the order returned.
    /// Creatures missing from the result do nothing.
    ///
    /// # Errors
    ///
    /// Returns [`BehaviorError`] if the decision process fails entirely.
    fn decide(
        &mut self,
        tick: u64,
        perceptions: &BTreeMap<CreatureId, Perception>,
    ) -> Result<BTreeMap<CreatureId, Vec<Intent>>, BehaviorError>;
}

/// A behaviour source that rests every creature.
#[derive(Debug, Clone, Default)]
pub struct StubBehavior;

impl StubBehavior {
    /// Create a new stub behaviour source.
    pub const fn new() -> Self {
        Self
    }
}

impl BehaviorSource for StubBehavior {
    fn decide(
        &mut self,
        _tick: u64,
        perceptions: &BTreeMap<CreatureId, Perception>,
    ) -> Result<BTreeMap<CreatureId, Vec<Intent>>, BehaviorError> {
        Ok(perceptions
            .keys()
            .map(|&id| (id, vec![Intent::Rest]))
            .collect())
    }
}

/// Energy below which a creature with nothing to react to rests.
const REST_BELOW_ENERGY: f64 = 25.0;

/// Energy below which a creature heads for food it can see.
const HUNGRY_BELOW_ENERGY: f64 = 70.0;

/// Energy a creature keeps in reserve instead of spending on alarms.
const ALARM_RESERVE: f64 = 20.0;

/// Pulls weaker than this are treated as no pull at all.
const MIN_PULL: f64 = 1e-6;

/// Steering from perception, with a seeded random walk as the fallback.
#[derive(Debug, Clone)]
pub struct ReactiveBehavior {
    rng: SmallRng,
}

impl ReactiveBehavior {
    /// Create a reactive behaviour source whose random walk is seeded
    /// with `seed`.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    fn decide_one(&mut self, perception: &Perception) -> Vec<Intent> {
        let mut intents = Vec::new();

        let threat = perception.nearest_threat();
        if let Some(threat) = threat {
            let already_warned = perception.signals.iter().any(|s| {
                matches!(
                    s.reception.signal_type,
                    SignalType::Warning | SignalType::DangerApproach
                )
            });
            if !already_warned && perception.energy > ALARM_RESERVE {
                intents.push(Intent::Emit(
                    SignalRequest::new(SignalType::Warning, threat.danger_level)
                        .with_data(json!({ "obstacle_type": threat.obstacle_type })),
                ));
            }
        }

        let mut pull = perception.signal_pull();
        if let Some(threat) = threat {
            pull = pull - threat.direction * threat.danger_level;
        }
        let food = perception
            .nearest_resource()
            .filter(|f| f.distance > 0.0 && perception.energy < HUNGRY_BELOW_ENERGY);
        if let Some(food) = food {
            pull = pull + food.direction;
        }

        if pull.length() > MIN_PULL {
            intents.push(Intent::Move { heading: pull });
        } else if perception.energy < REST_BELOW_ENERGY || standing_in_shelter(perception) {
            intents.push(Intent::Rest);
        } else {
            let angle = self.rng.random_range(0.0..core::f64::consts::TAU);
            intents.push(Intent::Move {
                heading: Vec2::new(angle.cos(), angle.sin()),
            });
        }
        intents
    }
}

fn standing_in_shelter(perception: &Perception) -> bool {
    perception.obstacles.iter().any(|d| {
        d.distance <= 0.0 && matches!(d.obstacle_type, ObstacleType::Shelter | ObstacleType::Cave)
    })
}

impl BehaviorSource for ReactiveBehavior {
    fn decide(
        &mut self,
        _tick: u64,
        perceptions: &BTreeMap<CreatureId, Perception>,
    ) -> Result<BTreeMap<CreatureId, Vec<Intent>>, BehaviorError> {
        Ok(perceptions
            .iter()
            .map(|(&id, perception)| (id, self.decide_one(perception)))
            .collect())
    }
}
