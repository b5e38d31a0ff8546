//! Perception assembly for the Perception phase of the tick cycle.
//!
//! Each living creature gets a [`Perception`]: its own vitals, the cached
//! terrain summary of the cell it stands in, the obstacles within its
//! perception range, and every signal it can hear together with its own
//! interpretation of that signal.
//!
//! Assembly only reads the registries. The one mutable input is the
//! random generator that supplies reception noise.

use habitat_types::{
    CreatureId, ObstacleDetection, ObstacleType, SignalInterpretation, SignalReception, Vec2,
};
use habitat_world::{CellTerrain, Creature, ObstacleRegistry, SignalRegistry};
use rand::Rng;

use crate::creature::CreatureState;

/// Danger level at or above which a detected obstacle counts as a threat.
pub const THREAT_DANGER_LEVEL: f64 = 0.3;

/// A signal heard by a creature, with what it made of it.
#[derive(Debug, Clone, PartialEq)]
pub struct PerceivedSignal {
    /// The raw reception.
    pub reception: SignalReception,
    /// The receiver's interpretation.
    pub interpretation: SignalInterpretation,
}

/// Everything a creature knows at the start of its decision.
#[derive(Debug, Clone, PartialEq)]
pub struct Perception {
    /// Whose perception this is.
    pub creature_id: CreatureId,
    /// The tick being decided.
    pub tick: u64,
    /// Where the creature stands.
    pub position: Vec2,
    /// Remaining energy.
    pub energy: f64,
    /// Summary of the grid cell under the creature.
    pub terrain: CellTerrain,
    /// Nearby obstacles, nearest first.
    pub obstacles: Vec<ObstacleDetection>,
    /// Audible signals, strongest first.
    pub signals: Vec<PerceivedSignal>,
}

impl Perception {
    /// Sum of understood signals' pulls: each contributes its direction
    /// scaled by its action influence, so repelling signals point away.
    pub fn signal_pull(&self) -> Vec2 {
        self.signals
            .iter()
            .filter(|s| s.interpretation.understood)
            .fold(Vec2::ZERO, |acc, s| {
                acc + s.reception.direction * s.interpretation.action_influence
            })
    }

    /// The most dangerous nearby obstacle at or above
    /// [`THREAT_DANGER_LEVEL`], nearest first on ties.
    pub fn nearest_threat(&self) -> Option<&ObstacleDetection> {
        self.obstacles
            .iter()
            .filter(|d| d.danger_level >= THREAT_DANGER_LEVEL)
            .max_by(|a, b| {
                a.danger_level
                    .total_cmp(&b.danger_level)
                    .then_with(|| b.distance.total_cmp(&a.distance))
            })
    }

    /// The nearest detected resource point, if any.
    pub fn nearest_resource(&self) -> Option<&ObstacleDetection> {
        self.obstacles
            .iter()
            .find(|d| d.obstacle_type == ObstacleType::ResourcePoint)
    }
}

/// Assemble the [`Perception`] of one creature.
pub fn assemble_perception(
    tick: u64,
    creature: &CreatureState,
    obstacles: &ObstacleRegistry,
    signals: &SignalRegistry,
    range: f64,
    rng: &mut impl Rng,
) -> Perception {
    let heard = signals
        .get_signals_for_creature(creature, rng)
        .into_iter()
        .map(|reception| {
            let interpretation = signals.process_signal_reception(creature, &reception);
            PerceivedSignal {
                reception,
                interpretation,
            }
        })
        .collect();

    Perception {
        creature_id: creature.id(),
        tick,
        position: creature.position(),
        energy: creature.energy(),
        terrain: obstacles.cell_terrain(creature.position()),
        obstacles: obstacles.detect_obstacles(creature, range),
        signals: heard,
    }
}
