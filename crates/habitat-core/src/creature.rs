//! Mutable per-creature state owned by the simulation.
//!
//! [`CreatureState`] is what the registries see through the
//! [`Creature`] trait. Contact with obstacles feeds back into it through
//! [`CreatureState::apply_interaction`], and lingering status effects are
//! resolved once per tick by [`CreatureState::tick_effects`].

use habitat_types::{CreatureId, InteractionResult, StatusEffectType, Vec2};
use habitat_world::Creature;
use serde::{Deserialize, Serialize};

/// A status effect currently acting on a creature.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActiveEffect {
    /// Which effect.
    pub effect_type: StatusEffectType,
    /// Strength of the effect.
    pub magnitude: f64,
    /// Ticks left before the effect wears off.
    pub remaining: u32,
}

/// Outcome of resolving one tick of status effects.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EffectTick {
    /// Net energy change (negative for drains).
    pub energy_delta: f64,
    /// Effects that wore off this tick.
    pub expired: usize,
    /// The creature died this tick.
    pub died: bool,
}

/// A living (or dead) creature in the habitat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatureState {
    /// Stable identity.
    pub id: CreatureId,
    /// Current position.
    pub position: Vec2,
    /// Remaining energy; the creature dies when it reaches zero.
    pub energy: f64,
    /// Ticks lived.
    pub age: u64,
    /// Whether the creature is still alive.
    pub alive: bool,
    /// Status effects currently acting on the creature.
    pub effects: Vec<ActiveEffect>,
}

impl CreatureState {
    /// Create a living creature with no active effects.
    pub const fn new(id: CreatureId, position: Vec2, energy: f64, age: u64) -> Self {
        Self {
            id,
            position,
            energy,
            age,
            alive: true,
            effects: Vec::new(),
        }
    }

    /// Whether `effect_type` is currently active.
    pub fn has_effect(&self, effect_type: StatusEffectType) -> bool {
        self.effects.iter().any(|e| e.effect_type == effect_type)
    }

    /// Fraction of the normal step length the creature can currently
    /// cover. Slowing effects divide the step by `1 + magnitude`.
    pub fn speed_factor(&self) -> f64 {
        self.effects
            .iter()
            .filter(|e| e.effect_type == StatusEffectType::Slowed)
            .fold(1.0, |factor, e| factor / (1.0 + e.magnitude.max(0.0)))
    }

    /// Apply what contact with the obstacles at the creature's position did.
    ///
    /// Damage (one-shot and per-tick) debits energy, gathered resources
    /// credit it, and every triggered status effect is started or, when
    /// already active, refreshed to the longer duration and stronger
    /// magnitude.
    pub fn apply_interaction(&mut self, result: &InteractionResult) {
        self.energy += result.resources_gained - result.damage - result.damage_per_tick;
        for effect in &result.status_effects {
            if effect.duration == 0 {
                continue;
            }
            match self
                .effects
                .iter_mut()
                .find(|e| e.effect_type == effect.effect_type)
            {
                Some(active) => {
                    active.remaining = active.remaining.max(effect.duration);
                    active.magnitude = active.magnitude.max(effect.magnitude);
                }
                None => self.effects.push(ActiveEffect {
                    effect_type: effect.effect_type,
                    magnitude: effect.magnitude,
                    remaining: effect.duration,
                }),
            }
        }
        self.settle();
    }

    /// Resolve one tick: draining and regenerating effects change energy,
    /// every effect counts down, and the creature ages.
    pub fn tick_effects(&mut self) -> EffectTick {
        if !self.alive {
            return EffectTick::default();
        }
        let before = self.energy;
        for effect in &mut self.effects {
            match effect.effect_type {
                StatusEffectType::Poisoned | StatusEffectType::Burning => {
                    self.energy -= effect.magnitude;
                }
                StatusEffectType::Regenerating => self.energy += effect.magnitude,
                StatusEffectType::Slowed
                | StatusEffectType::Wet
                | StatusEffectType::Sheltered
                | StatusEffectType::Concealed => {}
            }
            effect.remaining = effect.remaining.saturating_sub(1);
        }
        let active = self.effects.len();
        self.effects.retain(|e| e.remaining > 0);
        self.age = self.age.saturating_add(1);
        self.settle();

        EffectTick {
            energy_delta: self.energy - before,
            expired: active.saturating_sub(self.effects.len()),
            died: !self.alive,
        }
    }

    /// Regain `amount` energy.
    pub fn rest(&mut self, amount: f64) {
        if self.alive {
            self.energy += amount.max(0.0);
        }
    }

    fn settle(&mut self) {
        if self.energy <= 0.0 || self.energy.is_nan() {
            self.energy = 0.0;
            self.alive = false;
        }
    }
}

impl Creature for CreatureState {
    fn id(&self) -> CreatureId {
        self.id
    }

    fn position(&self) -> Vec2 {
        self.position
    }

    fn energy(&self) -> f64 {
        self.energy
    }

    fn age(&self) -> u64 {
        self.age
    }

    fn spend_energy(&mut self, amount: f64) {
        self.energy = (self.energy - amount).max(0.0);
    }
}

/// Identity for the `index`-th creature of a run seeded with `seed`.
///
/// Ids derived this way are stable across runs, so two runs with the same
/// seed produce identical creature tables.
pub const fn seeded_id(seed: u64, index: u64) -> CreatureId {
    CreatureId::from_u64_pair(seed, index)
}
