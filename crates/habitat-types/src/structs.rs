//! Core entity records: obstacles, signals, and the values they carry.

use serde::{Deserialize, Serialize};

use crate::enums::{ObstacleType, SignalPriority, SignalType, StatusEffectType};
use crate::geometry::{Rect, Vec2};
use crate::ids::{CreatureId, ObstacleId, SignalId};

// ---------------------------------------------------------------------------
// Status effects
// ---------------------------------------------------------------------------

/// A status effect an obstacle may apply to a creature in contact with it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatusEffect {
    /// Which effect is applied.
    pub effect_type: StatusEffectType,
    /// Strength of the effect (energy per tick for draining effects).
    pub magnitude: f64,
    /// Number of ticks the effect lasts once applied.
    pub duration: u32,
    /// Chance in `[0, 1]` that contact triggers the effect on a given tick.
    pub probability: f64,
}

impl StatusEffect {
    /// Create a status effect, clamping `probability` into `[0, 1]`.
    pub fn new(
        effect_type: StatusEffectType,
        magnitude: f64,
        duration: u32,
        probability: f64,
    ) -> Self {
        Self {
            effect_type,
            magnitude,
            duration,
            probability: probability.clamp(0.0, 1.0),
        }
    }
}

// ---------------------------------------------------------------------------
// Obstacle properties
// ---------------------------------------------------------------------------

/// Regeneration parameters for obstacles that yield resources.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResourceProperties {
    /// Units regenerated per unit of simulated time.
    pub generation_rate: f64,
    /// Maximum stored units.
    pub capacity: f64,
    /// Units granted to a creature per contact.
    pub harvest_amount: f64,
}

/// Physical and behavioural properties of an obstacle.
///
/// Invariants (enforced by [`ObstacleProperties::normalized`]):
/// - `movement_cost >= 1` when `passable`, infinite when not.
/// - every coefficient documented as `0-1` lies in `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObstacleProperties {
    /// Whether creatures can walk through the footprint.
    pub passable: bool,
    /// Multiplier on movement cost inside the footprint.
    pub movement_cost: f64,
    /// One-shot damage applied on contact.
    pub damage: f64,
    /// Damage applied for every tick spent inside the footprint.
    pub damage_per_tick: f64,
    /// Fraction (0-1) of signal strength absorbed by the obstacle.
    pub signal_blocking: f64,
    /// Fraction (0-1) of signal strength reflected by the obstacle.
    pub signal_reflection: f64,
    /// Whether the obstacle occludes vision at all.
    pub vision_blocking: bool,
    /// Fraction (0-1) of light passing through when vision-blocking.
    pub transparency: f64,
    /// Concealment (0-1) granted to creatures inside the footprint.
    pub hiding_value: f64,
    /// Whether an impassable obstacle can be climbed over.
    pub climbable: bool,
    /// Extra movement cost paid to climb.
    pub climb_cost: f64,
    /// Effects rolled on contact.
    pub status_effects: Vec<StatusEffect>,
    /// Resource yield, for obstacles that produce resources.
    pub resources: Option<ResourceProperties>,
}

impl ObstacleProperties {
    /// Return a copy with every invariant enforced.
    ///
    /// A passable obstacle with a non-finite movement cost is treated as
    /// impassable.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        if self.passable && !self.movement_cost.is_finite() {
            self.passable = false;
        }
        self.movement_cost = if self.passable {
            self.movement_cost.max(1.0)
        } else {
            f64::INFINITY
        };
        self.damage = non_negative(self.damage);
        self.damage_per_tick = non_negative(self.damage_per_tick);
        self.signal_blocking = unit(self.signal_blocking);
        self.signal_reflection = unit(self.signal_reflection);
        self.transparency = unit(self.transparency);
        self.hiding_value = unit(self.hiding_value);
        self.climb_cost = non_negative(self.climb_cost);
        for effect in &mut self.status_effects {
            effect.probability = unit(effect.probability);
            effect.magnitude = non_negative(effect.magnitude);
        }
        if let Some(resources) = &mut self.resources {
            resources.generation_rate = non_negative(resources.generation_rate);
            resources.capacity = non_negative(resources.capacity);
            resources.harvest_amount = non_negative(resources.harvest_amount);
        }
        self
    }
}

/// Partial set of obstacle properties layered over the type defaults.
///
/// Every `None` field keeps the default for the obstacle's type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObstaclePropertyOverrides {
    /// Override for [`ObstacleProperties::passable`].
    pub passable: Option<bool>,
    /// Override for [`ObstacleProperties::movement_cost`].
    pub movement_cost: Option<f64>,
    /// Override for [`ObstacleProperties::damage`].
    pub damage: Option<f64>,
    /// Override for [`ObstacleProperties::damage_per_tick`].
    pub damage_per_tick: Option<f64>,
    /// Override for [`ObstacleProperties::signal_blocking`].
    pub signal_blocking: Option<f64>,
    /// Override for [`ObstacleProperties::signal_reflection`].
    pub signal_reflection: Option<f64>,
    /// Override for [`ObstacleProperties::vision_blocking`].
    pub vision_blocking: Option<bool>,
    /// Override for [`ObstacleProperties::transparency`].
    pub transparency: Option<f64>,
    /// Override for [`ObstacleProperties::hiding_value`].
    pub hiding_value: Option<f64>,
    /// Override for [`ObstacleProperties::climbable`].
    pub climbable: Option<bool>,
    /// Override for [`ObstacleProperties::climb_cost`].
    pub climb_cost: Option<f64>,
    /// Override for [`ObstacleProperties::status_effects`].
    pub status_effects: Option<Vec<StatusEffect>>,
    /// Override for [`ObstacleProperties::resources`].
    pub resources: Option<ResourceProperties>,
}

impl ObstaclePropertyOverrides {
    /// Layer these overrides over `base` and normalize the result.
    #[must_use]
    pub fn apply(&self, base: ObstacleProperties) -> ObstacleProperties {
        ObstacleProperties {
            passable: self.passable.unwrap_or(base.passable),
            movement_cost: self.movement_cost.unwrap_or(base.movement_cost),
            damage: self.damage.unwrap_or(base.damage),
            damage_per_tick: self.damage_per_tick.unwrap_or(base.damage_per_tick),
            signal_blocking: self.signal_blocking.unwrap_or(base.signal_blocking),
            signal_reflection: self.signal_reflection.unwrap_or(base.signal_reflection),
            vision_blocking: self.vision_blocking.unwrap_or(base.vision_blocking),
            transparency: self.transparency.unwrap_or(base.transparency),
            hiding_value: self.hiding_value.unwrap_or(base.hiding_value),
            climbable: self.climbable.unwrap_or(base.climbable),
            climb_cost: self.climb_cost.unwrap_or(base.climb_cost),
            status_effects: self
                .status_effects
                .clone()
                .unwrap_or(base.status_effects),
            resources: self.resources.or(base.resources),
        }
        .normalized()
    }
}

// ---------------------------------------------------------------------------
// Obstacle
// ---------------------------------------------------------------------------

/// A static, positioned, rectangular environment feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    /// Registry handle.
    pub id: ObstacleId,
    /// Terrain kind.
    pub obstacle_type: ObstacleType,
    /// Axis-aligned footprint.
    pub footprint: Rect,
    /// Behavioural properties.
    pub properties: ObstacleProperties,
    /// Units currently stored, for resource-yielding obstacles.
    pub resources_remaining: Option<f64>,
}

impl Obstacle {
    /// Anchor corner of the footprint.
    pub const fn position(&self) -> Vec2 {
        self.footprint.position
    }

    /// Width and height of the footprint.
    pub const fn dimensions(&self) -> Vec2 {
        self.footprint.size
    }
}

// ---------------------------------------------------------------------------
// Signals
// ---------------------------------------------------------------------------

/// A transient message emitted by a creature.
///
/// The source position is captured at emission and never updated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    /// Registry handle.
    pub id: SignalId,
    /// Semantic category.
    pub signal_type: SignalType,
    /// Current strength in `[0, 1]`; decays multiplicatively each tick.
    pub strength: f64,
    /// Urgency.
    pub priority: SignalPriority,
    /// Emitting creature.
    pub source_id: CreatureId,
    /// Where the emitter stood when the signal was sent.
    pub source_position: Vec2,
    /// Optional free-form payload.
    pub data: Option<serde_json::Value>,
    /// Registry time at emission.
    pub emitted_at: f64,
    /// Monotonic emission counter, used to order equal timestamps.
    pub sequence: u64,
    /// Fraction of strength lost per tick.
    pub decay_rate: f64,
    /// Energy charged to the emitter.
    pub energy_cost: f64,
}

/// Parameters of an emission request.
///
/// Missing fields fall back to the defaults for the signal type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalRequest {
    /// Semantic category.
    pub signal_type: SignalType,
    /// Initial strength; clamped into `[0, 1]`.
    pub strength: f64,
    /// Urgency override.
    #[serde(default)]
    pub priority: Option<SignalPriority>,
    /// Decay rate override.
    #[serde(default)]
    pub decay_rate: Option<f64>,
    /// Energy cost override.
    #[serde(default)]
    pub energy_cost: Option<f64>,
    /// Optional payload.
    #[serde(default)]
    pub data: Option<serde_json::Value>,
}

impl SignalRequest {
    /// A request using every per-type default.
    pub const fn new(signal_type: SignalType, strength: f64) -> Self {
        Self {
            signal_type,
            strength,
            priority: None,
            decay_rate: None,
            energy_cost: None,
            data: None,
        }
    }

    /// Attach a payload.
    #[must_use]
    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Override the priority.
    #[must_use]
    pub const fn with_priority(mut self, priority: SignalPriority) -> Self {
        self.priority = Some(priority);
        self
    }
}

/// Ambient conditions affecting every signal in flight.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignalEnvironment {
    /// Fraction (0-1) of strength lost to the medium (wind, rain, foliage).
    pub attenuation: f64,
    /// Amplitude of the symmetric uniform noise added at reception.
    pub noise_level: f64,
}

impl SignalEnvironment {
    /// Still, silent conditions.
    pub const CALM: Self = Self {
        attenuation: 0.0,
        noise_level: 0.0,
    };

    /// Create an environment, clamping both fields into `[0, 1]`. NaN
    /// becomes 0.
    pub fn new(attenuation: f64, noise_level: f64) -> Self {
        Self {
            attenuation: unit(attenuation),
            noise_level: unit(noise_level),
        }
    }
}

impl Default for SignalEnvironment {
    fn default() -> Self {
        Self::new(0.1, 0.05)
    }
}

fn unit(value: f64) -> f64 {
    if value.is_nan() { 0.0 } else { value.clamp(0.0, 1.0) }
}

fn non_negative(value: f64) -> f64 {
    if value.is_nan() { 0.0 } else { value.max(0.0) }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wall() -> ObstacleProperties {
        ObstacleProperties {
            passable: false,
            movement_cost: 3.0,
            damage: -2.0,
            damage_per_tick: 0.0,
            signal_blocking: 1.4,
            signal_reflection: 0.2,
            vision_blocking: true,
            transparency: -0.5,
            hiding_value: 0.5,
            climbable: false,
            climb_cost: 0.0,
            status_effects: Vec::new(),
            resources: None,
        }
    }

    #[test]
    fn impassable_cost_is_infinite() {
        let props = wall().normalized();
        assert!(props.movement_cost.is_infinite());
        assert!(props.signal_blocking <= 1.0);
        assert!(props.transparency >= 0.0);
        assert!(props.damage >= 0.0);
    }

    #[test]
    fn passable_cost_is_at_least_one() {
        let mut props = wall();
        props.passable = true;
        props.movement_cost = 0.25;
        assert!((props.normalized().movement_cost - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn infinite_cost_makes_obstacle_impassable() {
        let mut props = wall();
        props.passable = true;
        props.movement_cost = f64::INFINITY;
        assert!(!props.normalized().passable);
    }

    #[test]
    fn overrides_replace_only_set_fields() {
        let overrides = ObstaclePropertyOverrides {
            signal_blocking: Some(0.8),
            ..ObstaclePropertyOverrides::default()
        };
        let props = overrides.apply(wall());
        assert!((props.signal_blocking - 0.8).abs() < f64::EPSILON);
        assert!(!props.passable);
        assert!((props.hiding_value - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn environment_is_clamped() {
        let env = SignalEnvironment::new(2.0, -1.0);
        assert!((env.attenuation - 1.0).abs() < f64::EPSILON);
        assert!(env.noise_level.abs() < f64::EPSILON);

        let env = SignalEnvironment::new(f64::NAN, f64::INFINITY);
        assert!(env.attenuation.abs() < f64::EPSILON);
        assert!((env.noise_level - 1.0).abs() < f64::EPSILON);
    }
}
