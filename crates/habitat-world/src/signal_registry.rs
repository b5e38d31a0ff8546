//! Signal storage, decay, propagation, and reception.
//!
//! The [`SignalRegistry`] owns every active [`Signal`]. Signals are filed in
//! a point-footprint [`SpatialHashGrid`] at their source position, decay
//! multiplicatively on every [`update`](SignalRegistry::update), and expire
//! when too weak or too old. The registry keeps its own clock, advanced by
//! the `delta_time` passed to `update`, which stamps new emissions.
//!
//! Received strength at distance `d`:
//!
//! ```text
//! strength * 1 / (1 + k * d^2) * (1 - environment.attenuation) * product(1 - blocking_i)
//! ```
//!
//! where the product runs over every attenuating obstacle whose footprint
//! the source-to-receiver segment crosses. Symmetric uniform noise is
//! added afterwards and the result clamped to `[0, 1]`; the stored signal
//! is never modified by reception.

use std::collections::BTreeMap;

use habitat_types::{
    Obstacle, Rect, Signal, SignalEnvironment, SignalId, SignalInterpretation, SignalReception,
    SignalRequest, SignalType, Vec2,
};
use rand::Rng;
use serde::{Deserialize, Serialize};
use slotmap::SlotMap;
use tracing::debug;

use crate::config::SignalConfig;
use crate::creature::Creature;
use crate::error::WorldError;
use crate::geometry;
use crate::signal;
use crate::spatial::{Footprint, SpatialHashGrid};

/// An obstacle as seen by the signal system: a footprint and how much of
/// a crossing signal it absorbs.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Attenuator {
    footprint: Rect,
    blocking: f64,
}

/// Snapshot of the registry's population and lifetime counters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SignalStats {
    /// Signals currently active.
    pub active: usize,
    /// Active signals per type.
    pub by_type: BTreeMap<SignalType, usize>,
    /// Mean strength of the active signals (0 when none are active).
    pub mean_strength: f64,
    /// Signals emitted since construction.
    pub total_emitted: u64,
    /// Signals removed for being too weak or too old.
    pub total_expired: u64,
    /// Signals evicted to respect the active-signal cap.
    pub total_evicted: u64,
    /// Emissions refused for lack of energy.
    pub total_rejected: u64,
}

/// Owner of every active signal.
#[derive(Debug, Clone)]
pub struct SignalRegistry {
    config: SignalConfig,
    signals: SlotMap<SignalId, Signal>,
    grid: SpatialHashGrid<SignalId>,
    attenuators: Vec<Attenuator>,
    environment: SignalEnvironment,
    elapsed: f64,
    next_sequence: u64,
    stats: SignalStats,
}

impl SignalRegistry {
    /// Create an empty registry in the default environment.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::InvalidConfig`] if the configuration fails
    /// [`SignalConfig::validate`].
    pub fn new(config: SignalConfig) -> Result<Self, WorldError> {
        config.validate()?;
        let grid = SpatialHashGrid::new(config.grid_size)?;
        Ok(Self {
            config,
            signals: SlotMap::with_key(),
            grid,
            attenuators: Vec::new(),
            environment: SignalEnvironment::default(),
            elapsed: 0.0,
            next_sequence: 0,
            stats: SignalStats::default(),
        })
    }

    /// The configuration this registry was built with.
    pub const fn config(&self) -> &SignalConfig {
        &self.config
    }

    /// Time accumulated through [`update`](Self::update).
    pub const fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Number of active signals.
    pub fn len(&self) -> usize {
        self.signals.len()
    }

    /// Whether no signals are active.
    pub fn is_empty(&self) -> bool {
        self.signals.is_empty()
    }

    /// Look up an active signal.
    pub fn get(&self, id: SignalId) -> Option<&Signal> {
        self.signals.get(id)
    }

    /// Every active signal, in arena order.
    pub fn active_signals(&self) -> impl Iterator<Item = &Signal> + '_ {
        self.signals.values()
    }

    /// Current ambient conditions.
    pub const fn environment(&self) -> SignalEnvironment {
        self.environment
    }

    /// Replace the ambient conditions, clamping both fields into `[0, 1]`.
    pub fn set_environment(&mut self, environment: SignalEnvironment) {
        self.environment = SignalEnvironment::new(environment.attenuation, environment.noise_level);
    }

    /// Replace the set of obstacles that absorb signals.
    ///
    /// Obstacles that block nothing are skipped.
    pub fn set_obstacles<'a>(&mut self, obstacles: impl IntoIterator<Item = &'a Obstacle>) {
        self.attenuators = obstacles
            .into_iter()
            .filter(|o| o.properties.signal_blocking > 0.0)
            .map(|o| Attenuator {
                footprint: o.footprint,
                blocking: o.properties.signal_blocking,
            })
            .collect();
    }

    /// Remove every signal. Lifetime counters are kept.
    pub fn clear_signals(&mut self) {
        self.signals.clear();
        self.grid.clear();
    }

    // -------------------------------------------------------------------
    // Emission
    // -------------------------------------------------------------------

    /// Emit a signal from `creature`'s current position.
    ///
    /// Unset request fields take the defaults for the signal type. Returns
    /// `None`, leaving the creature untouched, when its energy is below the
    /// emission cost. Otherwise the cost is debited, the signal stored, and
    /// the weakest, oldest signals evicted until the active count is back
    /// within the cap. The signal just emitted is never evicted by its own
    /// emission.
    pub fn emit_signal(
        &mut self,
        creature: &mut impl Creature,
        request: SignalRequest,
    ) -> Option<SignalId> {
        let defaults = signal::defaults_for(request.signal_type);
        let energy_cost = request.energy_cost.unwrap_or(defaults.energy_cost).max(0.0);
        if creature.energy() < energy_cost {
            self.stats.total_rejected = self.stats.total_rejected.saturating_add(1);
            debug!(
                creature_id = %creature.id(),
                signal_type = ?request.signal_type,
                energy = creature.energy(),
                energy_cost,
                "Signal emission rejected: insufficient energy"
            );
            return None;
        }
        creature.spend_energy(energy_cost);

        let source_position = creature.position();
        let sequence = self.next_sequence;
        self.next_sequence = self.next_sequence.saturating_add(1);
        let emitted_at = self.elapsed;
        let id = self.signals.insert_with_key(|id| Signal {
            id,
            signal_type: request.signal_type,
            strength: unit(request.strength),
            priority: request.priority.unwrap_or(defaults.priority),
            source_id: creature.id(),
            source_position,
            data: request.data,
            emitted_at,
            sequence,
            decay_rate: unit(request.decay_rate.unwrap_or(defaults.decay_rate)),
            energy_cost,
        });
        self.grid.insert(id, Footprint::Point(source_position));
        self.stats.total_emitted = self.stats.total_emitted.saturating_add(1);
        debug!(
            signal_id = ?id,
            creature_id = %creature.id(),
            signal_type = ?request.signal_type,
            "Signal emitted"
        );

        self.enforce_cap(id);
        Some(id)
    }

    /// Evict the signal with the lowest `strength * emitted_at` (oldest
    /// first on ties) until the active count fits the cap.
    fn enforce_cap(&mut self, keep: SignalId) {
        while self.signals.len() > self.config.max_active_signals {
            let victim = self
                .signals
                .iter()
                .filter(|(id, _)| *id != keep)
                .min_by(|(_, a), (_, b)| {
                    (a.strength * a.emitted_at)
                        .total_cmp(&(b.strength * b.emitted_at))
                        .then_with(|| a.sequence.cmp(&b.sequence))
                })
                .map(|(id, _)| id);
            let Some(victim) = victim else {
                break;
            };
            self.remove(victim);
            self.stats.total_evicted = self.stats.total_evicted.saturating_add(1);
            debug!(signal_id = ?victim, "Signal evicted: active cap reached");
        }
    }

    fn remove(&mut self, id: SignalId) {
        if self.signals.remove(id).is_some() {
            self.grid.remove(id);
        }
    }

    // -------------------------------------------------------------------
    // Time
    // -------------------------------------------------------------------

    /// Advance the registry by `delta_time`.
    ///
    /// Decays every signal by `(1 - decay_rate)` (when enabled), removes
    /// signals below the strength floor or past the age horizon, then
    /// drops empty grid cells. Returns how many signals expired.
    pub fn update(&mut self, delta_time: f64) -> usize {
        if delta_time.is_finite() && delta_time > 0.0 {
            self.elapsed += delta_time;
        }

        if self.config.signal_decay_enabled {
            for signal in self.signals.values_mut() {
                signal.strength *= 1.0 - signal.decay_rate;
            }
        }

        let now = self.elapsed;
        let min_strength = self.config.min_strength;
        let max_age = self.config.max_signal_age;
        let expired: Vec<SignalId> = self
            .signals
            .iter()
            .filter(|(_, s)| s.strength < min_strength || now - s.emitted_at > max_age)
            .map(|(id, _)| id)
            .collect();
        for &id in &expired {
            self.remove(id);
        }
        let count = expired.len();
        self.stats.total_expired = self
            .stats
            .total_expired
            .saturating_add(u64::try_from(count).unwrap_or(u64::MAX));

        let pruned = self.grid.maintain();
        debug!(expired = count, pruned, active = self.signals.len(), "Signal registry updated");
        count
    }

    // -------------------------------------------------------------------
    // Reception
    // -------------------------------------------------------------------

    /// Strength of `signal` as it arrives at `receiver`, before noise.
    pub fn calculate_signal_strength(&self, signal: &Signal, receiver: Vec2) -> f64 {
        let distance_sq = signal.source_position.distance_squared(receiver);
        let falloff = 1.0 / self.config.distance_falloff.mul_add(distance_sq, 1.0);
        let ambient = if self.config.environmental_attenuation {
            1.0 - self.environment.attenuation
        } else {
            1.0
        };
        let obstacles = self.obstacle_attenuation(signal.source_position, receiver);
        unit(signal.strength * falloff * ambient * obstacles)
    }

    /// Fraction of strength that survives the attenuating obstacles
    /// between `source` and `receiver`.
    pub fn obstacle_attenuation(&self, source: Vec2, receiver: Vec2) -> f64 {
        self.attenuators
            .iter()
            .filter(|a| geometry::segment_intersects_rect(source, receiver, &a.footprint))
            .map(|a| 1.0 - a.blocking)
            .product()
    }

    /// Confidence in a reception of `signal` at `received_strength`.
    #[allow(clippy::unused_self)]
    pub fn calculate_signal_confidence(&self, signal: &Signal, received_strength: f64) -> f64 {
        signal::signal_confidence(signal.priority, received_strength)
    }

    /// Every signal `creature` can perceive, strongest first.
    ///
    /// Own signals, signals beyond `max_range`, and receptions weaker than
    /// the reception threshold are left out. Noise is drawn from `rng` in
    /// signal-id order, so a given seed always yields the same receptions.
    pub fn get_signals_for_creature(
        &self,
        creature: &impl Creature,
        rng: &mut impl Rng,
    ) -> Vec<SignalReception> {
        let receiver = creature.position();
        let receiver_id = creature.id();
        let max_range = self.config.max_range;

        let candidates: Vec<SignalId> = if self.config.spatial_hashing {
            self.grid.query_radius(receiver, max_range)
        } else {
            let mut all: Vec<SignalId> = self.signals.keys().collect();
            all.sort_unstable();
            all
        };

        let noise = if self.config.environmental_attenuation {
            self.environment.noise_level
        } else {
            0.0
        };

        let mut receptions: Vec<SignalReception> = candidates
            .into_iter()
            .filter_map(|id| self.signals.get(id))
            .filter(|s| s.source_id != receiver_id)
            .filter_map(|s| {
                let distance = s.source_position.distance(receiver);
                if distance > max_range {
                    return None;
                }
                let mut received = self.calculate_signal_strength(s, receiver);
                if noise.is_finite() && noise > 0.0 {
                    received = unit(received + rng.random_range(-noise..=noise));
                }
                if received < self.config.reception_threshold {
                    return None;
                }
                Some(SignalReception {
                    signal_id: s.id,
                    signal_type: s.signal_type,
                    priority: s.priority,
                    source_id: s.source_id,
                    source_position: s.source_position,
                    received_strength: received,
                    confidence: self.calculate_signal_confidence(s, received),
                    distance,
                    direction: (s.source_position - receiver).normalized(),
                    data: s.data.clone(),
                })
            })
            .collect();

        receptions.sort_by(|a, b| {
            b.received_strength
                .total_cmp(&a.received_strength)
                .then_with(|| a.signal_id.cmp(&b.signal_id))
        });
        receptions
    }

    /// Interpret a reception for `creature`.
    #[allow(clippy::unused_self)]
    pub fn process_signal_reception(
        &self,
        creature: &impl Creature,
        reception: &SignalReception,
    ) -> SignalInterpretation {
        signal::interpret(creature, reception)
    }

    // -------------------------------------------------------------------
    // Statistics
    // -------------------------------------------------------------------

    /// Population snapshot and lifetime counters.
    pub fn stats(&self) -> SignalStats {
        let mut by_type: BTreeMap<SignalType, usize> = BTreeMap::new();
        let mut total_strength = 0.0;
        for signal in self.signals.values() {
            let count = by_type.entry(signal.signal_type).or_insert(0);
            *count = count.saturating_add(1);
            total_strength += signal.strength;
        }
        let active = self.signals.len();
        let mean_strength = u32::try_from(active)
            .ok()
            .filter(|&n| n > 0)
            .map_or(0.0, |n| total_strength / f64::from(n));

        SignalStats {
            active,
            by_type,
            mean_strength,
            ..self.stats.clone()
        }
    }
}

fn unit(value: f64) -> f64 {
    if value.is_nan() { 0.0 } else { value.clamp(0.0, 1.0) }
}
