//! Per-type signal defaults and the reception policy.
//!
//! Everything here is a pure function of the signal type, the received
//! strength, and a little receiver state. The dispatch is an exhaustive
//! `match` per [`SignalType`], so a new type cannot be added without
//! deciding its defaults and its interpretation.

use habitat_types::{
    SignalInterpretation, SignalPriority, SignalReception, SignalResponse, SignalType,
};

use crate::creature::Creature;

/// Minimum receiver energy for a mating call to be understood.
pub const MATING_MIN_ENERGY: f64 = 50.0;

/// Minimum receiver age in ticks for a mating call to be understood.
pub const MATING_MIN_AGE: u64 = 100;

/// Emission parameters used when a request leaves them unset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalDefaults {
    /// Urgency.
    pub priority: SignalPriority,
    /// Fraction of strength lost per tick.
    pub decay_rate: f64,
    /// Energy charged to the emitter.
    pub energy_cost: f64,
}

/// Default emission parameters for a signal type.
pub const fn defaults_for(signal_type: SignalType) -> SignalDefaults {
    let (priority, decay_rate, energy_cost) = match signal_type {
        SignalType::Warning => (SignalPriority::High, 0.1, 2.0),
        SignalType::DangerApproach => (SignalPriority::Critical, 0.15, 3.0),
        SignalType::FoodLocation => (SignalPriority::Normal, 0.05, 1.5),
        SignalType::MatingCall => (SignalPriority::Normal, 0.08, 2.5),
        SignalType::TerritoryClaim => (SignalPriority::Normal, 0.02, 2.0),
        SignalType::GroupAssembly => (SignalPriority::High, 0.05, 2.0),
        SignalType::HelpRequest => (SignalPriority::High, 0.1, 3.0),
        SignalType::AllClear => (SignalPriority::Low, 0.1, 1.0),
    };
    SignalDefaults {
        priority,
        decay_rate,
        energy_cost,
    }
}

/// Confidence in a reception: the received strength scaled by the
/// priority factor, clamped into `[0, 1]`.
pub fn signal_confidence(priority: SignalPriority, received_strength: f64) -> f64 {
    let confidence = received_strength * priority.confidence_factor();
    if confidence.is_nan() {
        0.0
    } else {
        confidence.clamp(0.0, 1.0)
    }
}

/// Interpret a reception for `receiver`.
///
/// The action influence is the type's signed weight times the reception's
/// confidence: warnings and danger repel, food and assembly attract.
/// Mating calls are only understood by receivers with enough energy and
/// age.
pub fn interpret(receiver: &impl Creature, reception: &SignalReception) -> SignalInterpretation {
    let (response, weight, memory_importance) = match reception.signal_type {
        SignalType::Warning => (SignalResponse::Alert, -0.5, 0.6),
        SignalType::DangerApproach => (SignalResponse::Flee, -1.0, 0.9),
        SignalType::FoodLocation => (SignalResponse::Approach, 0.7, 0.7),
        SignalType::MatingCall => {
            if receiver.energy() < MATING_MIN_ENERGY || receiver.age() < MATING_MIN_AGE {
                return SignalInterpretation::IGNORED;
            }
            (SignalResponse::Court, 0.6, 0.5)
        }
        SignalType::TerritoryClaim => (SignalResponse::Avoid, -0.3, 0.4),
        SignalType::GroupAssembly => (SignalResponse::Approach, 0.5, 0.5),
        SignalType::HelpRequest => (SignalResponse::Assist, 0.4, 0.6),
        SignalType::AllClear => (SignalResponse::Relax, 0.2, 0.2),
    };

    SignalInterpretation {
        understood: true,
        response: Some(response),
        action_influence: (weight * reception.confidence).clamp(-1.0, 1.0),
        memory_importance,
    }
}

#[cfg(test)]
mod tests {
    use habitat_types::{CreatureId, SignalId, Vec2};

    use super::*;
    use crate::creature::fixture::TestCreature;

    fn reception(signal_type: SignalType, confidence: f64) -> SignalReception {
        SignalReception {
            signal_id: SignalId::default(),
            signal_type,
            priority: defaults_for(signal_type).priority,
            source_id: CreatureId::from_u64_pair(0, 99),
            source_position: Vec2::ZERO,
            received_strength: confidence,
            confidence,
            distance: 1.0,
            direction: Vec2::new(-1.0, 0.0),
            data: None,
        }
    }

    #[test]
    fn every_type_has_positive_cost_and_decay() {
        for signal_type in SignalType::ALL {
            let d = defaults_for(signal_type);
            assert!(d.energy_cost > 0.0);
            assert!(d.decay_rate > 0.0 && d.decay_rate < 1.0);
        }
    }

    #[test]
    fn confidence_scales_by_priority_and_clamps() {
        assert!((signal_confidence(SignalPriority::Normal, 0.5) - 0.5).abs() < 1e-12);
        assert!((signal_confidence(SignalPriority::Low, 0.5) - 0.45).abs() < 1e-12);
        assert!((signal_confidence(SignalPriority::Critical, 0.5) - 0.6).abs() < 1e-12);
        assert!((signal_confidence(SignalPriority::Critical, 0.95) - 1.0).abs() < f64::EPSILON);
        assert!(signal_confidence(SignalPriority::High, f64::NAN).abs() < f64::EPSILON);
    }

    #[test]
    fn danger_repels_and_food_attracts() {
        let critter = TestCreature::at(0.0, 0.0);
        let danger = interpret(&critter, &reception(SignalType::DangerApproach, 0.8));
        assert_eq!(danger.response, Some(SignalResponse::Flee));
        assert!((danger.action_influence + 0.8).abs() < 1e-12);

        let food = interpret(&critter, &reception(SignalType::FoodLocation, 0.5));
        assert_eq!(food.response, Some(SignalResponse::Approach));
        assert!(food.action_influence > 0.0);
    }

    #[test]
    fn mating_call_requires_maturity() {
        let young = TestCreature::at(0.0, 0.0).with_age(10);
        let tired = TestCreature::at(0.0, 0.0).with_energy(20.0);
        let ready = TestCreature::at(0.0, 0.0).with_energy(80.0).with_age(150);
        let call = reception(SignalType::MatingCall, 0.7);
        assert_eq!(interpret(&young, &call), SignalInterpretation::IGNORED);
        assert_eq!(interpret(&tired, &call), SignalInterpretation::IGNORED);
        let understood = interpret(&ready, &call);
        assert!(understood.understood);
        assert_eq!(understood.response, Some(SignalResponse::Court));
    }

    #[test]
    fn every_type_except_mating_is_understood() {
        let young = TestCreature::at(0.0, 0.0).with_age(0);
        for signal_type in SignalType::ALL {
            let result = interpret(&young, &reception(signal_type, 0.5));
            assert_eq!(result.understood, signal_type != SignalType::MatingCall);
            assert!((-1.0..=1.0).contains(&result.action_influence));
        }
    }
}
