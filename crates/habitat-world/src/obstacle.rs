//! Per-type obstacle defaults and the obstacle factory.
//!
//! Each [`ObstacleType`] maps to a baseline [`ObstacleProperties`] through
//! an exhaustive `match`. Callers layer [`ObstaclePropertyOverrides`] on
//! top when creating an obstacle.
//!
//! | Type            | Passable | Cost | Damage | Blocks signal | Transparency | Hiding |
//! |-----------------|----------|------|--------|---------------|--------------|--------|
//! | SolidBarrier    | no       | inf  | 0      | 0.8           | 0.0          | 0.3    |
//! | PartialBarrier  | yes      | 2.0  | 0      | 0.4           | 0.5          | 0.5    |
//! | Hazard          | yes      | 1.5  | 5      | 0.0           | (clear)      | 0.0    |
//! | Shelter         | yes      | 1.0  | 0      | 0.6           | 0.3          | 0.8    |
//! | ResourcePoint   | yes      | 1.2  | 0      | 0.1           | (clear)      | 0.2    |
//! | Water           | yes      | 3.0  | 0      | 0.2           | (clear)      | 0.1    |
//! | Cliff           | climb    | inf  | 10     | 0.5           | 0.2          | 0.1    |
//! | Cave            | yes      | 1.5  | 0      | 0.9           | 0.1          | 0.9    |
//! | Tree            | yes      | 1.3  | 0      | 0.3           | 0.6          | 0.6    |
//! | Rock            | climb    | inf  | 0      | 0.7           | 0.0          | 0.4    |

use habitat_types::{
    Obstacle, ObstacleId, ObstacleProperties, ObstaclePropertyOverrides, ObstacleType, Rect,
    ResourceProperties, StatusEffect, StatusEffectType, Vec2,
};

/// Baseline properties for an obstacle type.
#[allow(clippy::too_many_lines)]
pub fn default_properties(obstacle_type: ObstacleType) -> ObstacleProperties {
    let open = ObstacleProperties {
        passable: true,
        movement_cost: 1.0,
        damage: 0.0,
        damage_per_tick: 0.0,
        signal_blocking: 0.0,
        signal_reflection: 0.0,
        vision_blocking: false,
        transparency: 1.0,
        hiding_value: 0.0,
        climbable: false,
        climb_cost: 0.0,
        status_effects: Vec::new(),
        resources: None,
    };

    let props = match obstacle_type {
        ObstacleType::SolidBarrier => ObstacleProperties {
            passable: false,
            movement_cost: f64::INFINITY,
            signal_blocking: 0.8,
            signal_reflection: 0.3,
            vision_blocking: true,
            transparency: 0.0,
            hiding_value: 0.3,
            ..open
        },
        ObstacleType::PartialBarrier => ObstacleProperties {
            movement_cost: 2.0,
            signal_blocking: 0.4,
            signal_reflection: 0.1,
            vision_blocking: true,
            transparency: 0.5,
            hiding_value: 0.5,
            ..open
        },
        ObstacleType::Hazard => ObstacleProperties {
            movement_cost: 1.5,
            damage: 5.0,
            damage_per_tick: 1.0,
            status_effects: vec![StatusEffect::new(StatusEffectType::Poisoned, 0.5, 5, 0.3)],
            ..open
        },
        ObstacleType::Shelter => ObstacleProperties {
            signal_blocking: 0.6,
            signal_reflection: 0.2,
            vision_blocking: true,
            transparency: 0.3,
            hiding_value: 0.8,
            status_effects: vec![StatusEffect::new(StatusEffectType::Sheltered, 0.5, 10, 1.0)],
            ..open
        },
        ObstacleType::ResourcePoint => ObstacleProperties {
            movement_cost: 1.2,
            signal_blocking: 0.1,
            hiding_value: 0.2,
            resources: Some(ResourceProperties {
                generation_rate: 0.5,
                capacity: 100.0,
                harvest_amount: 10.0,
            }),
            ..open
        },
        ObstacleType::Water => ObstacleProperties {
            movement_cost: 3.0,
            signal_blocking: 0.2,
            signal_reflection: 0.4,
            hiding_value: 0.1,
            status_effects: vec![StatusEffect::new(StatusEffectType::Wet, 0.3, 3, 0.8)],
            ..open
        },
        ObstacleType::Cliff => ObstacleProperties {
            passable: false,
            movement_cost: f64::INFINITY,
            damage: 10.0,
            signal_blocking: 0.5,
            signal_reflection: 0.5,
            vision_blocking: true,
            transparency: 0.2,
            hiding_value: 0.1,
            climbable: true,
            climb_cost: 5.0,
            ..open
        },
        ObstacleType::Cave => ObstacleProperties {
            movement_cost: 1.5,
            signal_blocking: 0.9,
            signal_reflection: 0.6,
            vision_blocking: true,
            transparency: 0.1,
            hiding_value: 0.9,
            status_effects: vec![
                StatusEffect::new(StatusEffectType::Sheltered, 0.8, 10, 1.0),
                StatusEffect::new(StatusEffectType::Concealed, 0.7, 5, 0.5),
            ],
            ..open
        },
        ObstacleType::Tree => ObstacleProperties {
            movement_cost: 1.3,
            signal_blocking: 0.3,
            signal_reflection: 0.1,
            vision_blocking: true,
            transparency: 0.6,
            hiding_value: 0.6,
            climbable: true,
            climb_cost: 2.0,
            resources: Some(ResourceProperties {
                generation_rate: 0.1,
                capacity: 20.0,
                harvest_amount: 2.0,
            }),
            ..open
        },
        ObstacleType::Rock => ObstacleProperties {
            passable: false,
            movement_cost: f64::INFINITY,
            signal_blocking: 0.7,
            signal_reflection: 0.4,
            vision_blocking: true,
            transparency: 0.0,
            hiding_value: 0.4,
            climbable: true,
            climb_cost: 3.0,
            ..open
        },
    };

    props.normalized()
}

/// Assemble an obstacle record from its type, footprint, and overrides.
///
/// Resource-yielding obstacles start full.
pub fn build_obstacle(
    id: ObstacleId,
    obstacle_type: ObstacleType,
    position: Vec2,
    dimensions: Vec2,
    overrides: &ObstaclePropertyOverrides,
) -> Obstacle {
    let properties = overrides.apply(default_properties(obstacle_type));
    from_properties(id, obstacle_type, Rect::new(position, dimensions), properties)
}

/// Assemble an obstacle record from fully specified properties.
pub fn from_properties(
    id: ObstacleId,
    obstacle_type: ObstacleType,
    footprint: Rect,
    properties: ObstacleProperties,
) -> Obstacle {
    let properties = properties.normalized();
    let resources_remaining = properties.resources.map(|r| r.capacity);
    Obstacle {
        id,
        obstacle_type,
        footprint,
        properties,
        resources_remaining,
    }
}

/// Danger of touching an obstacle, in `[0, 1]`.
///
/// One-shot damage saturates at 20, per-tick damage at 10; each harmful
/// status effect adds its magnitude weighted by its trigger probability.
pub fn danger_level(properties: &ObstacleProperties) -> f64 {
    let effects: f64 = properties
        .status_effects
        .iter()
        .filter(|e| e.effect_type.is_harmful())
        .map(|e| e.magnitude * e.probability)
        .sum();
    (properties.damage / 20.0 + properties.damage_per_tick / 10.0 + effects).clamp(0.0, 1.0)
}

/// How inviting an obstacle is to approach, in `[0, 1]`.
///
/// Impassable obstacles lose half their appeal (less if climbable),
/// damage and high movement cost erode the rest.
pub fn approachability(properties: &ObstacleProperties) -> f64 {
    let mut score = 1.0;
    if !properties.passable {
        score -= if properties.climbable { 0.3 } else { 0.5 };
    }
    score -= (properties.damage / 20.0).min(0.4);
    if properties.movement_cost.is_finite() {
        score -= ((properties.movement_cost - 1.0) / 10.0).min(0.3);
    }
    f64::clamp(score, 0.0, 1.0)
}
