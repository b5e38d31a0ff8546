//! Result records returned by obstacle and signal queries.
//!
//! These are the values creatures consume when deciding how to move and
//! how to react to what they hear. None of them hold references into the
//! registries that produced them.

use serde::{Deserialize, Serialize};

use crate::enums::{ObstacleType, SignalPriority, SignalResponse, SignalType};
use crate::geometry::Vec2;
use crate::ids::{CreatureId, ObstacleId, SignalId};
use crate::structs::StatusEffect;

// ---------------------------------------------------------------------------
// Obstacle interaction
// ---------------------------------------------------------------------------

/// Combined effect of every obstacle occupying a target position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionResult {
    /// Any occupant is impassable.
    pub blocked: bool,
    /// Every blocking occupant is climbable (false when nothing blocks).
    pub climbable: bool,
    /// Highest climb cost among blocking occupants.
    pub climb_cost: f64,
    /// Highest movement-cost multiplier among occupants (1 when empty).
    pub movement_cost: f64,
    /// Sum of one-shot contact damage.
    pub damage: f64,
    /// Sum of per-tick contact damage.
    pub damage_per_tick: f64,
    /// Effects whose trigger roll succeeded.
    pub status_effects: Vec<StatusEffect>,
    /// Highest signal-blocking coefficient among occupants.
    pub signal_attenuation: f64,
    /// Any occupant blocks vision.
    pub vision_blocked: bool,
    /// Resource units granted by resource-yielding occupants.
    pub resources_gained: f64,
    /// Highest hiding value among occupants.
    pub hiding_bonus: f64,
}

impl Default for InteractionResult {
    fn default() -> Self {
        Self {
            blocked: false,
            climbable: false,
            climb_cost: 0.0,
            movement_cost: 1.0,
            damage: 0.0,
            damage_per_tick: 0.0,
            status_effects: Vec::new(),
            signal_attenuation: 0.0,
            vision_blocked: false,
            resources_gained: 0.0,
            hiding_bonus: 0.0,
        }
    }
}

/// Side-effect-free movement cost at a position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TerrainCost {
    /// Any occupant is impassable.
    pub blocked: bool,
    /// Highest movement-cost multiplier among occupants.
    pub movement_cost: f64,
}

impl TerrainCost {
    /// Open ground.
    pub const OPEN: Self = Self {
        blocked: false,
        movement_cost: 1.0,
    };
}

/// Result of a line-of-sight test between two points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineOfSight {
    /// Whether enough light gets through (`transparency > 0.1`).
    pub visible: bool,
    /// Vision-blocking obstacles crossed by the segment, in id order.
    pub blocked_by: Vec<ObstacleId>,
    /// Product of the transparencies of the crossed obstacles.
    pub transparency: f64,
    /// Length of the segment.
    pub distance: f64,
}

/// Step of a path returned by A* search.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PathNode {
    /// World position of the step.
    pub position: Vec2,
    /// Accumulated cost from the start.
    pub g_cost: f64,
    /// Straight-line distance to the goal.
    pub h_cost: f64,
    /// `g_cost + h_cost`.
    pub f_cost: f64,
    /// Movement-cost multiplier at this position.
    pub movement_cost: f64,
}

/// An obstacle noticed by a creature, with a behavioural assessment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObstacleDetection {
    /// The obstacle noticed.
    pub obstacle_id: ObstacleId,
    /// Its terrain kind.
    pub obstacle_type: ObstacleType,
    /// Distance from the creature to the nearest point of the footprint.
    pub distance: f64,
    /// Unit vector from the creature toward the nearest point.
    pub direction: Vec2,
    /// How inviting the obstacle is to approach (0-1).
    pub approachability: f64,
    /// How dangerous contact would be (0-1).
    pub danger_level: f64,
    /// Concealment offered inside the footprint (0-1).
    pub hiding_value: f64,
}

// ---------------------------------------------------------------------------
// Signal reception
// ---------------------------------------------------------------------------

/// A signal as perceived by one receiver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalReception {
    /// The signal received.
    pub signal_id: SignalId,
    /// Semantic category.
    pub signal_type: SignalType,
    /// Urgency.
    pub priority: SignalPriority,
    /// Who sent it.
    pub source_id: CreatureId,
    /// Where it was sent from.
    pub source_position: Vec2,
    /// Strength at the receiver after attenuation and noise, in `[0, 1]`.
    pub received_strength: f64,
    /// Receiver's confidence in the message, in `[0, 1]`.
    pub confidence: f64,
    /// Distance between source and receiver.
    pub distance: f64,
    /// Unit vector from the receiver toward the source.
    pub direction: Vec2,
    /// Payload carried by the signal.
    pub data: Option<serde_json::Value>,
}

/// The receiver's interpretation of a [`SignalReception`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignalInterpretation {
    /// Whether the receiver can act on the signal.
    pub understood: bool,
    /// Suggested response, when understood.
    pub response: Option<SignalResponse>,
    /// Signed push on behaviour in `[-1, 1]`: negative repels, positive attracts.
    pub action_influence: f64,
    /// How strongly the event should be remembered (0-1).
    pub memory_importance: f64,
}

impl SignalInterpretation {
    /// A signal the receiver cannot act on.
    pub const IGNORED: Self = Self {
        understood: false,
        response: None,
        action_influence: 0.0,
        memory_importance: 0.0,
    };
}
