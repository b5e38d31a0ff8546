//! Closed enumerations shared by the obstacle and signal systems.
//!
//! Every per-type default (obstacle properties, signal priority, decay
//! rate, energy cost) is derived by exhaustive `match` over these enums in
//! `habitat-world`, so adding a variant is a compile error until every
//! table handles it.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Obstacles
// ---------------------------------------------------------------------------

/// The terrain or feature kind of an obstacle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObstacleType {
    /// Impassable wall that also blocks sight and most signals.
    SolidBarrier,
    /// Fence or thicket: passable at a cost, partially see-through.
    PartialBarrier,
    /// Damaging ground (thorns, toxic pools).
    Hazard,
    /// Covered area offering protection and concealment.
    Shelter,
    /// Regenerating source of food or material.
    ResourcePoint,
    /// Shallow water: slow to cross, soaks creatures.
    Water,
    /// Sheer drop: impassable unless climbed, harmful on contact.
    Cliff,
    /// Enclosed space: excellent cover, muffles signals.
    Cave,
    /// Single tree: climbable, provides cover and some fruit.
    Tree,
    /// Boulder: impassable but climbable.
    Rock,
}

impl ObstacleType {
    /// All obstacle types in declaration order.
    pub const ALL: [Self; 10] = [
        Self::SolidBarrier,
        Self::PartialBarrier,
        Self::Hazard,
        Self::Shelter,
        Self::ResourcePoint,
        Self::Water,
        Self::Cliff,
        Self::Cave,
        Self::Tree,
        Self::Rock,
    ];
}

/// A condition an obstacle can inflict on a creature in contact with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusEffectType {
    /// Loses energy every tick while active.
    Poisoned,
    /// Loses energy quickly every tick while active.
    Burning,
    /// Movement costs are raised while active.
    Slowed,
    /// Soaked; harmless on its own.
    Wet,
    /// Protected from weather and predators.
    Sheltered,
    /// Harder to detect by other creatures.
    Concealed,
    /// Gains energy every tick while active.
    Regenerating,
}

impl StatusEffectType {
    /// Whether the effect harms the creature it is applied to.
    pub const fn is_harmful(self) -> bool {
        match self {
            Self::Poisoned | Self::Burning | Self::Slowed => true,
            Self::Wet | Self::Sheltered | Self::Concealed | Self::Regenerating => false,
        }
    }
}

// ---------------------------------------------------------------------------
// Signals
// ---------------------------------------------------------------------------

/// The semantic category of a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalType {
    /// Generic alarm: something is wrong nearby.
    Warning,
    /// A threat is actively approaching.
    DangerApproach,
    /// The sender found food at its position.
    FoodLocation,
    /// Courtship call.
    MatingCall,
    /// The sender claims the surrounding area.
    TerritoryClaim,
    /// Request for the group to gather at the sender.
    GroupAssembly,
    /// The sender needs assistance.
    HelpRequest,
    /// The threat has passed.
    AllClear,
}

impl SignalType {
    /// All signal types in declaration order.
    pub const ALL: [Self; 8] = [
        Self::Warning,
        Self::DangerApproach,
        Self::FoodLocation,
        Self::MatingCall,
        Self::TerritoryClaim,
        Self::GroupAssembly,
        Self::HelpRequest,
        Self::AllClear,
    ];
}

/// Urgency attached to a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalPriority {
    /// Background chatter.
    Low,
    /// Ordinary message.
    Normal,
    /// Should be acted on soon.
    High,
    /// Must be acted on immediately.
    Critical,
}

impl SignalPriority {
    /// Multiplier applied to received strength when scoring confidence.
    pub const fn confidence_factor(self) -> f64 {
        match self {
            Self::Low => 0.9,
            Self::Normal => 1.0,
            Self::High => 1.1,
            Self::Critical => 1.2,
        }
    }
}

/// The behavioural response a receiver derives from a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalResponse {
    /// Become vigilant without moving.
    Alert,
    /// Move away from the source.
    Flee,
    /// Move toward the source.
    Approach,
    /// Keep clear of the source's area.
    Avoid,
    /// Move toward the source to help.
    Assist,
    /// Court the sender.
    Court,
    /// Stand down from alert.
    Relax,
}
