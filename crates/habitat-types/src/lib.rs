//! Shared type definitions for the Habitat creature simulation.
//!
//! This crate is the single source of truth for the values exchanged
//! between the spatial engine (`habitat-world`) and the simulation layer
//! (`habitat-core`).
//!
//! # Modules
//!
//! - [`ids`] -- Creature UUIDs and generational obstacle/signal handles
//! - [`geometry`] -- [`Vec2`] points and axis-aligned [`Rect`] footprints
//! - [`enums`] -- Obstacle, status-effect, signal, and response enumerations
//! - [`structs`] -- Obstacle and signal records plus their parameters
//! - [`queries`] -- Records returned by interaction, sight, path, and
//!   reception queries

pub mod enums;
pub mod geometry;
pub mod ids;
pub mod queries;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{ObstacleType, SignalPriority, SignalResponse, SignalType, StatusEffectType};
pub use geometry::{Rect, Vec2};
pub use ids::{CreatureId, ObstacleId, SignalId};
pub use queries::{
    InteractionResult, LineOfSight, ObstacleDetection, PathNode, SignalInterpretation,
    SignalReception, TerrainCost,
};
pub use structs::{
    Obstacle, ObstacleProperties, ObstaclePropertyOverrides, ResourceProperties, Signal,
    SignalEnvironment, SignalRequest, StatusEffect,
};
