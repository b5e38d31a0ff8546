//! Spatial environment engine for the Habitat creature simulation.
//!
//! Two registries share one spatial-hash algorithm (but not one grid):
//!
//! - [`ObstacleRegistry`] owns static terrain features and answers
//!   movement, sight, pathfinding, and detection queries.
//! - [`SignalRegistry`] owns transient creature signals and answers
//!   reception queries, attenuating strength by distance, environment, and
//!   the obstacles injected through [`SignalRegistry::set_obstacles`].
//!
//! Creatures are consumed through the [`Creature`] trait. Every random
//! draw (status-effect rolls, reception noise) comes from an `Rng` passed
//! in by the caller, so a seeded generator reproduces a run exactly.
//!
//! # Modules
//!
//! - [`spatial`] -- Cell-bucketed index with caller-maintained cell summaries
//! - [`geometry`] -- Segment and rectangle intersection tests
//! - [`obstacle`] -- Per-type obstacle defaults and assessments
//! - [`obstacle_registry`] -- Obstacle storage and terrain queries
//! - [`pathfinding`] -- Bounded 8-connected A* search
//! - [`signal`] -- Per-type signal defaults and interpretation
//! - [`signal_registry`] -- Signal storage, decay, and reception
//! - [`config`] -- Registry configuration
//! - [`creature`] -- The creature collaborator trait
//! - [`error`] -- Construction errors

pub mod config;
pub mod creature;
pub mod error;
pub mod geometry;
pub mod obstacle;
pub mod obstacle_registry;
pub mod pathfinding;
pub mod signal;
pub mod signal_registry;
pub mod spatial;

pub use config::{ObstacleConfig, SignalConfig};
pub use creature::Creature;
pub use error::WorldError;
pub use obstacle_registry::{CellTerrain, ObstacleRegistry};
pub use signal_registry::{SignalRegistry, SignalStats};
pub use spatial::{CellKey, Footprint, SpatialHashGrid};
