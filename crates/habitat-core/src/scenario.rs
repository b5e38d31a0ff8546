//! Scenario files: a hand-authored starting world.
//!
//! A scenario lists the obstacles to place and the creatures to spawn.
//! Obstacles take their type's default properties, optionally overridden
//! field by field. Creatures take the configured starting energy unless
//! the scenario gives one.
//!
//! ```yaml
//! obstacles:
//!   - type: solid_barrier
//!     position: { x: 10.0, y: -5.0 }
//!     dimensions: { x: 1.0, y: 10.0 }
//!   - type: hazard
//!     position: { x: 20.0, y: 0.0 }
//!     dimensions: { x: 3.0, y: 3.0 }
//!     overrides:
//!       damage: 12.0
//! creatures:
//!   - position: { x: 0.0, y: 0.0 }
//!     energy: 80.0
//!     age: 150
//! ```

use std::path::Path;

use habitat_types::{ObstaclePropertyOverrides, ObstacleType, Vec2};
use serde::Deserialize;

/// Errors that can occur when loading a scenario.
#[derive(Debug, thiserror::Error)]
pub enum ScenarioError {
    /// Failed to read the scenario file from disk.
    #[error("failed to read scenario file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse scenario YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// An entry is out of range.
    #[error("invalid scenario entry: {reason}")]
    Invalid {
        /// Explanation of what is wrong with the entry.
        reason: String,
    },
}

impl From<serde_yml::Error> for ScenarioError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// An obstacle to place.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ObstacleSpec {
    /// Terrain kind.
    #[serde(rename = "type")]
    pub obstacle_type: ObstacleType,
    /// Minimum corner of the footprint.
    pub position: Vec2,
    /// Width and height of the footprint.
    pub dimensions: Vec2,
    /// Per-field replacements for the type defaults.
    #[serde(default)]
    pub overrides: ObstaclePropertyOverrides,
}

/// A creature to spawn.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct CreatureSpec {
    /// Spawn position.
    pub position: Vec2,
    /// Starting energy; the configured default when absent.
    #[serde(default)]
    pub energy: Option<f64>,
    /// Starting age in ticks.
    #[serde(default)]
    pub age: u64,
}

/// A complete starting world.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Scenario {
    /// Obstacles, placed in order.
    #[serde(default)]
    pub obstacles: Vec<ObstacleSpec>,
    /// Creatures, spawned in order.
    #[serde(default)]
    pub creatures: Vec<CreatureSpec>,
}

impl Scenario {
    /// Load and validate a scenario from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioError::Io`] if the file cannot be read,
    /// [`ScenarioError::Yaml`] if it is not a valid scenario, or
    /// [`ScenarioError::Invalid`] if an entry is out of range.
    pub fn from_file(path: &Path) -> Result<Self, ScenarioError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse and validate a scenario from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioError::Yaml`] if the string is not a valid
    /// scenario, or [`ScenarioError::Invalid`] if an entry is out of range.
    pub fn parse(yaml: &str) -> Result<Self, ScenarioError> {
        let scenario: Self = serde_yml::from_str(yaml)?;
        scenario.validate()?;
        Ok(scenario)
    }

    /// Reject entries the registries cannot store meaningfully.
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioError::Invalid`] naming the first bad entry.
    pub fn validate(&self) -> Result<(), ScenarioError> {
        for (index, spec) in self.obstacles.iter().enumerate() {
            if !spec.position.is_finite() || !spec.dimensions.is_finite() {
                return Err(ScenarioError::Invalid {
                    reason: format!("obstacle {index} has a non-finite position or size"),
                });
            }
        }
        for (index, spec) in self.creatures.iter().enumerate() {
            if !spec.position.is_finite() {
                return Err(ScenarioError::Invalid {
                    reason: format!("creature {index} has a non-finite position"),
                });
            }
            if spec.energy.is_some_and(|e| !e.is_finite() || e <= 0.0) {
                return Err(ScenarioError::Invalid {
                    reason: format!("creature {index} must start with positive energy"),
                });
            }
        }
        Ok(())
    }
}
