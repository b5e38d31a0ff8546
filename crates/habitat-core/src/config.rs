//! Configuration loading and typed config structures for the Habitat simulation.
//!
//! The canonical configuration lives in `habitat-config.yaml` at the project
//! root. Each section maps onto one struct; the `obstacles` and `signals`
//! sections deserialize straight into the registry configs owned by
//! `habitat-world`. Every field has a named default so an empty file is a
//! complete configuration.

use std::path::Path;

use habitat_types::SignalEnvironment;
use habitat_world::{ObstacleConfig, SignalConfig};
use serde::Deserialize;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level simulation configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SimulationConfig {
    /// Run identity, seed, and tick pacing.
    #[serde(default)]
    pub world: WorldConfig,

    /// Initial population used when no scenario file is given.
    #[serde(default)]
    pub creatures: CreatureConfig,

    /// Obstacle registry settings.
    #[serde(default)]
    pub obstacles: ObstacleConfig,

    /// Signal registry settings.
    #[serde(default)]
    pub signals: SignalConfig,

    /// Initial ambient signal conditions.
    #[serde(default)]
    pub environment: EnvironmentConfig,

    /// Log output settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl SimulationConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yml::from_str(yaml)?)
    }
}

/// World-level configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WorldConfig {
    /// Human-readable simulation name.
    #[serde(default = "default_world_name")]
    pub name: String,

    /// Seed for the single random generator shared by every subsystem.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Simulated time that passes per tick.
    #[serde(default = "default_tick_delta")]
    pub tick_delta: f64,

    /// Number of ticks the engine runs before stopping (0 = unlimited).
    #[serde(default = "default_max_ticks")]
    pub max_ticks: u64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            name: default_world_name(),
            seed: default_seed(),
            tick_delta: default_tick_delta(),
            max_ticks: default_max_ticks(),
        }
    }
}

/// Creature population and movement parameters.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CreatureConfig {
    /// Creatures spawned at random positions when no scenario is loaded.
    #[serde(default = "default_initial_count")]
    pub initial_count: u32,

    /// Creatures spawn uniformly within this distance of the origin.
    #[serde(default = "default_spawn_radius")]
    pub spawn_radius: f64,

    /// Energy every spawned creature starts with.
    #[serde(default = "default_starting_energy")]
    pub starting_energy: f64,

    /// Distance covered by one movement step.
    #[serde(default = "default_step_length")]
    pub step_length: f64,

    /// Radius within which obstacles are perceived.
    #[serde(default = "default_perception_range")]
    pub perception_range: f64,

    /// Energy restored by resting for one tick.
    #[serde(default = "default_rest_recovery")]
    pub rest_recovery: f64,

    /// Energy spent per world unit walked, scaled by the terrain's
    /// movement cost.
    #[serde(default = "default_move_energy_per_unit")]
    pub move_energy_per_unit: f64,
}

impl Default for CreatureConfig {
    fn default() -> Self {
        Self {
            initial_count: default_initial_count(),
            spawn_radius: default_spawn_radius(),
            starting_energy: default_starting_energy(),
            step_length: default_step_length(),
            perception_range: default_perception_range(),
            rest_recovery: default_rest_recovery(),
            move_energy_per_unit: default_move_energy_per_unit(),
        }
    }
}

/// Initial ambient signal conditions.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct EnvironmentConfig {
    /// Fraction of signal strength lost to the medium (0-1).
    #[serde(default = "default_attenuation")]
    pub attenuation: f64,

    /// Amplitude of the uniform noise added at reception (0-1).
    #[serde(default = "default_noise_level")]
    pub noise_level: f64,
}

impl EnvironmentConfig {
    /// The clamped [`SignalEnvironment`] these settings describe.
    pub fn signal_environment(self) -> SignalEnvironment {
        SignalEnvironment::new(self.attenuation, self.noise_level)
    }
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            attenuation: default_attenuation(),
            noise_level: default_noise_level(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error), used when `RUST_LOG`
    /// is unset.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions (serde default requires named functions)
// ---------------------------------------------------------------------------

fn default_world_name() -> String {
    "Meadow".to_owned()
}

const fn default_seed() -> u64 {
    42
}

const fn default_tick_delta() -> f64 {
    1.0
}

const fn default_max_ticks() -> u64 {
    100
}

const fn default_initial_count() -> u32 {
    12
}

const fn default_spawn_radius() -> f64 {
    40.0
}

const fn default_starting_energy() -> f64 {
    100.0
}

const fn default_step_length() -> f64 {
    1.0
}

const fn default_perception_range() -> f64 {
    15.0
}

const fn default_rest_recovery() -> f64 {
    0.5
}

const fn default_move_energy_per_unit() -> f64 {
    0.1
}

const fn default_attenuation() -> f64 {
    0.1
}

const fn default_noise_level() -> f64 {
    0.05
}

fn default_log_level() -> String {
    "info".to_owned()
}
