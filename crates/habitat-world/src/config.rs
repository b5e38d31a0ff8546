//! Construction-time configuration for the obstacle and signal registries.
//!
//! Both structs deserialize from the `obstacles` and `signals` sections of
//! `habitat-config.yaml`. Every field has a named default so partial
//! sections parse.

use serde::{Deserialize, Serialize};

use crate::error::WorldError;

/// Configuration for [`ObstacleRegistry`](crate::ObstacleRegistry).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObstacleConfig {
    /// Whether impassable obstacles report `blocked`.
    #[serde(default = "default_true")]
    pub collision_detection: bool,

    /// Whether obstacles absorb signals.
    #[serde(default = "default_true")]
    pub signal_attenuation: bool,

    /// Whether obstacles occlude vision.
    #[serde(default = "default_true")]
    pub vision_blocking: bool,

    /// Whether contact rolls status effects.
    #[serde(default = "default_true")]
    pub status_effects: bool,

    /// Whether resource obstacles regenerate on `update`.
    #[serde(default = "default_true")]
    pub resource_generation: bool,

    /// Soft cap on stored obstacles; exceeding it only logs a warning.
    #[serde(default = "default_max_obstacles")]
    pub max_obstacles: usize,

    /// Use the spatial hash for lookups instead of linear scans.
    #[serde(default = "default_true")]
    pub spatial_hashing: bool,

    /// Spatial hash cell size in world units.
    #[serde(default = "default_obstacle_grid_size")]
    pub grid_size: f64,

    /// Maximum node expansions for one A* search.
    #[serde(default = "default_max_path_expansions")]
    pub max_path_expansions: usize,

    /// Whether A* evaluates steps with the full interaction check, which
    /// rolls effects and harvests resources along the frontier. When false
    /// it uses the read-only cost lookup.
    #[serde(default = "default_true")]
    pub pathfinding_consumes_resources: bool,
}

impl ObstacleConfig {
    /// Check that the spatial index can be built from this configuration.
    pub fn validate(&self) -> Result<(), WorldError> {
        validate_grid_size(self.grid_size)?;
        if self.max_path_expansions == 0 {
            return Err(WorldError::InvalidConfig {
                reason: "max_path_expansions must be at least 1".to_owned(),
            });
        }
        Ok(())
    }
}

impl Default for ObstacleConfig {
    fn default() -> Self {
        Self {
            collision_detection: true,
            signal_attenuation: true,
            vision_blocking: true,
            status_effects: true,
            resource_generation: true,
            max_obstacles: default_max_obstacles(),
            spatial_hashing: true,
            grid_size: default_obstacle_grid_size(),
            max_path_expansions: default_max_path_expansions(),
            pathfinding_consumes_resources: true,
        }
    }
}

/// Configuration for [`SignalRegistry`](crate::SignalRegistry).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalConfig {
    /// Hard cap on active signals; the weakest and oldest are evicted.
    #[serde(default = "default_max_active_signals")]
    pub max_active_signals: usize,

    /// Whether strength decays on `update`.
    #[serde(default = "default_true")]
    pub signal_decay_enabled: bool,

    /// Use the spatial hash for reception queries instead of a full scan.
    #[serde(default = "default_true")]
    pub spatial_hashing: bool,

    /// Spatial hash cell size in world units.
    #[serde(default = "default_signal_grid_size")]
    pub grid_size: f64,

    /// Maximum distance at which a signal can be received.
    #[serde(default = "default_max_range")]
    pub max_range: f64,

    /// Whether the ambient environment attenuates and perturbs signals.
    #[serde(default = "default_true")]
    pub environmental_attenuation: bool,

    /// Distance falloff constant `k` in `1 / (1 + k * d^2)`.
    #[serde(default = "default_distance_falloff")]
    pub distance_falloff: f64,

    /// Age in time units after which a signal expires.
    #[serde(default = "default_max_signal_age")]
    pub max_signal_age: f64,

    /// Strength below which a signal is removed.
    #[serde(default = "default_min_strength")]
    pub min_strength: f64,

    /// Received strength below which a reception is discarded.
    #[serde(default = "default_reception_threshold")]
    pub reception_threshold: f64,
}

impl SignalConfig {
    /// Check that the registry can be built from this configuration.
    pub fn validate(&self) -> Result<(), WorldError> {
        validate_grid_size(self.grid_size)?;
        if self.max_active_signals == 0 {
            return Err(WorldError::InvalidConfig {
                reason: "max_active_signals must be at least 1".to_owned(),
            });
        }
        if self.max_range.is_nan() || self.max_range < 0.0 {
            return Err(WorldError::InvalidConfig {
                reason: format!("max_range must be non-negative, got {}", self.max_range),
            });
        }
        if !self.distance_falloff.is_finite() || self.distance_falloff < 0.0 {
            return Err(WorldError::InvalidConfig {
                reason: format!(
                    "distance_falloff must be finite and non-negative, got {}",
                    self.distance_falloff
                ),
            });
        }
        Ok(())
    }
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            max_active_signals: default_max_active_signals(),
            signal_decay_enabled: true,
            spatial_hashing: true,
            grid_size: default_signal_grid_size(),
            max_range: default_max_range(),
            environmental_attenuation: true,
            distance_falloff: default_distance_falloff(),
            max_signal_age: default_max_signal_age(),
            min_strength: default_min_strength(),
            reception_threshold: default_reception_threshold(),
        }
    }
}

fn validate_grid_size(grid_size: f64) -> Result<(), WorldError> {
    if grid_size.is_finite() && grid_size > 0.0 {
        Ok(())
    } else {
        Err(WorldError::InvalidConfig {
            reason: format!("grid_size must be finite and positive, got {grid_size}"),
        })
    }
}

// ---------------------------------------------------------------------------
// Default value functions (serde default requires named functions)
// ---------------------------------------------------------------------------

const fn default_true() -> bool {
    true
}

const fn default_max_obstacles() -> usize {
    1000
}

const fn default_obstacle_grid_size() -> f64 {
    10.0
}

const fn default_max_path_expansions() -> usize {
    10_000
}

const fn default_max_active_signals() -> usize {
    500
}

const fn default_signal_grid_size() -> f64 {
    20.0
}

const fn default_max_range() -> f64 {
    100.0
}

const fn default_distance_falloff() -> f64 {
    0.01
}

const fn default_max_signal_age() -> f64 {
    30.0
}

const fn default_min_strength() -> f64 {
    0.001
}

const fn default_reception_threshold() -> f64 {
    0.01
}
