//! World clock for the Habitat simulation.
//!
//! The clock counts ticks and the simulated time they cover. Every tick
//! spans the same `tick_delta`, which is the `dt` handed to the obstacle
//! and signal registries on update.

use crate::config::WorldConfig;

/// Errors that can occur during clock operations.
#[derive(Debug, thiserror::Error)]
pub enum ClockError {
    /// Tick counter would overflow.
    #[error("tick counter overflow: cannot advance beyond u64::MAX")]
    TickOverflow,

    /// Invalid time configuration (e.g. a zero or negative tick delta).
    #[error("invalid time configuration: {reason}")]
    InvalidConfig {
        /// Explanation of what is wrong with the configuration.
        reason: String,
    },
}

/// World clock tracking the simulation's temporal state.
#[derive(Debug, Clone, PartialEq)]
pub struct WorldClock {
    /// Current tick number (0 before the first tick runs).
    tick: u64,

    /// Simulated time covered by one tick.
    tick_delta: f64,

    /// Simulated time elapsed since tick 0.
    elapsed: f64,
}

impl WorldClock {
    /// Create a clock at tick 0 from the world configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::InvalidConfig`] if `tick_delta` is not a
    /// finite positive number.
    pub fn new(config: &WorldConfig) -> Result<Self, ClockError> {
        Self::from_parts(0, config.tick_delta)
    }

    /// Create a clock from explicit parameters (useful for testing and
    /// state restoration).
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::InvalidConfig`] if `tick_delta` is not a
    /// finite positive number.
    pub fn from_parts(tick: u64, tick_delta: f64) -> Result<Self, ClockError> {
        if !tick_delta.is_finite() || tick_delta <= 0.0 {
            return Err(ClockError::InvalidConfig {
                reason: format!("tick_delta must be finite and positive, got {tick_delta}"),
            });
        }
        #[allow(clippy::cast_precision_loss)]
        let elapsed = tick as f64 * tick_delta;
        Ok(Self {
            tick,
            tick_delta,
            elapsed,
        })
    }

    /// Advance the clock by one tick. Returns the new tick number.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::TickOverflow`] if the tick counter would exceed
    /// `u64::MAX`.
    pub fn advance(&mut self) -> Result<u64, ClockError> {
        self.tick = self.tick.checked_add(1).ok_or(ClockError::TickOverflow)?;
        self.elapsed += self.tick_delta;
        Ok(self.tick)
    }

    /// Return the current tick number.
    pub const fn tick(&self) -> u64 {
        self.tick
    }

    /// Simulated time covered by one tick.
    pub const fn tick_delta(&self) -> f64 {
        self.tick_delta
    }

    /// Simulated time elapsed since tick 0.
    pub const fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Whether a run bounded by `max_ticks` is over. `0` means unbounded.
    pub const fn is_finished(&self, max_ticks: u64) -> bool {
        max_ticks != 0 && self.tick >= max_ticks
    }
}
