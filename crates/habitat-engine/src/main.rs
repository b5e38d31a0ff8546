//! Simulation binary for the Habitat creature simulation.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `habitat-config.yaml` (or `HABITAT_CONFIG`)
//! 2. Initialize structured logging (tracing)
//! 3. Build the ecosystem from the scenario named by `HABITAT_SCENARIO`,
//!    or spawn the configured random population
//! 4. Run ticks until `world.max_ticks` is reached or every creature dies
//! 5. Log the final signal statistics

mod error;

use std::path::{Path, PathBuf};

use habitat_core::behavior::ReactiveBehavior;
use habitat_core::config::{LoggingConfig, SimulationConfig};
use habitat_core::scenario::Scenario;
use habitat_core::tick::{Ecosystem, run_tick};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;

/// Default configuration file, relative to the working directory.
const DEFAULT_CONFIG_PATH: &str = "habitat-config.yaml";

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration, scenario loading, or a tick fails.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration.
    let config = load_config()?;

    // 2. Initialize structured logging.
    init_logging(&config.logging);
    info!(
        world_name = config.world.name,
        seed = config.world.seed,
        tick_delta = config.world.tick_delta,
        max_ticks = config.world.max_ticks,
        "Configuration loaded"
    );

    // 3. Build the ecosystem.
    let mut ecosystem = build_ecosystem(&config)?;
    info!(
        obstacles = ecosystem.obstacles().len(),
        creatures = ecosystem.creatures().count(),
        "Ecosystem ready"
    );

    // 4. Run the simulation loop.
    let mut behavior = ReactiveBehavior::new(config.world.seed);
    let mut deaths = 0_usize;
    let mut blocked = 0_u64;
    while !ecosystem.clock().is_finished(config.world.max_ticks) {
        let summary = run_tick(&mut ecosystem, &mut behavior).map_err(EngineError::from)?;
        deaths = deaths.saturating_add(summary.deaths.len());
        blocked = blocked.saturating_add(u64::from(summary.moves_blocked));
        if summary.creatures_alive == 0 {
            warn!(tick = summary.tick, "Every creature has died");
            break;
        }
    }

    // 5. Report.
    let stats = serde_json::to_string(&ecosystem.signals().stats()).map_err(EngineError::from)?;
    info!(
        ticks = ecosystem.clock().tick(),
        elapsed = ecosystem.clock().elapsed(),
        survivors = ecosystem.creatures().count(),
        deaths,
        blocked_moves = blocked,
        signal_stats = %stats,
        "Simulation finished"
    );
    Ok(())
}

/// Install the global subscriber. `RUST_LOG` wins over the configured level.
fn init_logging(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(logging.level.as_str()));
    if logging.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    }
}

/// Load configuration from `HABITAT_CONFIG`, falling back to
/// `habitat-config.yaml` and then to built-in defaults.
fn load_config() -> Result<SimulationConfig, EngineError> {
    let config_path = std::env::var_os("HABITAT_CONFIG")
        .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);
    if config_path.exists() {
        Ok(SimulationConfig::from_file(&config_path)?)
    } else {
        Ok(SimulationConfig::default())
    }
}

/// Build from the scenario in `HABITAT_SCENARIO` when set, otherwise
/// spawn the configured random population on open ground.
fn build_ecosystem(config: &SimulationConfig) -> Result<Ecosystem, EngineError> {
    if let Some(path) = std::env::var_os("HABITAT_SCENARIO") {
        let path = Path::new(&path);
        let scenario = Scenario::from_file(path)?;
        info!(path = %path.display(), "Scenario file loaded");
        Ok(Ecosystem::from_scenario(config, &scenario)?)
    } else {
        let mut ecosystem = Ecosystem::new(config)?;
        ecosystem.populate();
        Ok(ecosystem)
    }
}
