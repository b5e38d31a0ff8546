//! The configuration and scenarios checked into the repository load.

#![allow(clippy::unwrap_used)]

use std::path::{Path, PathBuf};

use habitat_core::config::SimulationConfig;
use habitat_core::scenario::Scenario;
use habitat_core::tick::Ecosystem;

fn repo_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../..")
}

#[test]
fn shipped_config_matches_defaults_where_it_repeats_them() {
    let config = SimulationConfig::from_file(&repo_root().join("habitat-config.yaml")).unwrap();
    let defaults = SimulationConfig::default();
    assert_eq!(config.obstacles, defaults.obstacles);
    assert_eq!(config.signals, defaults.signals);
    assert_eq!(config.creatures, defaults.creatures);
    assert_eq!(config.world.max_ticks, 200);
}

#[test]
fn river_crossing_scenario_builds() {
    let config = SimulationConfig::default();
    let path = repo_root().join("scenarios/river-crossing.yaml");
    let scenario = Scenario::from_file(&path).unwrap();
    let eco = Ecosystem::from_scenario(&config, &scenario).unwrap();
    assert_eq!(eco.obstacles().len(), 7);
    assert_eq!(eco.creatures().count(), 4);
}
