//! World clock, scenarios, perception, and the tick cycle for the Habitat
//! simulation.
//!
//! This crate owns the creatures and drives the two spatial registries of
//! `habitat-world` through an eight-phase tick: Clock, Terrain, Signal
//! sync, Signal decay, Perception, Decision, Resolution, and Vitals.
//!
//! # Modules
//!
//! - [`behavior`] -- [`BehaviorSource`] trait, [`StubBehavior`], and
//!   [`ReactiveBehavior`].
//! - [`clock`] -- World clock with tick counter and elapsed simulated time.
//! - [`config`] -- Configuration loading from `habitat-config.yaml` into
//!   strongly-typed structs.
//! - [`creature`] -- Per-creature state, status effects, and vitals.
//! - [`perception`] -- Per-creature perception assembly from both registries.
//! - [`scenario`] -- YAML scenario files listing obstacles and creatures.
//! - [`tick`] -- The [`Ecosystem`] and its tick cycle.
//!
//! [`BehaviorSource`]: behavior::BehaviorSource
//! [`StubBehavior`]: behavior::StubBehavior
//! [`ReactiveBehavior`]: behavior::ReactiveBehavior
//! [`Ecosystem`]: tick::Ecosystem

pub mod behavior;
pub mod clock;
pub mod config;
pub mod creature;
pub mod perception;
pub mod scenario;
pub mod tick;
