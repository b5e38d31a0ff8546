//! End-to-end scenarios across the obstacle and signal registries.

#![allow(clippy::unwrap_used)]

use std::sync::atomic::{AtomicU64, Ordering};

use habitat_types::{
    CreatureId, ObstaclePropertyOverrides, ObstacleType, PathNode, Rect, SignalEnvironment,
    SignalRequest, SignalType, Vec2,
};
use habitat_world::geometry::segment_intersects_rect;
use habitat_world::pathfinding::path_length;
use habitat_world::{Creature, ObstacleConfig, ObstacleRegistry, SignalConfig, SignalRegistry};
use rand::SeedableRng;
use rand::rngs::SmallRng;

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

struct Critter {
    id: CreatureId,
    position: Vec2,
    energy: f64,
}

impl Critter {
    fn at(x: f64, y: f64) -> Self {
        Self {
            id: CreatureId::from_u64_pair(0, NEXT_ID.fetch_add(1, Ordering::Relaxed)),
            position: Vec2::new(x, y),
            energy: 100.0,
        }
    }
}

impl Creature for Critter {
    fn id(&self) -> CreatureId {
        self.id
    }

    fn position(&self) -> Vec2 {
        self.position
    }

    fn energy(&self) -> f64 {
        self.energy
    }

    fn age(&self) -> u64 {
        0
    }

    fn spend_energy(&mut self, amount: f64) {
        self.energy -= amount;
    }
}

fn obstacles() -> ObstacleRegistry {
    ObstacleRegistry::new(ObstacleConfig {
        pathfinding_consumes_resources: false,
        ..ObstacleConfig::default()
    })
    .unwrap()
}

/// Whether any step of `path` passes through one of `walls`.
fn crosses_any(path: &[PathNode], walls: &[Rect]) -> bool {
    path.iter().zip(path.iter().skip(1)).any(|(a, b)| {
        walls
            .iter()
            .any(|w| segment_intersects_rect(a.position, b.position, w))
    })
}

fn signals() -> SignalRegistry {
    let mut reg = SignalRegistry::new(SignalConfig::default()).unwrap();
    reg.set_environment(SignalEnvironment::CALM);
    reg
}

fn solid(reg: &mut ObstacleRegistry, x: f64, y: f64, w: f64, h: f64) -> Rect {
    reg.create_obstacle(
        ObstacleType::SolidBarrier,
        Vec2::new(x, y),
        Vec2::new(w, h),
        &ObstaclePropertyOverrides::default(),
    )
    .footprint
}

#[test]
fn every_point_inside_an_impassable_obstacle_is_blocked() {
    let mut reg = obstacles();
    let mut rng = SmallRng::seed_from_u64(1);
    let critter = Critter::at(0.0, 0.0);
    for obstacle_type in [ObstacleType::SolidBarrier, ObstacleType::Cliff, ObstacleType::Rock] {
        reg.clear_obstacles();
        reg.create_obstacle(
            obstacle_type,
            Vec2::new(-3.0, 7.5),
            Vec2::new(12.5, 4.0),
            &ObstaclePropertyOverrides::default(),
        );
        for i in 0..=10 {
            for j in 0..=8 {
                let p = Vec2::new(
                    1.25_f64.mul_add(f64::from(i), -3.0),
                    0.5_f64.mul_add(f64::from(j), 7.5),
                );
                assert!(reg.check_interaction(&critter, p, &mut rng).blocked, "{p:?}");
            }
        }
    }
}

#[test]
fn decay_follows_the_multiplicative_rule() {
    let mut reg = signals();
    let mut critter = Critter::at(0.0, 0.0);
    let ids: Vec<_> = SignalType::ALL
        .iter()
        .filter_map(|&t| reg.emit_signal(&mut critter, SignalRequest::new(t, 0.9)))
        .collect();
    assert_eq!(ids.len(), SignalType::ALL.len());

    for _ in 0..10 {
        let before: Vec<(f64, f64)> = ids
            .iter()
            .filter_map(|&id| reg.get(id).map(|s| (s.strength, s.decay_rate)))
            .collect();
        reg.update(1.0);
        for (&id, (strength, decay)) in ids.iter().zip(before) {
            let after = reg.get(id).unwrap().strength;
            assert!((after - strength * (1.0 - decay)).abs() < 1e-12);
            assert!(after <= strength);
        }
    }
}

#[test]
fn insert_then_remove_restores_position_queries() {
    let mut reg = obstacles();
    reg.create_obstacle(
        ObstacleType::Tree,
        Vec2::new(0.0, 0.0),
        Vec2::new(15.0, 15.0),
        &ObstaclePropertyOverrides::default(),
    );
    let samples: Vec<Vec2> = (0..=6)
        .flat_map(|i| (0..=6).map(move |j| Vec2::new(f64::from(i) * 5.0, f64::from(j) * 5.0)))
        .collect();
    let snapshot = |reg: &ObstacleRegistry| -> Vec<Vec<_>> {
        samples
            .iter()
            .map(|&p| reg.obstacles_at_position(p).iter().map(|o| o.id).collect())
            .collect()
    };

    let before = snapshot(&reg);
    assert_eq!(before, snapshot(&reg));

    let cave = reg
        .create_obstacle(
            ObstacleType::Cave,
            Vec2::new(8.0, 8.0),
            Vec2::new(20.0, 12.0),
            &ObstaclePropertyOverrides::default(),
        )
        .id;
    assert_ne!(before, snapshot(&reg));
    assert!(reg.remove_obstacle(cave));
    assert_eq!(before, snapshot(&reg));
}

#[test]
fn emission_at_exact_cost_succeeds_and_below_fails() {
    let mut reg = signals();
    for signal_type in SignalType::ALL {
        let cost = habitat_world::signal::defaults_for(signal_type).energy_cost;

        let mut exact = Critter::at(0.0, 0.0);
        exact.energy = cost;
        assert!(reg.emit_signal(&mut exact, SignalRequest::new(signal_type, 0.5)).is_some());
        assert!(exact.energy.abs() < f64::EPSILON);

        let mut short = Critter::at(0.0, 0.0);
        short.energy = cost - 1.0;
        assert!(reg.emit_signal(&mut short, SignalRequest::new(signal_type, 0.5)).is_none());
        assert!((short.energy - (cost - 1.0)).abs() < f64::EPSILON);
    }
}

#[test]
fn solid_barrier_cuts_received_strength_to_a_fifth() {
    let mut obstacle_reg = obstacles();
    let mut signal_reg = signals();
    let mut rng = SmallRng::seed_from_u64(7);
    let mut source = Critter::at(0.0, 0.0);
    let receiver = Critter::at(10.0, 0.0);
    signal_reg.emit_signal(&mut source, SignalRequest::new(SignalType::Warning, 1.0));

    let open = signal_reg.get_signals_for_creature(&receiver, &mut rng);
    let open_strength = open.first().unwrap().received_strength;

    solid(&mut obstacle_reg, 4.5, -2.0, 1.0, 4.0);
    signal_reg.set_obstacles(obstacle_reg.all_obstacles());
    let blocked = signal_reg.get_signals_for_creature(&receiver, &mut rng);
    let blocked_strength = blocked.first().unwrap().received_strength;

    assert!(blocked_strength <= open_strength * 0.2 + 1e-12);
}

#[test]
fn nearby_hazard_is_reported_dangerous() {
    let mut reg = obstacles();
    reg.create_obstacle(
        ObstacleType::Hazard,
        Vec2::new(6.0, 5.0),
        Vec2::new(1.0, 1.0),
        &ObstaclePropertyOverrides::default(),
    );
    let critter = Critter::at(5.0, 5.0);
    let found = reg.detect_obstacles(&critter, 3.0);
    assert_eq!(found.len(), 1);
    let hazard = found.first().unwrap();
    assert_eq!(hazard.obstacle_type, ObstacleType::Hazard);
    assert!(hazard.danger_level > 0.0);
    assert!(hazard.approachability < 1.0);
}

#[test]
fn open_ground_path_is_optimal() {
    let mut reg = obstacles();
    let mut rng = SmallRng::seed_from_u64(3);
    let critter = Critter::at(0.0, 0.0);
    for (gx, gy) in [(12.0_f64, 0.0_f64), (7.0, 7.0), (-9.0, 4.0), (3.0, -11.0)] {
        let path = reg.find_path(&critter, Vec2::ZERO, Vec2::new(gx, gy), &mut rng);
        let (lo, hi) = if gx.abs() < gy.abs() {
            (gx.abs(), gy.abs())
        } else {
            (gy.abs(), gx.abs())
        };
        let optimal = lo.mul_add(core::f64::consts::SQRT_2, hi - lo);
        assert!((path_length(&path) - optimal).abs() < 1e-9, "({gx}, {gy})");
        assert_eq!(path.last().map(|n| n.position), Some(Vec2::new(gx, gy)));
    }
}

#[test]
fn enclosed_cell_is_routed_around() {
    let mut reg = obstacles();
    let mut rng = SmallRng::seed_from_u64(5);
    let critter = Critter::at(0.0, 0.0);
    // Free cell [5, 6] x [5, 6] walled on all four sides.
    let walls = [
        solid(&mut reg, 4.0, 5.0, 1.0, 1.0),
        solid(&mut reg, 6.0, 5.0, 1.0, 1.0),
        solid(&mut reg, 5.0, 4.0, 1.0, 1.0),
        solid(&mut reg, 5.0, 6.0, 1.0, 1.0),
    ];
    let start = Vec2::new(0.5, 5.5);
    let goal = Vec2::new(10.5, 5.5);
    let path = reg.find_path(&critter, start, goal, &mut rng);

    assert!(!path.is_empty());
    assert_eq!(path.first().map(|n| n.position), Some(start));
    assert_eq!(path.last().map(|n| n.position), Some(goal));
    for node in &path {
        assert!(
            walls.iter().all(|w| !w.contains(node.position)),
            "{:?} lies inside a wall",
            node.position
        );
    }
    assert!(!crosses_any(&path, &walls));
}

#[test]
fn wall_thinner_than_a_step_is_walked_around() {
    let mut reg = obstacles();
    let mut rng = SmallRng::seed_from_u64(9);
    let critter = Critter::at(0.0, 0.0);
    let walls = [solid(&mut reg, 5.2, -8.0, 0.5, 16.0)];
    let goal = Vec2::new(10.0, 0.0);
    let path = reg.find_path(&critter, Vec2::ZERO, goal, &mut rng);

    assert_eq!(path.last().map(|n| n.position), Some(goal));
    assert!(path_length(&path) > 16.0);
    assert!(!crosses_any(&path, &walls));
}

#[test]
fn corner_joined_walls_leave_no_gap() {
    let mut reg = obstacles();
    let mut rng = SmallRng::seed_from_u64(11);
    let critter = Critter::at(0.0, 0.0);
    // Two slabs between lattice columns 4 and 5, touching at (4.8, 0.5).
    let walls = [
        solid(&mut reg, 4.2, -6.0, 0.6, 6.5),
        solid(&mut reg, 4.8, 0.5, 0.6, 6.0),
    ];
    let goal = Vec2::new(10.0, 0.0);
    let path = reg.find_path(&critter, Vec2::ZERO, goal, &mut rng);

    assert_eq!(path.last().map(|n| n.position), Some(goal));
    assert!(!crosses_any(&path, &walls));
}
