//! The creature collaborator interface.
//!
//! The spatial engine never owns creatures. It reads their identity,
//! position, energy and age through [`Creature`], and debits energy
//! through it when a signal is emitted.

use habitat_types::{CreatureId, Vec2};

/// Read (and energy-debit) access to a creature.
pub trait Creature {
    /// Stable identity.
    fn id(&self) -> CreatureId;

    /// Current world position.
    fn position(&self) -> Vec2;

    /// Remaining energy.
    fn energy(&self) -> f64;

    /// Ticks lived so far.
    fn age(&self) -> u64;

    /// Deduct `amount` from the creature's energy.
    fn spend_energy(&mut self, amount: f64);
}

#[cfg(test)]
pub(crate) mod fixture {
    use std::sync::atomic::{AtomicU64, Ordering};

    use super::{Creature, CreatureId, Vec2};

    static NEXT_ID: AtomicU64 = AtomicU64::new(1);

    fn next_id() -> CreatureId {
        CreatureId::from_u64_pair(0, NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Minimal creature used by unit tests.
    #[derive(Debug, Clone)]
    pub struct TestCreature {
        pub id: CreatureId,
        pub position: Vec2,
        pub energy: f64,
        pub age: u64,
    }

    impl TestCreature {
        pub fn at(x: f64, y: f64) -> Self {
            Self {
                id: next_id(),
                position: Vec2::new(x, y),
                energy: 100.0,
                age: 200,
            }
        }

        pub const fn with_energy(mut self, energy: f64) -> Self {
            self.energy = energy;
            self
        }

        pub const fn with_age(mut self, age: u64) -> Self {
            self.age = age;
            self
        }
    }

    impl Creature for TestCreature {
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
            self.age
        }

        fn spend_energy(&mut self, amount: f64) {
            self.energy -= amount;
        }
    }
}
