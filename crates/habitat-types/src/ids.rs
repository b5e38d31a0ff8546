//! Type-safe identifiers for every entity the spatial engine touches.
//!
//! Creatures live outside the engine and are identified by a UUID newtype
//! derived by the collaborator layer. Obstacles and signals are owned by
//! their registries and are addressed through generational slot-map keys,
//! so a handle to a removed record can never alias a record inserted later.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier for a creature in the simulation.
///
/// Ids are derived, never drawn: the collaborator layer builds them from
/// run-stable numbers so two runs with the same inputs name their
/// creatures identically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CreatureId(pub Uuid);

impl CreatureId {
    /// Build an id from two 64-bit halves.
    pub const fn from_u64_pair(high: u64, low: u64) -> Self {
        Self(Uuid::from_u64_pair(high, low))
    }

    /// Return the inner [`Uuid`] value.
    pub const fn into_inner(self) -> Uuid {
        self.0
    }
}

impl core::fmt::Display for CreatureId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for CreatureId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl From<CreatureId> for Uuid {
    fn from(id: CreatureId) -> Self {
        id.0
    }
}

slotmap::new_key_type! {
    /// Generational handle for an obstacle held by the obstacle registry.
    pub struct ObstacleId;

    /// Generational handle for a signal held by the signal registry.
    pub struct SignalId;
}
