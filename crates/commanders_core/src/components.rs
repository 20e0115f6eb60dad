//! State shared by every placed entity.
//!
//! Units and structures embed a [`Body`] carrying identity, ownership,
//! position and health. Resource nodes are unowned and keep their own
//! record in [`economy`](crate::economy).

use serde::{Deserialize, Serialize};

use crate::factions::FactionId;
use crate::math::Vec2;

/// Unique identifier for entities.
pub type EntityId = u64;

/// Match-wide id counter. Ids are never reused within a match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdAllocator {
    next: EntityId,
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl IdAllocator {
    /// Create a counter whose first id is 1.
    #[must_use]
    pub const fn new() -> Self {
        Self { next: 1 }
    }

    /// Hand out the next id.
    pub fn next_id(&mut self) -> EntityId {
        let id = self.next;
        self.next += 1;
        id
    }

    /// Id the next call to [`next_id`](Self::next_id) will return.
    #[must_use]
    pub const fn peek(&self) -> EntityId {
        self.next
    }
}

/// Identity, ownership, position and health of a unit or structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Body {
    /// Unique id.
    pub id: EntityId,
    /// Owning faction.
    pub owner: FactionId,
    /// World position in pixels.
    pub position: Vec2,
    /// Collision radius in pixels.
    pub radius: f32,
    /// Maximum health.
    pub max_health: f32,
    /// Current health.
    pub health: f32,
}

impl Body {
    /// Create a body at full health.
    #[must_use]
    pub const fn new(id: EntityId, owner: FactionId, position: Vec2, radius: f32, max_health: f32) -> Self {
        Self {
            id,
            owner,
            position,
            radius,
            max_health,
            health: max_health,
        }
    }

    /// Alive while health is above zero.
    #[must_use]
    pub fn alive(&self) -> bool {
        self.health > 0.0
    }

    /// Apply damage, returning the amount actually removed.
    pub fn take_damage(&mut self, amount: f32) -> f32 {
        let actual = amount.max(0.0).min(self.health.max(0.0));
        self.health -= actual;
        actual
    }

    /// Health as a fraction of maximum (0-1).
    #[must_use]
    pub fn health_fraction(&self) -> f32 {
        if self.max_health <= 0.0 {
            0.0
        } else {
            (self.health / self.max_health).clamp(0.0, 1.0)
        }
    }
}
