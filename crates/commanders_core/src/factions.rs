//! Faction identifiers, profiles and per-match state.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::buildings::Structure;
use crate::data::{StructureKind, UnitKind, MAX_TECH_LEVEL};
use crate::units::Unit;

/// Unique identifier for factions. Doubles as the index into the match's
/// faction list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FactionId(pub u8);

impl FactionId {
    /// Index into the faction list.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for FactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "faction {}", self.0)
    }
}

/// Identity of a faction, preserved across match resets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactionProfile {
    /// Display name.
    pub name: String,
    /// Primary RGB color.
    pub primary_color: [u8; 3],
    /// Shadow RGB color.
    pub shadow_color: [u8; 3],
    /// Attack retarget frequency multiplier.
    pub aggression: f32,
}

impl FactionProfile {
    /// The first faction.
    #[must_use]
    pub fn red_horizon() -> Self {
        Self {
            name: "Red Horizon".into(),
            primary_color: [214, 69, 65],
            shadow_color: [178, 34, 34],
            aggression: 1.0,
        }
    }

    /// The second faction.
    #[must_use]
    pub fn blue_dawn() -> Self {
        Self {
            name: "Blue Dawn".into(),
            primary_color: [66, 135, 245],
            shadow_color: [21, 101, 192],
            aggression: 1.25,
        }
    }

    /// The two standard profiles, in faction order.
    #[must_use]
    pub fn standard() -> [Self; 2] {
        [Self::red_horizon(), Self::blue_dawn()]
    }
}

/// Running totals for reports.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FactionStats {
    /// Units spawned from production queues.
    pub units_produced: u32,
    /// Units removed at cleanup.
    pub units_lost: u32,
    /// Structures removed at cleanup.
    pub structures_lost: u32,
    /// Construction projects started.
    pub structures_started: u32,
    /// Resources credited by workers.
    pub resources_gathered: f32,
    /// Resources spent on construction and training.
    pub resources_spent: f32,
}

/// Mutable per-match state of one faction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FactionState {
    /// Faction id.
    pub id: FactionId,
    /// Identity.
    pub profile: FactionProfile,
    /// Spendable resources.
    pub resources: f32,
    /// Owned structures.
    pub structures: Vec<Structure>,
    /// Owned units.
    pub units: Vec<Unit>,
    /// Derived from operational structures; see [`tech_level`].
    pub tech_level: u8,
    /// No structures and no units remain.
    pub defeated: bool,
    /// Running totals.
    pub stats: FactionStats,
}

impl FactionState {
    /// Create an empty faction.
    #[must_use]
    pub fn new(id: FactionId, profile: FactionProfile, resources: f32) -> Self {
        Self {
            id,
            profile,
            resources,
            structures: Vec::new(),
            units: Vec::new(),
            tech_level: 1,
            defeated: false,
            stats: FactionStats::default(),
        }
    }

    /// Living structures of a kind, finished or not.
    #[must_use]
    pub fn count_structures(&self, kind: StructureKind) -> usize {
        self.structures
            .iter()
            .filter(|s| s.alive() && s.kind() == kind)
            .count()
    }

    /// The living headquarters, if any.
    #[must_use]
    pub fn hq(&self) -> Option<&Structure> {
        self.structures
            .iter()
            .find(|s| s.alive() && s.kind() == StructureKind::Hq)
    }

    /// Indices of operational structures able to train `kind`.
    #[must_use]
    pub fn available_producers(&self, kind: UnitKind) -> Vec<usize> {
        self.structures
            .iter()
            .enumerate()
            .filter(|(_, s)| s.can_produce(kind))
            .map(|(i, _)| i)
            .collect()
    }

    /// Living units of a kind.
    #[must_use]
    pub fn count_units(&self, kind: UnitKind) -> usize {
        self.units
            .iter()
            .filter(|u| u.alive() && u.kind() == kind)
            .count()
    }

    /// Living worker-role units.
    #[must_use]
    pub fn worker_count(&self) -> usize {
        self.units.iter().filter(|u| u.alive() && u.is_worker()).count()
    }

    /// Living units plus everything queued.
    #[must_use]
    pub fn population(&self) -> usize {
        let living = self.units.iter().filter(|u| u.alive()).count();
        let queued: usize = self
            .structures
            .iter()
            .filter(|s| s.alive())
            .map(|s| s.production_queue.len())
            .sum();
        living + queued
    }

    /// Anything left alive on the map.
    #[must_use]
    pub fn has_presence(&self) -> bool {
        self.structures.iter().any(Structure::alive) || self.units.iter().any(Unit::alive)
    }

    /// Recompute tech level and defeat from current holdings.
    pub fn refresh(&mut self) {
        self.tech_level = tech_level(&self.structures);
        self.defeated = self.structures.is_empty() && self.units.is_empty();
    }
}

/// Tech level granted by a set of structures.
///
/// The highest `provides_tech` among alive, completed structures, never
/// below 1 and capped at [`MAX_TECH_LEVEL`].
#[must_use]
pub fn tech_level(structures: &[Structure]) -> u8 {
    structures
        .iter()
        .filter(|s| s.is_operational())
        .map(|s| s.definition.provides_tech)
        .max()
        .unwrap_or(1)
        .clamp(1, MAX_TECH_LEVEL)
}
