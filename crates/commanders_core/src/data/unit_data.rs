//! Unit blueprint definitions.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Archetype key of a unit blueprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitKind {
    /// Harvests resources; cannot fight.
    Worker,
    /// Cheap short-range combat unit.
    Infantry,
    /// Light long-range combat unit.
    Ranger,
    /// Heavy armoured unit.
    Tank,
    /// Slow siege unit with the longest range.
    Artillery,
}

impl UnitKind {
    /// Every unit kind, in table order.
    pub const ALL: [Self; 5] = [
        Self::Worker,
        Self::Infantry,
        Self::Ranger,
        Self::Tank,
        Self::Artillery,
    ];

    /// Lowercase archetype key.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Worker => "worker",
            Self::Infantry => "infantry",
            Self::Ranger => "ranger",
            Self::Tank => "tank",
            Self::Artillery => "artillery",
        }
    }

    /// Look up a kind by archetype key.
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.key() == key)
    }
}

impl fmt::Display for UnitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Behavioural role of a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitRole {
    /// Runs the gather/deposit cycle.
    Worker,
    /// Acquires and fights enemy targets.
    Combat,
}

/// Immutable stats of a unit archetype.
///
/// # Example RON
///
/// ```ron
/// UnitDefinition(
///     kind: infantry,
///     name: "Infantry",
///     role: Combat,
///     cost: 60.0,
///     build_time: 3.5,
///     health: 60.0,
///     speed: 90.0,
///     damage: 8.0,
///     range: 40.0,
///     cooldown: 0.8,
///     vision: 144.0,
///     tech_level: 1,
///     radius: 7.2,
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitDefinition {
    /// Archetype key.
    pub kind: UnitKind,
    /// Display name.
    pub name: String,
    /// Behavioural role.
    pub role: UnitRole,
    /// Resource cost, paid when queued.
    pub cost: f32,
    /// Training time in seconds.
    pub build_time: f32,
    /// Maximum health.
    pub health: f32,
    /// Movement speed in pixels per second.
    pub speed: f32,
    /// Damage per attack.
    #[serde(default)]
    pub damage: f32,
    /// Attack range in pixels.
    #[serde(default)]
    pub range: f32,
    /// Seconds between attacks.
    #[serde(default)]
    pub cooldown: f32,
    /// Radius within which enemy units are noticed.
    pub vision: f32,
    /// Faction tech level required to train this unit.
    #[serde(default = "default_tech_level")]
    pub tech_level: u8,
    /// Collision radius in pixels.
    pub radius: f32,
}

const fn default_tech_level() -> u8 {
    1
}

impl UnitDefinition {
    /// Check if this unit runs the worker cycle.
    #[must_use]
    pub fn is_worker(&self) -> bool {
        self.role == UnitRole::Worker
    }

    /// Check if this unit can engage in combat.
    #[must_use]
    pub fn can_attack(&self) -> bool {
        self.damage > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_round_trip() {
        for kind in UnitKind::ALL {
            assert_eq!(UnitKind::from_key(kind.key()), Some(kind));
        }
        assert_eq!(UnitKind::from_key("mech"), None);
        assert_eq!(UnitKind::Artillery.to_string(), "artillery");
    }

    #[test]
    fn test_parse_definition_with_defaults() {
        let def: UnitDefinition = ron::from_str(
            "UnitDefinition(kind: worker, name: \"W\", role: Worker, cost: 50.0, \
             build_time: 3.0, health: 45.0, speed: 85.0, vision: 128.0, radius: 7.2)",
        )
        .unwrap();
        assert_eq!(def.kind, UnitKind::Worker);
        assert_eq!(def.tech_level, 1);
        assert!(def.is_worker());
        assert!(!def.can_attack());
    }
}
