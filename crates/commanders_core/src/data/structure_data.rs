//! Structure blueprint definitions.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::unit_data::UnitKind;

/// Archetype key of a structure blueprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StructureKind {
    /// Headquarters; each faction starts with one.
    Hq,
    /// Additional resource deposit.
    Refinery,
    /// Trains light combat units.
    Barracks,
    /// Builds heavy combat units.
    Factory,
    /// Unlocks the top tech level.
    Lab,
}

impl StructureKind {
    /// Every structure kind, in table order.
    pub const ALL: [Self; 5] = [
        Self::Hq,
        Self::Refinery,
        Self::Barracks,
        Self::Factory,
        Self::Lab,
    ];

    /// Lowercase archetype key.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Hq => "hq",
            Self::Refinery => "refinery",
            Self::Barracks => "barracks",
            Self::Factory => "factory",
            Self::Lab => "lab",
        }
    }

    /// Look up a kind by archetype key.
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.key() == key)
    }
}

impl fmt::Display for StructureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Immutable stats of a structure archetype.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructureDefinition {
    /// Archetype key.
    pub kind: StructureKind,
    /// Display name.
    pub name: String,
    /// Resource cost, paid when construction starts.
    pub cost: f32,
    /// Construction time in seconds.
    pub build_time: f32,
    /// Maximum health.
    pub health: f32,
    /// Collision radius in pixels.
    pub radius: f32,
    /// Unit kinds this structure can train.
    #[serde(default)]
    pub produces: Vec<UnitKind>,
    /// Faction tech level required to start construction.
    #[serde(default = "default_tech")]
    pub required_tech: u8,
    /// Tech level this structure grants while alive and completed.
    #[serde(default = "default_tech")]
    pub provides_tech: u8,
    /// Whether workers may unload cargo here.
    #[serde(default)]
    pub deposit: bool,
}

const fn default_tech() -> u8 {
    1
}

impl StructureDefinition {
    /// Check if this structure can train the given unit kind.
    #[must_use]
    pub fn can_produce(&self, kind: UnitKind) -> bool {
        self.produces.contains(&kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_can_produce() {
        let def: StructureDefinition = ron::from_str(
            "StructureDefinition(kind: barracks, name: \"B\", cost: 160.0, build_time: 14.0, \
             health: 600.0, radius: 18.0, produces: [infantry, ranger], provides_tech: 2)",
        )
        .unwrap();
        assert!(def.can_produce(UnitKind::Infantry));
        assert!(!def.can_produce(UnitKind::Tank));
        assert_eq!(def.required_tech, 1);
        assert!(!def.deposit);
    }

    #[test]
    fn test_key_lookup() {
        assert_eq!(StructureKind::from_key("lab"), Some(StructureKind::Lab));
        assert_eq!(StructureKind::from_key("silo"), None);
    }
}
