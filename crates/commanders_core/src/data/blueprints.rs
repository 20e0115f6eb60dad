//! Blueprint registry.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::structure_data::{StructureDefinition, StructureKind};
use super::unit_data::{UnitDefinition, UnitKind};
use super::MAX_TECH_LEVEL;
use crate::error::{GameError, Result};

/// Embedded standard table.
const STANDARD_BLUEPRINTS: &str = include_str!("../../data/blueprints.ron");

/// Serialized form of a blueprint table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlueprintTable {
    /// Unit archetypes.
    pub units: Vec<UnitDefinition>,
    /// Structure archetypes.
    pub structures: Vec<StructureDefinition>,
}

impl BlueprintTable {
    /// Validate the table and return a list of errors.
    ///
    /// Returns an empty vector if the table is valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        for kind in UnitKind::ALL {
            match self.units.iter().filter(|u| u.kind == kind).count() {
                1 => {}
                0 => errors.push(format!("unit '{kind}' is missing")),
                n => errors.push(format!("unit '{kind}' is defined {n} times")),
            }
        }
        for kind in StructureKind::ALL {
            match self.structures.iter().filter(|s| s.kind == kind).count() {
                1 => {}
                0 => errors.push(format!("structure '{kind}' is missing")),
                n => errors.push(format!("structure '{kind}' is defined {n} times")),
            }
        }

        for unit in &self.units {
            if unit.health <= 0.0 {
                errors.push(format!("unit '{}' has non-positive health", unit.kind));
            }
            if unit.cost < 0.0 || unit.build_time < 0.0 {
                errors.push(format!("unit '{}' has a negative cost or build time", unit.kind));
            }
            if unit.speed < 0.0 || unit.radius <= 0.0 {
                errors.push(format!("unit '{}' has an invalid speed or radius", unit.kind));
            }
            if unit.can_attack() && (unit.range <= 0.0 || unit.cooldown < 0.0) {
                errors.push(format!("unit '{}' can attack but has no range", unit.kind));
            }
            if !(1..=MAX_TECH_LEVEL).contains(&unit.tech_level) {
                errors.push(format!(
                    "unit '{}' tech level {} outside 1..={MAX_TECH_LEVEL}",
                    unit.kind, unit.tech_level
                ));
            }
            if !self.structures.iter().any(|s| s.can_produce(unit.kind)) {
                errors.push(format!("unit '{}' has no producer", unit.kind));
            }
        }

        for structure in &self.structures {
            if structure.health <= 0.0 {
                errors.push(format!("structure '{}' has non-positive health", structure.kind));
            }
            if structure.cost < 0.0 || structure.build_time < 0.0 {
                errors.push(format!(
                    "structure '{}' has a negative cost or build time",
                    structure.kind
                ));
            }
            for tech in [structure.required_tech, structure.provides_tech] {
                if !(1..=MAX_TECH_LEVEL).contains(&tech) {
                    errors.push(format!(
                        "structure '{}' tech level {tech} outside 1..={MAX_TECH_LEVEL}",
                        structure.kind
                    ));
                }
            }
            for produced in &structure.produces {
                if !self.units.iter().any(|u| u.kind == *produced) {
                    errors.push(format!(
                        "structure '{}' produces unknown unit '{produced}'",
                        structure.kind
                    ));
                }
            }
        }

        errors
    }
}

/// Immutable, shareable lookup of every blueprint.
///
/// Definitions are reference counted so runtime entities can hold on to
/// their archetype without copying it.
#[derive(Debug, Clone)]
pub struct Blueprints {
    units: Vec<Arc<UnitDefinition>>,
    structures: Vec<Arc<StructureDefinition>>,
}

impl Blueprints {
    /// The standard table shipped with the game.
    pub fn standard() -> Result<Self> {
        Self::parse(STANDARD_BLUEPRINTS, "data/blueprints.ron")
    }

    /// Parse and validate a table from RON text.
    pub fn from_ron_str(ron_text: &str) -> Result<Self> {
        Self::parse(ron_text, "<inline>")
    }

    /// Load and validate a table from a file.
    pub fn load(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| GameError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&text, &path.display().to_string())
    }

    fn parse(ron_text: &str, label: &str) -> Result<Self> {
        let table: BlueprintTable =
            ron::from_str(ron_text).map_err(|e| GameError::DataParseError {
                path: label.to_string(),
                message: e.to_string(),
            })?;
        Self::from_table(table)
    }

    /// Validate a table and build the registry.
    pub fn from_table(table: BlueprintTable) -> Result<Self> {
        let errors = table.validate();
        if !errors.is_empty() {
            return Err(GameError::InvalidBlueprint(errors.join("; ")));
        }
        Ok(Self {
            units: table.units.into_iter().map(Arc::new).collect(),
            structures: table.structures.into_iter().map(Arc::new).collect(),
        })
    }

    /// Unit definition for a kind.
    #[must_use]
    pub fn unit(&self, kind: UnitKind) -> Option<&Arc<UnitDefinition>> {
        self.units.iter().find(|u| u.kind == kind)
    }

    /// Structure definition for a kind.
    #[must_use]
    pub fn structure(&self, kind: StructureKind) -> Option<&Arc<StructureDefinition>> {
        self.structures.iter().find(|s| s.kind == kind)
    }

    /// Unit definition for a kind, as an error when absent.
    pub fn require_unit(&self, kind: UnitKind) -> Result<&Arc<UnitDefinition>> {
        self.unit(kind)
            .ok_or_else(|| GameError::MissingBlueprint(kind.key().to_string()))
    }

    /// Structure definition for a kind, as an error when absent.
    pub fn require_structure(&self, kind: StructureKind) -> Result<&Arc<StructureDefinition>> {
        self.structure(kind)
            .ok_or_else(|| GameError::MissingBlueprint(kind.key().to_string()))
    }

    /// All unit definitions.
    pub fn units(&self) -> impl Iterator<Item = &Arc<UnitDefinition>> {
        self.units.iter()
    }

    /// All structure definitions.
    pub fn structures(&self) -> impl Iterator<Item = &Arc<StructureDefinition>> {
        self.structures.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn standard_table() -> BlueprintTable {
        ron::from_str(STANDARD_BLUEPRINTS).unwrap()
    }

    #[test]
    fn test_standard_table_is_valid() {
        let errors = standard_table().validate();
        assert!(errors.is_empty(), "{errors:?}");
    }

    #[test]
    fn test_standard_values() {
        let bp = Blueprints::standard().unwrap();
        let hq = bp.structure(StructureKind::Hq).unwrap();
        assert!((hq.health - 900.0).abs() < f32::EPSILON);
        assert!(hq.deposit);
        assert!(hq.can_produce(UnitKind::Worker));

        let tank = bp.unit(UnitKind::Tank).unwrap();
        assert_eq!(tank.tech_level, 2);
        assert!((tank.cost - 160.0).abs() < f32::EPSILON);

        let lab = bp.structure(StructureKind::Lab).unwrap();
        assert_eq!(lab.provides_tech, 3);
        assert_eq!(bp.units().count(), 5);
        assert_eq!(bp.structures().count(), 5);
    }

    #[test]
    fn test_missing_producer_rejected() {
        let mut table = standard_table();
        for s in &mut table.structures {
            s.produces.retain(|k| *k != UnitKind::Tank);
        }
        let err = Blueprints::from_table(table).unwrap_err();
        match err {
            GameError::InvalidBlueprint(msg) => assert!(msg.contains("'tank' has no producer")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_duplicate_and_missing_rejected() {
        let mut table = standard_table();
        let worker = table.units[0].clone();
        table.units.push(worker);
        table.structures.retain(|s| s.kind != StructureKind::Lab);
        let errors = table.validate();
        assert!(errors.iter().any(|e| e.contains("defined 2 times")));
        assert!(errors.iter().any(|e| e.contains("'lab' is missing")));
    }

    #[test]
    fn test_parse_error_reported() {
        let err = Blueprints::from_ron_str("BlueprintTable(units: 3)").unwrap_err();
        assert!(matches!(err, GameError::DataParseError { .. }));
    }
}
