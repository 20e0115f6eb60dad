//! Blueprint data for units and structures.
//!
//! Blueprints are pure data deserialized from RON. The standard table is
//! embedded in the crate; alternative tables can be parsed from text and
//! are validated before use.

mod blueprints;
mod structure_data;
mod unit_data;

pub use blueprints::{BlueprintTable, Blueprints};
pub use structure_data::{StructureDefinition, StructureKind};
pub use unit_data::{UnitDefinition, UnitKind, UnitRole};

/// Highest tech level a faction can reach.
pub const MAX_TECH_LEVEL: u8 = 3;
