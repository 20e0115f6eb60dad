//! Offline validation of configuration and blueprint files.

use std::path::Path;

use commanders_core::config::MatchConfig;
use commanders_core::data::Blueprints;
use ron::ser::PrettyConfig;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::Result;

/// What kind of file was validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileKind {
    /// A `MatchConfig`.
    MatchConfig,
    /// A blueprint table.
    Blueprints,
}

/// Summary of a file that parsed and validated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// File checked.
    pub path: String,
    /// How it was interpreted.
    pub kind: FileKind,
    /// Human-readable facts about the contents.
    pub notes: Vec<String>,
    /// The config with every default filled in, as RON.
    pub resolved: Option<String>,
}

/// Parse and validate `path` as a match config, or as a blueprint table when
/// `blueprints` is set.
pub fn validate_file(path: &Path, blueprints: bool) -> Result<ValidationReport> {
    let report = if blueprints {
        validate_blueprints(path)?
    } else {
        validate_config(path)?
    };
    info!(path = %path.display(), kind = ?report.kind, "File is valid");
    Ok(report)
}

fn validate_config(path: &Path) -> Result<ValidationReport> {
    let config = MatchConfig::load(path)?;
    let notes = vec![
        format!("seed {}", config.seed),
        format!(
            "map {}x{} tiles of {}px",
            config.map.width, config.map.height, config.map.tile_size
        ),
        format!(
            "{} resource nodes, {} near each base",
            config.resources.node_count, config.resources.home_nodes_per_faction
        ),
        format!(
            "{} starting resources, {} workers",
            config.starting_resources, config.initial_workers
        ),
    ];
    let resolved = ron::ser::to_string_pretty(&config, PrettyConfig::new())?;

    Ok(ValidationReport {
        path: path.display().to_string(),
        kind: FileKind::MatchConfig,
        notes,
        resolved: Some(resolved),
    })
}

fn validate_blueprints(path: &Path) -> Result<ValidationReport> {
    let table = Blueprints::load(path)?;
    let mut notes = Vec::new();
    for unit in table.units() {
        notes.push(format!(
            "unit {} costs {} and needs tech {}",
            unit.kind.key(),
            unit.cost,
            unit.tech_level
        ));
    }
    for structure in table.structures() {
        notes.push(format!(
            "structure {} costs {} and needs tech {}",
            structure.kind.key(),
            structure.cost,
            structure.required_tech
        ));
    }

    Ok(ValidationReport {
        path: path.display().to_string(),
        kind: FileKind::Blueprints,
        notes,
        resolved: None,
    })
}
