//! Match configuration.
//!
//! Every tunable of a match lives here with a `Default` matching the
//! standard ruleset. All structs deserialize from RON with missing fields
//! falling back to their defaults, so a config file only needs to name
//! what it changes.
//!
//! # Example RON
//!
//! ```ron
//! MatchConfig(
//!     seed: 7,
//!     map: MapConfig(width: 64, height: 64),
//!     starting_resources: 400.0,
//! )
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};

/// Map dimensions for terrain generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    /// Map width in tiles.
    pub width: u32,
    /// Map height in tiles.
    pub height: u32,
    /// Tile edge length in world pixels.
    pub tile_size: f32,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self::large()
    }
}

impl MapConfig {
    /// Create a small map (64x64 tiles).
    #[must_use]
    pub fn small() -> Self {
        Self {
            width: 64,
            height: 64,
            tile_size: 16.0,
        }
    }

    /// Create a medium map (96x96 tiles).
    #[must_use]
    pub fn medium() -> Self {
        Self {
            width: 96,
            height: 96,
            tile_size: 16.0,
        }
    }

    /// Create a large map (128x128 tiles), the standard battlefield.
    #[must_use]
    pub fn large() -> Self {
        Self {
            width: 128,
            height: 128,
            tile_size: 16.0,
        }
    }

    /// Map width in world pixels.
    #[must_use]
    pub fn world_width(&self) -> f32 {
        self.width as f32 * self.tile_size
    }

    /// Map height in world pixels.
    #[must_use]
    pub fn world_height(&self) -> f32 {
        self.height as f32 * self.tile_size
    }
}

/// Resource node scattering parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceFieldConfig {
    /// Total nodes to place (home nodes included).
    pub node_count: usize,
    /// Nodes placed close to each faction's HQ before random scattering.
    pub home_nodes_per_faction: usize,
    /// Minimum starting amount per node.
    pub min_amount: f32,
    /// Maximum starting amount per node.
    pub max_amount: f32,
    /// Minimum distance between two nodes, in tiles.
    pub min_spacing_tiles: u32,
    /// Minimum distance between a node and any structure, in tiles.
    pub structure_clearance_tiles: u32,
    /// Closest a home node may sit to its HQ, in tiles.
    pub home_min_distance: i32,
    /// Farthest a home node may sit from its HQ, in tiles.
    pub home_max_distance: i32,
}

impl Default for ResourceFieldConfig {
    fn default() -> Self {
        Self {
            node_count: 16,
            home_nodes_per_faction: 2,
            min_amount: 1200.0,
            max_amount: 2400.0,
            min_spacing_tiles: 6,
            structure_clearance_tiles: 4,
            home_min_distance: 5,
            home_max_distance: 9,
        }
    }
}

/// Timings and capacities of the worker gather/deposit cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomyTuning {
    /// Seconds a worker spends gathering before harvesting.
    pub gather_duration: f32,
    /// Seconds a worker spends unloading at a deposit.
    pub deposit_duration: f32,
    /// Maximum cargo harvested per trip.
    pub carry_capacity: f32,
    /// Arrival radius at a node, as a fraction of the tile size.
    pub resource_arrive_factor: f32,
    /// Extra arrival slack at a deposit beyond its radius, as a fraction of the tile size.
    pub deposit_arrive_factor: f32,
}

impl Default for EconomyTuning {
    fn default() -> Self {
        Self {
            gather_duration: 2.2,
            deposit_duration: 1.0,
            carry_capacity: 120.0,
            resource_arrive_factor: 0.8,
            deposit_arrive_factor: 0.6,
        }
    }
}

/// Complete configuration of a match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// Seed of the match random stream.
    pub seed: u64,
    /// Terrain dimensions.
    pub map: MapConfig,
    /// Resource field layout.
    pub resources: ResourceFieldConfig,
    /// Worker cycle tuning.
    pub economy: EconomyTuning,
    /// Resources each faction starts with.
    pub starting_resources: f32,
    /// Workers spawned next to each HQ at reset.
    pub initial_workers: u32,
    /// Radius (tiles) forced to grass around each HQ.
    pub hq_clear_radius: i32,
    /// Distance (tiles) of the preferred HQ corners from the map edge.
    pub hq_corner_inset: i32,
    /// Cap on living plus queued units per faction.
    pub max_units: usize,
    /// Cap on structures per faction.
    pub max_structures: usize,
    /// Cap on a single structure's production queue.
    pub max_queue_depth: usize,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            map: MapConfig::default(),
            resources: ResourceFieldConfig::default(),
            economy: EconomyTuning::default(),
            starting_resources: 250.0,
            initial_workers: 3,
            hq_clear_radius: 5,
            hq_corner_inset: 8,
            max_units: 80,
            max_structures: 14,
            max_queue_depth: 5,
        }
    }
}

impl MatchConfig {
    /// Set the random seed.
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the map dimensions.
    #[must_use]
    pub fn with_map(mut self, map: MapConfig) -> Self {
        self.map = map;
        self
    }

    /// Parse a configuration from RON text and validate it.
    pub fn from_ron_str(ron_text: &str) -> Result<Self> {
        let config: Self = ron::from_str(ron_text).map_err(|e| GameError::DataParseError {
            path: "<inline>".into(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| GameError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config: Self = ron::from_str(&text).map_err(|e| GameError::DataParseError {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the match setup cannot work with.
    pub fn validate(&self) -> Result<()> {
        let min_side = 2 * self.hq_corner_inset.max(0) as u32 + 4;
        if self.map.width < min_side || self.map.height < min_side {
            return Err(GameError::InvalidConfig(format!(
                "map {}x{} is too small for HQ inset {}",
                self.map.width, self.map.height, self.hq_corner_inset
            )));
        }
        if !self.map.tile_size.is_finite() || self.map.tile_size <= 0.0 {
            return Err(GameError::InvalidConfig("tile_size must be positive".into()));
        }
        let res = &self.resources;
        if !res.min_amount.is_finite()
            || !res.max_amount.is_finite()
            || res.min_amount <= 0.0
            || res.max_amount < res.min_amount
        {
            return Err(GameError::InvalidConfig(
                "resource amounts must satisfy 0 < min_amount <= max_amount".into(),
            ));
        }
        if res.home_min_distance < 0 || res.home_max_distance < res.home_min_distance {
            return Err(GameError::InvalidConfig(
                "home distances must satisfy 0 <= home_min_distance <= home_max_distance".into(),
            ));
        }
        if !self.economy.carry_capacity.is_finite() || self.economy.carry_capacity <= 0.0 {
            return Err(GameError::InvalidConfig("carry_capacity must be positive".into()));
        }
        if self.max_queue_depth == 0 {
            return Err(GameError::InvalidConfig("max_queue_depth must be at least 1".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = MatchConfig::default();
        assert_eq!(config.map.width, 128);
        assert_eq!(config.map.height, 128);
        assert_eq!(config.initial_workers, 3);
        assert!((config.economy.gather_duration - 2.2).abs() < f32::EPSILON);
        assert!((config.economy.carry_capacity - 120.0).abs() < f32::EPSILON);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_ron_uses_defaults() {
        let config = MatchConfig::from_ron_str(
            "MatchConfig(seed: 9, map: MapConfig(width: 64, height: 48), starting_resources: 500.0)",
        )
        .unwrap();
        assert_eq!(config.seed, 9);
        assert_eq!(config.map.width, 64);
        assert_eq!(config.map.height, 48);
        assert!((config.map.tile_size - 16.0).abs() < f32::EPSILON);
        assert!((config.starting_resources - 500.0).abs() < f32::EPSILON);
        assert_eq!(config.max_units, 80);
    }

    #[test]
    fn test_invalid_ron_reports_parse_error() {
        let err = MatchConfig::from_ron_str("MatchConfig(seed: \"nope\")").unwrap_err();
        assert!(matches!(err, GameError::DataParseError { .. }));
    }

    #[test]
    fn test_tiny_map_rejected() {
        let config = MatchConfig::default().with_map(MapConfig {
            width: 10,
            height: 10,
            tile_size: 16.0,
        });
        assert!(matches!(config.validate(), Err(GameError::InvalidConfig(_))));
    }

    #[test]
    fn test_negative_home_distance_rejected() {
        let mut config = MatchConfig::default().with_map(MapConfig::small());
        config.resources.home_min_distance = -3;
        config.resources.home_max_distance = -1;
        assert!(matches!(config.validate(), Err(GameError::InvalidConfig(_))));
        assert!(matches!(
            crate::simulation::Match::new(config),
            Err(GameError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_non_finite_amounts_rejected() {
        let mut config = MatchConfig::default();
        config.resources.max_amount = f32::NAN;
        assert!(config.validate().is_err());

        let mut config = MatchConfig::default();
        config.resources.min_amount = f32::NAN;
        assert!(config.validate().is_err());

        let mut config = MatchConfig::default();
        config.map.tile_size = f32::INFINITY;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_nan_amount_from_ron_rejected() {
        let err = MatchConfig::from_ron_str("MatchConfig(resources: ResourceFieldConfig(max_amount: NaN))")
            .unwrap_err();
        assert!(matches!(err, GameError::InvalidConfig(_)));
    }

    #[test]
    fn test_map_presets() {
        assert_eq!(MapConfig::small().width, 64);
        assert_eq!(MapConfig::medium().width, 96);
        assert!((MapConfig::large().world_width() - 2048.0).abs() < f32::EPSILON);
    }
}
