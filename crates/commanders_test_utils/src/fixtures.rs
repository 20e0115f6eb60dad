//! Hand-built grids and worlds for scripted scenarios.
//!
//! Generated terrain is noisy; these fixtures give tests a fully known
//! map so distances, paths and timings can be asserted exactly.

use std::sync::Arc;

use commanders_core::config::MatchConfig;
use commanders_core::data::{Blueprints, StructureKind, UnitKind};
use commanders_core::factions::FactionId;
use commanders_core::math::TilePos;
use commanders_core::pathfinding::{NavGrid, TerrainKind, Tile};
use commanders_core::simulation::Match;
use commanders_core::world::World;

/// Faction 0.
pub const RED: FactionId = FactionId(0);
/// Faction 1.
pub const BLUE: FactionId = FactionId(1);

/// Tile edge length used by every fixture.
pub const TILE_SIZE: f32 = 16.0;

/// All-grass grid.
#[must_use]
pub fn open_grid(width: u32, height: u32) -> NavGrid {
    NavGrid::new(width, height, TILE_SIZE)
}

/// Grass grid split by a water column at `x`, optionally with a one-tile
/// gap at row `gap`.
#[must_use]
pub fn walled_grid(width: u32, height: u32, x: i32, gap: Option<i32>) -> NavGrid {
    let mut grid = open_grid(width, height);
    for y in 0..height as i32 {
        if Some(y) != gap {
            grid.set_tile(TilePos::new(x, y), Tile::new(TerrainKind::Water, 0.1));
        }
    }
    grid
}

/// Paint a rectangle of terrain, inclusive of both corners.
pub fn paint(grid: &mut NavGrid, from: TilePos, to: TilePos, kind: TerrainKind) {
    for y in from.y.min(to.y)..=from.y.max(to.y) {
        for x in from.x.min(to.x)..=from.x.max(to.x) {
            grid.set_tile(TilePos::new(x, y), Tile::new(kind, 0.5));
        }
    }
}

/// Load the standard blueprint table.
///
/// # Panics
///
/// Panics if the embedded table fails to parse.
#[must_use]
pub fn standard_blueprints() -> Arc<Blueprints> {
    Arc::new(Blueprints::standard().expect("standard blueprints must load"))
}

/// Empty world on `grid` with default rules.
#[must_use]
pub fn empty_world(grid: NavGrid) -> World {
    World::new(grid, standard_blueprints(), MatchConfig::default(), 0)
}

/// Builder for scripted worlds.
#[derive(Debug)]
pub struct WorldBuilder {
    world: World,
}

impl WorldBuilder {
    /// Start from an open grid.
    #[must_use]
    pub fn open(width: u32, height: u32) -> Self {
        Self::on(open_grid(width, height))
    }

    /// Start from a custom grid.
    #[must_use]
    pub fn on(grid: NavGrid) -> Self {
        Self {
            world: empty_world(grid),
        }
    }

    /// Replace the rules in effect.
    #[must_use]
    pub fn with_config(mut self, config: MatchConfig) -> Self {
        self.world.config = config;
        self
    }

    /// Set a faction's resources.
    #[must_use]
    pub fn with_resources(mut self, owner: FactionId, amount: f32) -> Self {
        if let Some(f) = self.world.faction_mut(owner) {
            f.resources = amount;
        }
        self
    }

    /// Place a finished structure.
    ///
    /// # Panics
    ///
    /// Panics if the tile is out of bounds.
    #[must_use]
    pub fn structure(mut self, owner: FactionId, kind: StructureKind, x: i32, y: i32) -> Self {
        self.world
            .place_structure(owner, kind, TilePos::new(x, y), true)
            .expect("structure placement failed");
        self
    }

    /// Spawn a unit.
    ///
    /// # Panics
    ///
    /// Panics if the tile is out of bounds.
    #[must_use]
    pub fn unit(mut self, owner: FactionId, kind: UnitKind, x: i32, y: i32) -> Self {
        self.world
            .spawn_unit(owner, kind, TilePos::new(x, y))
            .expect("unit spawn failed");
        self
    }

    /// Add a resource node.
    #[must_use]
    pub fn node(mut self, x: i32, y: i32, amount: f32) -> Self {
        self.world.add_resource_node(TilePos::new(x, y), amount);
        self
    }

    /// Finish as a bare world.
    #[must_use]
    pub fn build(mut self) -> World {
        for faction in &mut self.world.factions {
            faction.refresh();
        }
        self.world
    }

    /// Finish as a match with controllers seeded from `seed`.
    #[must_use]
    pub fn into_match(self, seed: u64) -> Match {
        Match::from_world(self.build(), seed)
    }
}

/// Two HQs in opposite corners of an open 32x32 map and nothing else.
#[must_use]
pub fn two_base_world() -> WorldBuilder {
    WorldBuilder::open(32, 32)
        .structure(RED, StructureKind::Hq, 4, 4)
        .structure(BLUE, StructureKind::Hq, 27, 27)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_walled_grid_gap() {
        let grid = walled_grid(10, 10, 5, Some(3));
        assert!(!grid.is_walkable(TilePos::new(5, 2)));
        assert!(grid.is_walkable(TilePos::new(5, 3)));
    }

    #[test]
    fn test_builder_refreshes_factions() {
        let world = two_base_world().build();
        assert!(world.factions.iter().all(|f| !f.defeated));
        let empty = WorldBuilder::open(8, 8).build();
        assert!(empty.factions.iter().all(|f| f.defeated));
    }
}
