//! Proptest strategies for simulation inputs.

use commanders_core::math::TilePos;
use commanders_core::pathfinding::{NavGrid, TerrainKind, Tile};
use proptest::prelude::*;

/// A tile inside a `width` x `height` grid.
pub fn tile_in(width: u32, height: u32) -> impl Strategy<Value = TilePos> {
    (0..width as i32, 0..height as i32).prop_map(|(x, y)| TilePos::new(x, y))
}

/// Any terrain kind, weighted toward walkable ground.
pub fn terrain_kind() -> impl Strategy<Value = TerrainKind> {
    prop_oneof![
        5 => Just(TerrainKind::Grass),
        2 => Just(TerrainKind::Forest),
        1 => Just(TerrainKind::Water),
        1 => Just(TerrainKind::Mountain),
    ]
}

/// A random grid of the given size.
pub fn nav_grid(width: u32, height: u32) -> impl Strategy<Value = NavGrid> {
    proptest::collection::vec(terrain_kind(), (width * height) as usize).prop_map(move |kinds| {
        let tiles = kinds.into_iter().map(|k| Tile::new(k, 0.5)).collect();
        NavGrid::from_tiles(width, height, 16.0, tiles).unwrap_or_else(|| NavGrid::new(width, height, 16.0))
    })
}

/// A plausible sequence of frame deltas in seconds.
pub fn frame_deltas(len: usize) -> impl Strategy<Value = Vec<f32>> {
    proptest::collection::vec(0.005f32..0.1, len)
}
