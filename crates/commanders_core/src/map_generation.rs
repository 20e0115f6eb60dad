//! Procedural terrain generation.
//!
//! Generates maps with:
//! - Contiguous land and water regions from a smoothed noise field
//! - More walkable land toward the centre of the map
//! - Local overrides for base footprints and land bridges

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::config::MapConfig;
use crate::math::TilePos;
use crate::pathfinding::{NavGrid, Tile};

/// Amplitude of the noise re-added after each smoothing pass.
const PERTURBATION: f32 = 0.08;

/// How strongly elevation falls off with distance from the centre.
const CENTER_BIAS: f32 = 0.35;

/// Generate a classified grid from a random source.
///
/// The result depends only on `config` and the state of `rng`.
#[must_use]
pub fn generate_map<R: Rng>(config: &MapConfig, rng: &mut R) -> NavGrid {
    let width = config.width.max(1) as usize;
    let height = config.height.max(1) as usize;

    let mut values: Vec<f32> = (0..width * height).map(|_| rng.gen::<f32>()).collect();

    let passes = (width.max(height) / 16).max(4);
    for _ in 0..passes {
        values = smooth(&values, width, height);
        perturb(&mut values, rng);
    }

    let cx = width as f32 / 2.0;
    let cy = height as f32 / 2.0;
    let max_dist = cx.hypot(cy);

    let tiles = values
        .iter()
        .enumerate()
        .map(|(i, &v)| {
            let x = (i % width) as f32;
            let y = (i / width) as f32;
            let dist = (x - cx).hypot(y - cy) / max_dist;
            Tile::from_elevation((v - dist * CENTER_BIAS).clamp(0.0, 1.0))
        })
        .collect();

    NavGrid::from_tiles(width as u32, height as u32, config.tile_size, tiles)
        .unwrap_or_else(|| NavGrid::new(width as u32, height as u32, 16.0))
}

/// Generate a map from a seed alone.
#[must_use]
pub fn generate_map_seeded(config: &MapConfig, seed: u64) -> NavGrid {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    generate_map(config, &mut rng)
}

/// 3x3 box blur, averaging only in-bounds neighbours.
fn smooth(values: &[f32], width: usize, height: usize) -> Vec<f32> {
    let mut out = vec![0.0; values.len()];
    for y in 0..height {
        for x in 0..width {
            let mut total = 0.0;
            let mut count = 0u32;
            for ny in y.saturating_sub(1)..(y + 2).min(height) {
                for nx in x.saturating_sub(1)..(x + 2).min(width) {
                    total += values[ny * width + nx];
                    count += 1;
                }
            }
            out[y * width + x] = total / count as f32;
        }
    }
    out
}

fn perturb<R: Rng>(values: &mut [f32], rng: &mut R) {
    for v in values.iter_mut() {
        let offset = rng.gen_range(-PERTURBATION..=PERTURBATION);
        *v = (*v + offset).clamp(0.0, 1.0);
    }
}

/// Stamp every tile within `radius` (Euclidean) of `center` as cleared grass.
pub fn force_clear_area(grid: &mut NavGrid, center: TilePos, radius: i32) {
    let r = radius as f32;
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            if (dx as f32).hypot(dy as f32) <= r {
                grid.set_tile(center.offset(dx, dy), Tile::cleared());
            }
        }
    }
}

/// Carve a walkable corridor from `start` to `end`.
///
/// Walks a staircase that always steps along the axis with the larger
/// remaining delta, clearing a disc of `radius` at every step. Both
/// endpoints end up walkable and 4-connected.
pub fn carve_path(grid: &mut NavGrid, start: TilePos, end: TilePos, radius: i32) {
    let mut current = start;
    force_clear_area(grid, current, radius);
    while current != end {
        let dx = end.x - current.x;
        let dy = end.y - current.y;
        current = if dx.abs() >= dy.abs() {
            current.offset(dx.signum(), 0)
        } else {
            current.offset(0, dy.signum())
        };
        force_clear_area(grid, current, radius);
    }
}
