//! ASCII map renderer.
//!
//! Renders terrain one character per tile for quick terminal review,
//! optionally overlaid with structures, units and resource nodes.
//!
//! | Char | Meaning |
//! |------|---------|
//! | `~`  | water |
//! | `.`  | grass |
//! | `"`  | forest |
//! | `^`  | mountain |
//! | `H`  | headquarters |
//! | `B`  | any other structure |
//! | `$`  | resource node |
//! | `a`  | unit of the first faction |
//! | `b`  | unit of the second faction |

use std::fmt::Write as _;

use commanders_core::data::StructureKind;
use commanders_core::math::Vec2;
use commanders_core::pathfinding::{NavGrid, TerrainKind};
use commanders_core::simulation::Match;

/// ASCII rendering options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AsciiConfig {
    /// Overlay structures, units and resource nodes.
    pub show_entities: bool,
    /// Append a legend with per-faction counts.
    pub show_legend: bool,
}

impl Default for AsciiConfig {
    fn default() -> Self {
        Self {
            show_entities: true,
            show_legend: true,
        }
    }
}

/// Character for a terrain kind.
#[must_use]
pub const fn terrain_char(kind: TerrainKind) -> char {
    match kind {
        TerrainKind::Water => '~',
        TerrainKind::Grass => '.',
        TerrainKind::Forest => '"',
        TerrainKind::Mountain => '^',
    }
}

const fn unit_char(faction_index: usize) -> char {
    if faction_index == 0 {
        'a'
    } else {
        'b'
    }
}

/// Character buffer the size of the grid.
struct Canvas {
    width: usize,
    cells: Vec<char>,
}

impl Canvas {
    fn from_grid(grid: &NavGrid) -> Self {
        Self {
            width: grid.width() as usize,
            cells: grid.tiles().iter().map(|t| terrain_char(t.kind)).collect(),
        }
    }

    fn plot(&mut self, grid: &NavGrid, position: Vec2, c: char) {
        let tile = grid.world_to_tile(position);
        if grid.in_bounds(tile) {
            let idx = tile.y as usize * self.width + tile.x as usize;
            self.cells[idx] = c;
        }
    }

    fn into_string(self) -> String {
        let mut out = String::with_capacity(self.cells.len() + self.cells.len() / self.width.max(1));
        for row in self.cells.chunks(self.width.max(1)) {
            out.extend(row);
            out.push('\n');
        }
        out
    }
}

/// Render terrain only.
#[must_use]
pub fn render_terrain(grid: &NavGrid) -> String {
    Canvas::from_grid(grid).into_string()
}

/// Render a match.
///
/// Later layers overwrite earlier ones: nodes, then units, then structures.
#[must_use]
pub fn render_ascii(game: &Match, config: &AsciiConfig) -> String {
    let grid = game.grid();
    let mut canvas = Canvas::from_grid(grid);

    if config.show_entities {
        for node in game.resource_nodes() {
            canvas.plot(grid, node.position, '$');
        }
        for (index, faction) in game.factions().iter().enumerate() {
            for unit in faction.units.iter().filter(|u| u.alive()) {
                canvas.plot(grid, unit.position(), unit_char(index));
            }
        }
        for faction in game.factions() {
            for structure in faction.structures.iter().filter(|s| s.alive()) {
                let c = if structure.kind() == StructureKind::Hq { 'H' } else { 'B' };
                canvas.plot(grid, structure.position(), c);
            }
        }
    }

    let mut out = canvas.into_string();
    if config.show_legend {
        let _ = writeln!(
            out,
            "seed {} | {}x{} | t={:.1}s | nodes {}",
            game.config().seed,
            grid.width(),
            grid.height(),
            game.elapsed_time(),
            game.resource_nodes().len()
        );
        for (index, faction) in game.factions().iter().enumerate() {
            let _ = writeln!(
                out,
                "{} {:<12} units {:>3}  structures {:>2}  resources {:>7.1}  tech {}",
                unit_char(index),
                faction.profile.name,
                faction.units.len(),
                faction.structures.len(),
                faction.resources,
                faction.tech_level
            );
        }
    }
    out
}
