//! Navigation grid and weighted A* search.
//!
//! Movement is 4-connected. Stepping between two adjacent tiles costs the
//! average of both tiles' movement costs, so leaving grass into forest is
//! already penalized. Costs accumulate in fixed-point for a total ordering
//! of the open set.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use serde::{Deserialize, Serialize};

use crate::math::{ring, Fixed, TilePos, Vec2};

/// Maximum node expansions before a search gives up.
pub const MAX_EXPANSIONS: usize = 6000;

/// Terrain classification of a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TerrainKind {
    /// Impassable water.
    Water,
    /// Open ground (cost: 1).
    #[default]
    Grass,
    /// Slow ground (cost: 1.7).
    Forest,
    /// Impassable high ground.
    Mountain,
}

impl TerrainKind {
    /// Movement cost of this terrain.
    ///
    /// Unwalkable kinds keep a cost for completeness; the pathfinder never
    /// steps onto them.
    #[must_use]
    pub const fn movement_cost(self) -> f32 {
        match self {
            Self::Water => 10.0,
            Self::Grass => 1.0,
            Self::Forest => 1.7,
            Self::Mountain => 12.0,
        }
    }

    /// Returns true if units may stand on this terrain.
    #[must_use]
    pub const fn is_walkable(self) -> bool {
        matches!(self, Self::Grass | Self::Forest)
    }

    /// Classify a normalized elevation.
    #[must_use]
    pub fn classify(elevation: f32) -> Self {
        if elevation < 0.26 {
            Self::Water
        } else if elevation < 0.55 {
            Self::Grass
        } else if elevation < 0.78 {
            Self::Forest
        } else {
            Self::Mountain
        }
    }
}

/// One classified cell of the map.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tile {
    /// Terrain classification.
    pub kind: TerrainKind,
    /// Elevation in `[0, 1]`.
    pub elevation: f32,
    /// Cost of moving through this tile.
    pub movement_cost: f32,
}

impl Tile {
    /// Create a tile of the given kind.
    #[must_use]
    pub const fn new(kind: TerrainKind, elevation: f32) -> Self {
        Self {
            kind,
            elevation,
            movement_cost: kind.movement_cost(),
        }
    }

    /// Classify an elevation into a tile.
    #[must_use]
    pub fn from_elevation(elevation: f32) -> Self {
        Self::new(TerrainKind::classify(elevation), elevation)
    }

    /// Flat grass at mid elevation, used for cleared areas.
    #[must_use]
    pub const fn cleared() -> Self {
        Self::new(TerrainKind::Grass, 0.5)
    }

    /// Returns true if units may stand on this tile.
    #[must_use]
    pub const fn is_walkable(&self) -> bool {
        self.kind.is_walkable()
    }
}

impl Default for Tile {
    fn default() -> Self {
        Self::cleared()
    }
}

/// Navigation grid for pathfinding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavGrid {
    /// Grid width in tiles.
    width: u32,
    /// Grid height in tiles.
    height: u32,
    /// Tile edge length in world pixels.
    tile_size: f32,
    /// Tile data stored in row-major order.
    tiles: Vec<Tile>,
}

/// 4-connected neighbour offsets.
const DIRECTIONS: [(i32, i32); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

impl NavGrid {
    /// Create a grid with every tile cleared grass.
    ///
    /// # Panics
    ///
    /// Panics if `width` or `height` is zero, or if `tile_size` is not positive.
    #[must_use]
    pub fn new(width: u32, height: u32, tile_size: f32) -> Self {
        Self::filled(width, height, tile_size, Tile::cleared())
    }

    /// Create a grid with every tile set to `tile`.
    ///
    /// # Panics
    ///
    /// Panics if `width` or `height` is zero, or if `tile_size` is not positive.
    #[must_use]
    pub fn filled(width: u32, height: u32, tile_size: f32, tile: Tile) -> Self {
        assert!(width > 0, "NavGrid width must be positive");
        assert!(height > 0, "NavGrid height must be positive");
        assert!(tile_size > 0.0, "NavGrid tile_size must be positive");

        Self {
            width,
            height,
            tile_size,
            tiles: vec![tile; (width as usize) * (height as usize)],
        }
    }

    /// Build a grid from row-major tiles.
    ///
    /// Returns `None` if the tile count does not match the dimensions.
    #[must_use]
    pub fn from_tiles(width: u32, height: u32, tile_size: f32, tiles: Vec<Tile>) -> Option<Self> {
        if width == 0
            || height == 0
            || tile_size <= 0.0
            || tiles.len() != (width as usize) * (height as usize)
        {
            return None;
        }
        Some(Self {
            width,
            height,
            tile_size,
            tiles,
        })
    }

    /// Grid width in tiles.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Grid height in tiles.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Tile edge length in world pixels.
    #[must_use]
    pub const fn tile_size(&self) -> f32 {
        self.tile_size
    }

    /// Row-major tiles.
    #[must_use]
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    #[inline]
    fn index(&self, pos: TilePos) -> Option<usize> {
        if self.in_bounds(pos) {
            Some((pos.y as usize) * (self.width as usize) + (pos.x as usize))
        } else {
            None
        }
    }

    /// Check if coordinates are within grid bounds.
    #[must_use]
    pub fn in_bounds(&self, pos: TilePos) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as u32) < self.width && (pos.y as u32) < self.height
    }

    /// Tile at coordinates, or `None` if out of bounds.
    #[must_use]
    pub fn tile(&self, pos: TilePos) -> Option<&Tile> {
        self.index(pos).map(|i| &self.tiles[i])
    }

    /// Replace the tile at coordinates.
    /// Returns `false` if out of bounds.
    pub fn set_tile(&mut self, pos: TilePos, tile: Tile) -> bool {
        match self.index(pos) {
            Some(i) => {
                self.tiles[i] = tile;
                true
            }
            None => false,
        }
    }

    /// Check if a tile is in bounds and walkable.
    #[must_use]
    pub fn is_walkable(&self, pos: TilePos) -> bool {
        self.tile(pos).is_some_and(Tile::is_walkable)
    }

    /// Movement cost of a tile, or `None` if out of bounds.
    #[must_use]
    pub fn movement_cost(&self, pos: TilePos) -> Option<f32> {
        self.tile(pos).map(|t| t.movement_cost)
    }

    /// In-bounds walkable neighbours (west, east, north, south).
    pub fn neighbors(&self, pos: TilePos) -> impl Iterator<Item = TilePos> + '_ {
        DIRECTIONS
            .iter()
            .map(move |&(dx, dy)| pos.offset(dx, dy))
            .filter(move |n| self.is_walkable(*n))
    }

    /// Tile containing a world position. May be out of bounds.
    #[must_use]
    pub fn world_to_tile(&self, pos: Vec2) -> TilePos {
        TilePos::new(
            (pos.x / self.tile_size).floor() as i32,
            (pos.y / self.tile_size).floor() as i32,
        )
    }

    /// World position of a tile's centre.
    #[must_use]
    pub fn tile_to_world(&self, pos: TilePos) -> Vec2 {
        let half = self.tile_size / 2.0;
        Vec2::new(
            pos.x as f32 * self.tile_size + half,
            pos.y as f32 * self.tile_size + half,
        )
    }

    /// Nearest walkable tile by Chebyshev ring, searching out to `max_radius`.
    #[must_use]
    pub fn nearest_walkable(&self, center: TilePos, max_radius: i32) -> Option<TilePos> {
        (0..=max_radius)
            .flat_map(|radius| ring(center, radius))
            .find(|t| self.is_walkable(*t))
    }

    /// First walkable tile in row-major order.
    #[must_use]
    pub fn first_walkable(&self) -> Option<TilePos> {
        self.tiles.iter().position(Tile::is_walkable).map(|i| {
            let w = self.width as usize;
            TilePos::new((i % w) as i32, (i / w) as i32)
        })
    }

    /// Number of walkable tiles.
    #[must_use]
    pub fn walkable_count(&self) -> usize {
        self.tiles.iter().filter(|t| t.is_walkable()).count()
    }
}

/// A node in the A* open set priority queue.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
struct AStarNode {
    pos: TilePos,
    f_score: Fixed,
    g_score: Fixed,
    /// Row-major index, lower first on full ties.
    tie_breaker: u64,
}

impl Ord for AStarNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap: lower f wins, then deeper g, then lower index.
        other
            .f_score
            .cmp(&self.f_score)
            .then_with(|| self.g_score.cmp(&other.g_score))
            .then_with(|| other.tie_breaker.cmp(&self.tie_breaker))
    }
}

impl PartialOrd for AStarNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[inline]
fn manhattan_heuristic(a: TilePos, b: TilePos) -> Fixed {
    Fixed::from_num(a.manhattan(b))
}

#[inline]
fn tie_breaker(grid: &NavGrid, pos: TilePos) -> u64 {
    (pos.y as u64) * u64::from(grid.width) + (pos.x as u64)
}

/// Find a path from `start` to `goal`, both inclusive.
///
/// Returns `None` when the goal is out of bounds or unwalkable, when no
/// route exists, or when the search exceeds [`MAX_EXPANSIONS`].
#[must_use]
pub fn find_path(grid: &NavGrid, start: TilePos, goal: TilePos) -> Option<Vec<TilePos>> {
    find_path_with_budget(grid, start, goal, MAX_EXPANSIONS)
}

/// [`find_path`] with an explicit expansion budget.
#[must_use]
pub fn find_path_with_budget(
    grid: &NavGrid,
    start: TilePos,
    goal: TilePos,
    max_expansions: usize,
) -> Option<Vec<TilePos>> {
    if start == goal {
        return Some(vec![start]);
    }
    if !grid.is_walkable(goal) {
        return None;
    }

    let mut open_set: BinaryHeap<AStarNode> = BinaryHeap::new();
    let mut came_from: HashMap<TilePos, TilePos> = HashMap::new();
    let mut g_score: HashMap<TilePos, Fixed> = HashMap::new();

    g_score.insert(start, Fixed::ZERO);
    open_set.push(AStarNode {
        pos: start,
        f_score: manhattan_heuristic(start, goal),
        g_score: Fixed::ZERO,
        tie_breaker: tie_breaker(grid, start),
    });

    let mut expansions = 0usize;
    while let Some(current) = open_set.pop() {
        if current.pos == goal {
            return Some(reconstruct_path(&came_from, goal));
        }

        // Superseded by a cheaper push of the same tile.
        if g_score
            .get(&current.pos)
            .is_some_and(|&best| current.g_score > best)
        {
            continue;
        }

        expansions += 1;
        if expansions > max_expansions {
            tracing::trace!(?start, ?goal, "path search exhausted its budget");
            return None;
        }

        // Start may be off-grid or unwalkable; its cost still averages in.
        let current_cost = grid
            .movement_cost(current.pos)
            .unwrap_or_else(|| TerrainKind::Grass.movement_cost());

        for neighbor in grid.neighbors(current.pos) {
            let Some(neighbor_cost) = grid.movement_cost(neighbor) else {
                continue;
            };
            let step = Fixed::from_num((current_cost + neighbor_cost) * 0.5);
            let tentative_g = current.g_score + step;

            if tentative_g < g_score.get(&neighbor).copied().unwrap_or(Fixed::MAX) {
                came_from.insert(neighbor, current.pos);
                g_score.insert(neighbor, tentative_g);
                open_set.push(AStarNode {
                    pos: neighbor,
                    f_score: tentative_g + manhattan_heuristic(neighbor, goal),
                    g_score: tentative_g,
                    tie_breaker: tie_breaker(grid, neighbor),
                });
            }
        }
    }

    None
}

/// Reconstruct path from came_from map.
fn reconstruct_path(came_from: &HashMap<TilePos, TilePos>, goal: TilePos) -> Vec<TilePos> {
    let mut path = vec![goal];
    let mut current = goal;
    while let Some(&prev) = came_from.get(&current) {
        path.push(prev);
        current = prev;
    }
    path.reverse();
    path
}

/// Sum of edge costs along a path.
#[must_use]
pub fn path_cost(grid: &NavGrid, path: &[TilePos]) -> Option<Fixed> {
    path.windows(2).try_fold(Fixed::ZERO, |acc, pair| {
        let a = grid.movement_cost(pair[0])?;
        let b = grid.movement_cost(pair[1])?;
        Some(acc + Fixed::from_num((a + b) * 0.5))
    })
}
