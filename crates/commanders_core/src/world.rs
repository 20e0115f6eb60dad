//! Mutable match state and the factory operations that change it.
//!
//! Every creation and order goes through here so invariants hold in one
//! place: ids come from the single [`IdAllocator`], costs are deducted when
//! a request is accepted, and a declined request leaves the world untouched.
//! Requests never fail loudly; they return `None` or `false` and log the
//! reason at debug level.

use std::sync::Arc;

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use crate::buildings::Structure;
use crate::components::{Body, EntityId, IdAllocator};
use crate::config::MatchConfig;
use crate::data::{Blueprints, StructureKind, UnitDefinition, UnitKind};
use crate::economy::ResourceNode;
use crate::factions::{FactionId, FactionProfile, FactionState};
use crate::math::{ring, TilePos, Vec2};
use crate::pathfinding::{find_path, NavGrid};
use crate::units::Unit;

/// How far an unwalkable order target is snapped to walkable ground.
pub const NEAREST_WALKABLE_RADIUS: i32 = 9;

/// Manhattan radius searched for a free spawn tile.
pub const SPAWN_SEARCH_RADIUS: i32 = 7;

/// Random offset (pixels) applied to spawned units.
const SPAWN_JITTER: f32 = 2.0;

/// Chebyshev rings searched for a construction site.
const PLACEMENT_MIN_RING: i32 = 3;
const PLACEMENT_MAX_RING: i32 = 10;

/// Minimum Chebyshev distance between a new site and any structure.
const STRUCTURE_SPACING: u32 = 3;

/// Minimum Chebyshev distance between a new site and any resource node.
const SITE_NODE_CLEARANCE: u32 = 2;

/// Resource nodes keep this many tiles away from the map edge.
const NODE_EDGE_MARGIN: i32 = 4;

/// Attempts per home node before giving up.
const HOME_NODE_ATTEMPTS: usize = 200;

/// Attempts per scattered node before giving up.
const FIELD_NODE_ATTEMPTS: usize = 100;

/// All mutable state of a running match.
#[derive(Debug, Clone)]
pub struct World {
    /// Terrain.
    pub grid: NavGrid,
    /// Shared blueprint table.
    pub blueprints: Arc<Blueprints>,
    /// Rules in effect.
    pub config: MatchConfig,
    /// Factions, indexed by [`FactionId::index`].
    pub factions: Vec<FactionState>,
    /// Resource nodes still on the map.
    pub nodes: Vec<ResourceNode>,
    /// Match-wide id counter.
    pub ids: IdAllocator,
    /// Stream for spawn jitter, site choice and anchor fallback.
    pub rng: ChaCha8Rng,
}

impl World {
    /// Create a world with both standard factions and nothing placed.
    #[must_use]
    pub fn new(grid: NavGrid, blueprints: Arc<Blueprints>, config: MatchConfig, seed: u64) -> Self {
        let factions = FactionProfile::standard()
            .into_iter()
            .enumerate()
            .map(|(i, profile)| {
                FactionState::new(FactionId(i as u8), profile, config.starting_resources)
            })
            .collect();
        Self {
            grid,
            blueprints,
            config,
            factions,
            nodes: Vec::new(),
            ids: IdAllocator::new(),
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Faction state by id.
    #[must_use]
    pub fn faction(&self, id: FactionId) -> Option<&FactionState> {
        self.factions.get(id.index())
    }

    /// Mutable faction state by id.
    pub fn faction_mut(&mut self, id: FactionId) -> Option<&mut FactionState> {
        self.factions.get_mut(id.index())
    }

    /// Find a unit of any faction.
    #[must_use]
    pub fn find_unit(&self, id: EntityId) -> Option<&Unit> {
        self.factions
            .iter()
            .flat_map(|f| f.units.iter())
            .find(|u| u.id() == id)
    }

    /// Find a structure of any faction.
    #[must_use]
    pub fn find_structure(&self, id: EntityId) -> Option<&Structure> {
        self.factions
            .iter()
            .flat_map(|f| f.structures.iter())
            .find(|s| s.id() == id)
    }

    /// Find a resource node.
    #[must_use]
    pub fn find_node(&self, id: EntityId) -> Option<&ResourceNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    // ------------------------------------------------------------------
    // Placement
    // ------------------------------------------------------------------

    /// Place a structure on a tile without charging for it.
    ///
    /// Used for headquarters at setup and for building test scenarios.
    pub fn place_structure(
        &mut self,
        owner: FactionId,
        kind: StructureKind,
        tile: TilePos,
        completed: bool,
    ) -> Option<EntityId> {
        let definition = Arc::clone(self.blueprints.structure(kind)?);
        if self.faction(owner).is_none() || !self.grid.in_bounds(tile) {
            return None;
        }
        let id = self.ids.next_id();
        let body = Body::new(
            id,
            owner,
            self.grid.tile_to_world(tile),
            definition.radius,
            definition.health,
        );
        let structure = if completed {
            Structure::completed(body, definition)
        } else {
            Structure::under_construction(body, definition)
        };
        let faction = self.faction_mut(owner)?;
        faction.structures.push(structure);
        faction.tech_level = crate::factions::tech_level(&faction.structures);
        Some(id)
    }

    /// Spawn a unit of `kind` on `tile` with a small random offset.
    pub fn spawn_unit(&mut self, owner: FactionId, kind: UnitKind, tile: TilePos) -> Option<EntityId> {
        let definition = Arc::clone(self.blueprints.unit(kind)?);
        self.spawn_unit_from(owner, definition, tile)
    }

    pub(crate) fn spawn_unit_from(
        &mut self,
        owner: FactionId,
        definition: Arc<UnitDefinition>,
        tile: TilePos,
    ) -> Option<EntityId> {
        if self.faction(owner).is_none() || !self.grid.in_bounds(tile) {
            return None;
        }
        let jitter = Vec2::new(
            self.rng.gen_range(-SPAWN_JITTER..=SPAWN_JITTER),
            self.rng.gen_range(-SPAWN_JITTER..=SPAWN_JITTER),
        );
        let id = self.ids.next_id();
        let body = Body::new(
            id,
            owner,
            self.grid.tile_to_world(tile) + jitter,
            definition.radius,
            definition.health,
        );
        self.faction_mut(owner)?.units.push(Unit::new(body, definition));
        Some(id)
    }

    /// Add a resource node at a tile centre.
    pub fn add_resource_node(&mut self, tile: TilePos, amount: f32) -> EntityId {
        let id = self.ids.next_id();
        self.nodes
            .push(ResourceNode::new(id, self.grid.tile_to_world(tile), amount));
        id
    }

    /// A living unit or any structure stands on the tile.
    #[must_use]
    pub fn is_tile_occupied(&self, tile: TilePos) -> bool {
        self.factions.iter().any(|f| {
            f.units
                .iter()
                .any(|u| u.alive() && u.tile(&self.grid) == tile)
                || f.structures.iter().any(|s| self.grid.world_to_tile(s.position()) == tile)
        })
    }

    /// First free walkable tile within [`SPAWN_SEARCH_RADIUS`] (Manhattan)
    /// of `origin`, nearest rings first.
    #[must_use]
    pub fn find_spawn_tile(&self, origin: TilePos) -> Option<TilePos> {
        for radius in 1..=SPAWN_SEARCH_RADIUS {
            for dy in -radius..=radius {
                for dx in -radius..=radius {
                    if dx.abs() + dy.abs() > radius {
                        continue;
                    }
                    let tile = origin.offset(dx, dy);
                    if self.grid.is_walkable(tile) && !self.is_tile_occupied(tile) {
                        return Some(tile);
                    }
                }
            }
        }
        None
    }

    fn site_is_valid(&self, tile: TilePos) -> bool {
        let footprint_clear = ring(tile, 1)
            .chain(std::iter::once(tile))
            .all(|t| self.grid.is_walkable(t));
        if !footprint_clear {
            return false;
        }
        let near_structure = self.factions.iter().flat_map(|f| f.structures.iter()).any(|s| {
            self.grid.world_to_tile(s.position()).chebyshev(tile) < STRUCTURE_SPACING
        });
        let near_node = self
            .nodes
            .iter()
            .any(|n| self.grid.world_to_tile(n.position).chebyshev(tile) < SITE_NODE_CLEARANCE);
        !near_structure && !near_node
    }

    /// Pick a construction site around the faction's base.
    ///
    /// Searches Chebyshev rings around the HQ (or the first living
    /// structure) and picks randomly within the nearest ring that has a
    /// valid site.
    pub fn find_construction_site(&mut self, owner: FactionId) -> Option<TilePos> {
        let faction = self.faction(owner)?;
        let anchor = faction
            .hq()
            .or_else(|| faction.structures.iter().find(|s| s.alive()))?;
        let anchor = self.grid.world_to_tile(anchor.position());

        for radius in PLACEMENT_MIN_RING..=PLACEMENT_MAX_RING {
            let candidates: Vec<TilePos> = ring(anchor, radius)
                .filter(|t| self.site_is_valid(*t))
                .collect();
            if let Some(site) = candidates.choose(&mut self.rng) {
                return Some(*site);
            }
        }
        None
    }

    // ------------------------------------------------------------------
    // Requests
    // ------------------------------------------------------------------

    /// Start building a structure near the faction's base.
    ///
    /// Declines on tech gate, cost, structure cap, or no valid site.
    /// On success the cost is deducted and the new structure's id returned.
    pub fn start_structure_construction(
        &mut self,
        owner: FactionId,
        kind: StructureKind,
    ) -> Option<EntityId> {
        let definition = Arc::clone(self.blueprints.structure(kind)?);
        let max_structures = self.config.max_structures;
        let faction = self.faction(owner)?;

        if faction.tech_level < definition.required_tech {
            debug!(%owner, %kind, "construction declined: tech level too low");
            return None;
        }
        if faction.resources < definition.cost {
            debug!(%owner, %kind, "construction declined: cannot afford");
            return None;
        }
        if faction.structures.iter().filter(|s| s.alive()).count() >= max_structures {
            debug!(%owner, %kind, "construction declined: structure cap reached");
            return None;
        }
        let Some(site) = self.find_construction_site(owner) else {
            debug!(%owner, %kind, "construction declined: no site");
            return None;
        };

        let id = self.place_structure(owner, kind, site, false)?;
        let faction = self.faction_mut(owner)?;
        faction.resources -= definition.cost;
        faction.stats.resources_spent += definition.cost;
        faction.stats.structures_started += 1;
        debug!(%owner, %kind, id, ?site, "construction started");
        Some(id)
    }

    /// Queue a unit at one of the faction's structures.
    ///
    /// Declines unless the structure is operational, owned and able to
    /// train `kind`, the tech gate and cost are met, the queue has room,
    /// and the faction is below its population cap.
    pub fn queue_unit_production(
        &mut self,
        owner: FactionId,
        structure_id: EntityId,
        kind: UnitKind,
    ) -> bool {
        let Some(definition) = self.blueprints.unit(kind).map(Arc::clone) else {
            return false;
        };
        let max_queue = self.config.max_queue_depth;
        let max_units = self.config.max_units;
        let Some(faction) = self.faction_mut(owner) else {
            return false;
        };

        let population = faction.population();
        let tech_level = faction.tech_level;
        let resources = faction.resources;
        let Some(structure) = faction
            .structures
            .iter_mut()
            .find(|s| s.id() == structure_id)
        else {
            return false;
        };

        if !structure.can_produce(kind)
            || tech_level < definition.tech_level
            || resources < definition.cost
            || structure.production_queue.len() >= max_queue
            || population >= max_units
        {
            debug!(%owner, %kind, structure_id, "production declined");
            return false;
        }

        let cost = definition.cost;
        structure.enqueue(definition);
        faction.resources -= cost;
        faction.stats.resources_spent += cost;
        true
    }

    /// Order a unit of `owner` to walk to `tile`.
    pub fn order_unit_to_tile(&mut self, owner: FactionId, unit_id: EntityId, tile: TilePos) -> bool {
        let Some(faction) = self.factions.get_mut(owner.index()) else {
            return false;
        };
        let Some(unit) = faction.units.iter_mut().find(|u| u.id() == unit_id) else {
            return false;
        };
        order_unit(&self.grid, unit, tile)
    }

    /// Pick a random point to attack: a random enemy with anything alive,
    /// then one of its living structures or units.
    pub fn choose_attack_target<R: Rng>(&self, owner: FactionId, rng: &mut R) -> Option<TilePos> {
        let enemies: Vec<&FactionState> = self
            .factions
            .iter()
            .filter(|f| f.id != owner && f.has_presence())
            .collect();
        let enemy = enemies.choose(rng)?;
        let candidates: Vec<TilePos> = enemy
            .structures
            .iter()
            .filter(|s| s.alive())
            .map(|s| self.grid.world_to_tile(s.position()))
            .chain(
                enemy
                    .units
                    .iter()
                    .filter(|u| u.alive())
                    .map(|u| u.tile(&self.grid)),
            )
            .collect();
        candidates.choose(rng).copied()
    }

    /// Reference point a worker uses to choose its next node: the HQ,
    /// else a random living structure, else the worker itself.
    pub fn worker_anchor(&mut self, owner: FactionId, worker_position: Vec2) -> Vec2 {
        let Some(faction) = self.factions.get(owner.index()) else {
            return worker_position;
        };
        if let Some(hq) = faction.hq() {
            return hq.position();
        }
        let living: Vec<Vec2> = faction
            .structures
            .iter()
            .filter(|s| s.alive())
            .map(Structure::position)
            .collect();
        living.choose(&mut self.rng).copied().unwrap_or(worker_position)
    }

    // ------------------------------------------------------------------
    // Resource field
    // ------------------------------------------------------------------

    fn node_site_is_valid(&self, tile: TilePos) -> bool {
        let cfg = &self.config.resources;
        let w = self.grid.width() as i32;
        let h = self.grid.height() as i32;
        if tile.x < NODE_EDGE_MARGIN
            || tile.y < NODE_EDGE_MARGIN
            || tile.x >= w - NODE_EDGE_MARGIN
            || tile.y >= h - NODE_EDGE_MARGIN
            || !self.grid.is_walkable(tile)
        {
            return false;
        }
        let tile_distance = |other: TilePos| ((other.x - tile.x) as f32).hypot((other.y - tile.y) as f32);
        let spaced = self
            .nodes
            .iter()
            .all(|n| tile_distance(self.grid.world_to_tile(n.position)) >= cfg.min_spacing_tiles as f32);
        let clear = self
            .factions
            .iter()
            .flat_map(|f| f.structures.iter())
            .all(|s| {
                tile_distance(self.grid.world_to_tile(s.position()))
                    >= cfg.structure_clearance_tiles as f32
            });
        spaced && clear
    }

    fn random_node_amount(&mut self) -> f32 {
        let cfg = &self.config.resources;
        let (lo, hi) = (cfg.min_amount, cfg.max_amount);
        if hi <= lo {
            return lo;
        }
        self.rng.gen_range(lo..=hi).round()
    }

    /// Scatter resource nodes: a few close to each HQ, then the rest at
    /// random. Attempts are bounded, so hostile terrain may yield fewer
    /// nodes than configured. Returns the number placed.
    pub fn scatter_resources(&mut self) -> usize {
        let cfg = self.config.resources.clone();
        let before = self.nodes.len();

        let hq_tiles: Vec<TilePos> = self
            .factions
            .iter()
            .filter_map(FactionState::hq)
            .map(|hq| self.grid.world_to_tile(hq.position()))
            .collect();

        for hq in hq_tiles {
            let mut placed = 0;
            for _ in 0..HOME_NODE_ATTEMPTS * cfg.home_nodes_per_faction {
                if placed >= cfg.home_nodes_per_faction || self.nodes.len() >= cfg.node_count {
                    break;
                }
                let reach = cfg.home_max_distance;
                let dx = self.rng.gen_range(-reach..=reach);
                let dy = self.rng.gen_range(-reach..=reach);
                let dist = (dx as f32).hypot(dy as f32);
                if dist < cfg.home_min_distance as f32 || dist > reach as f32 {
                    continue;
                }
                let tile = hq.offset(dx, dy);
                if self.node_site_is_valid(tile) {
                    let amount = self.random_node_amount();
                    self.add_resource_node(tile, amount);
                    placed += 1;
                }
            }
        }

        let w = self.grid.width() as i32;
        let h = self.grid.height() as i32;
        if w > 2 * NODE_EDGE_MARGIN && h > 2 * NODE_EDGE_MARGIN {
            for _ in 0..FIELD_NODE_ATTEMPTS * cfg.node_count {
                if self.nodes.len() >= cfg.node_count {
                    break;
                }
                let tile = TilePos::new(
                    self.rng.gen_range(NODE_EDGE_MARGIN..w - NODE_EDGE_MARGIN),
                    self.rng.gen_range(NODE_EDGE_MARGIN..h - NODE_EDGE_MARGIN),
                );
                if self.node_site_is_valid(tile) {
                    let amount = self.random_node_amount();
                    self.add_resource_node(tile, amount);
                }
            }
        }

        let placed = self.nodes.len() - before;
        if placed < cfg.node_count {
            debug!(placed, wanted = cfg.node_count, "resource field came up short");
        }
        placed
    }
}

/// Compute and assign a path for `unit` to `tile`.
///
/// Out-of-bounds targets are declined and unwalkable ones snapped to the
/// nearest walkable tile. Re-issuing the current goal while a path remains
/// keeps the path. If no path is found the unit keeps its previous goal
/// and path.
pub fn order_unit(grid: &NavGrid, unit: &mut Unit, tile: TilePos) -> bool {
    if !grid.in_bounds(tile) {
        return false;
    }
    let goal = if grid.is_walkable(tile) {
        tile
    } else {
        match grid.nearest_walkable(tile, NEAREST_WALKABLE_RADIUS) {
            Some(t) => t,
            None => return false,
        }
    };
    if unit.goal() == Some(goal) && unit.has_path() {
        return true;
    }

    let start = unit.tile(grid);
    let Some(mut path) = find_path(grid, start, goal) else {
        debug!(unit = unit.id(), ?start, ?goal, "no path; order dropped");
        return false;
    };
    if path.first() == Some(&start) {
        path.remove(0);
    }
    unit.set_goal(goal);
    unit.assign_path(path);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pathfinding::{TerrainKind, Tile};

    fn world(width: u32, height: u32) -> World {
        World::new(
            NavGrid::new(width, height, 16.0),
            Arc::new(Blueprints::standard().unwrap()),
            MatchConfig::default(),
            1,
        )
    }

    const RED: FactionId = FactionId(0);
    const BLUE: FactionId = FactionId(1);

    #[test]
    fn test_ids_unique_across_kinds() {
        let mut w = world(32, 32);
        let hq = w.place_structure(RED, StructureKind::Hq, TilePos::new(5, 5), true).unwrap();
        let unit = w.spawn_unit(RED, UnitKind::Worker, TilePos::new(6, 5)).unwrap();
        let node = w.add_resource_node(TilePos::new(12, 12), 500.0);
        assert_eq!((hq, unit, node), (1, 2, 3));
    }

    #[test]
    fn test_spawn_jitter_stays_in_tile() {
        let mut w = world(16, 16);
        for _ in 0..20 {
            let id = w.spawn_unit(RED, UnitKind::Infantry, TilePos::new(3, 4)).unwrap();
            let unit = w.find_unit(id).unwrap();
            assert_eq!(unit.tile(&w.grid), TilePos::new(3, 4));
        }
    }

    #[test]
    fn test_find_spawn_tile_skips_occupied() {
        let mut w = world(16, 16);
        let origin = TilePos::new(8, 8);
        w.place_structure(RED, StructureKind::Hq, origin, true);
        let first = w.find_spawn_tile(origin).unwrap();
        assert_eq!(first.manhattan(origin), 1);
        w.spawn_unit(RED, UnitKind::Worker, first);
        let second = w.find_spawn_tile(origin).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_find_spawn_tile_fails_when_enclosed() {
        let mut w = world(16, 16);
        let origin = TilePos::new(8, 8);
        for y in 0..16 {
            for x in 0..16 {
                if TilePos::new(x, y) != origin {
                    w.grid.set_tile(TilePos::new(x, y), Tile::new(TerrainKind::Water, 0.1));
                }
            }
        }
        assert!(w.find_spawn_tile(origin).is_none());
    }

    #[test]
    fn test_construction_deducts_and_respects_spacing() {
        let mut w = world(40, 40);
        w.place_structure(RED, StructureKind::Hq, TilePos::new(20, 20), true);
        let id = w.start_structure_construction(RED, StructureKind::Refinery).unwrap();
        let red = w.faction(RED).unwrap();
        assert!((red.resources - 100.0).abs() < f32::EPSILON);
        let s = w.find_structure(id).unwrap();
        assert!(!s.completed);
        assert!((s.body.health - 500.0).abs() < f32::EPSILON);
        let tile = w.grid.world_to_tile(s.position());
        assert_eq!(tile.chebyshev(TilePos::new(20, 20)), 3);
    }

    #[test]
    fn test_construction_declines() {
        let mut w = world(40, 40);
        // No anchor.
        assert!(w.start_structure_construction(RED, StructureKind::Refinery).is_none());
        w.place_structure(RED, StructureKind::Hq, TilePos::new(20, 20), true);
        // Tech gate.
        assert!(w.start_structure_construction(RED, StructureKind::Factory).is_none());
        // Cost.
        w.factions[0].resources = 10.0;
        assert!(w.start_structure_construction(RED, StructureKind::Barracks).is_none());
        assert!((w.factions[0].resources - 10.0).abs() < f32::EPSILON);
        assert_eq!(w.factions[0].structures.len(), 1);
    }

    #[test]
    fn test_queue_checks() {
        let mut w = world(32, 32);
        let hq = w.place_structure(RED, StructureKind::Hq, TilePos::new(10, 10), true).unwrap();
        assert!(!w.queue_unit_production(RED, hq, UnitKind::Infantry));
        assert!(!w.queue_unit_production(BLUE, hq, UnitKind::Worker));
        assert!(w.queue_unit_production(RED, hq, UnitKind::Worker));
        assert!((w.factions[0].resources - 200.0).abs() < f32::EPSILON);

        w.factions[0].resources = 10_000.0;
        for _ in 0..4 {
            assert!(w.queue_unit_production(RED, hq, UnitKind::Worker));
        }
        // Queue depth 5 reached.
        assert!(!w.queue_unit_production(RED, hq, UnitKind::Worker));
    }

    #[test]
    fn test_queue_respects_population_cap() {
        let mut w = world(32, 32);
        w.config.max_units = 2;
        let hq = w.place_structure(RED, StructureKind::Hq, TilePos::new(10, 10), true).unwrap();
        w.spawn_unit(RED, UnitKind::Worker, TilePos::new(2, 2));
        assert!(w.queue_unit_production(RED, hq, UnitKind::Worker));
        assert!(!w.queue_unit_production(RED, hq, UnitKind::Worker));
    }

    #[test]
    fn test_order_unit_paths_and_is_idempotent() {
        let mut w = world(20, 20);
        let id = w.spawn_unit(RED, UnitKind::Infantry, TilePos::new(2, 2)).unwrap();
        assert!(w.order_unit_to_tile(RED, id, TilePos::new(6, 2)));
        let unit = w.find_unit(id).unwrap();
        assert_eq!(unit.goal(), Some(TilePos::new(6, 2)));
        assert_eq!(unit.remaining_path().len(), 4);
        assert_eq!(unit.remaining_path()[0], TilePos::new(3, 2));

        let unit = &mut w.factions[0].units[0];
        unit.advance(0.05, &w.grid);
        let before = unit.position();
        assert!(order_unit(&w.grid, unit, TilePos::new(6, 2)));
        assert_eq!(unit.position(), before);
        assert_eq!(unit.remaining_path().len(), 4);
    }

    #[test]
    fn test_order_declines_keep_previous_path() {
        let mut w = world(20, 20);
        for y in 0..20 {
            w.grid.set_tile(TilePos::new(10, y), Tile::new(TerrainKind::Mountain, 0.9));
        }
        let id = w.spawn_unit(RED, UnitKind::Infantry, TilePos::new(2, 2)).unwrap();
        assert!(w.order_unit_to_tile(RED, id, TilePos::new(5, 5)));
        assert!(!w.order_unit_to_tile(RED, id, TilePos::new(15, 5)));
        assert!(!w.order_unit_to_tile(RED, id, TilePos::new(40, 5)));
        let unit = w.find_unit(id).unwrap();
        assert_eq!(unit.goal(), Some(TilePos::new(5, 5)));
        assert!(unit.has_path());
    }

    #[test]
    fn test_order_snaps_unwalkable_goal() {
        let mut w = world(20, 20);
        w.grid.set_tile(TilePos::new(8, 2), Tile::new(TerrainKind::Water, 0.1));
        let id = w.spawn_unit(RED, UnitKind::Infantry, TilePos::new(2, 2)).unwrap();
        assert!(w.order_unit_to_tile(RED, id, TilePos::new(8, 2)));
        let goal = w.find_unit(id).unwrap().goal().unwrap();
        assert_ne!(goal, TilePos::new(8, 2));
        assert_eq!(goal.chebyshev(TilePos::new(8, 2)), 1);
    }

    #[test]
    fn test_attack_target_comes_from_enemy() {
        let mut w = world(32, 32);
        w.place_structure(RED, StructureKind::Hq, TilePos::new(4, 4), true);
        w.place_structure(BLUE, StructureKind::Hq, TilePos::new(26, 26), true);
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        assert_eq!(w.choose_attack_target(RED, &mut rng), Some(TilePos::new(26, 26)));
        w.factions[1].structures.clear();
        assert_eq!(w.choose_attack_target(RED, &mut rng), None);
    }

    #[test]
    fn test_worker_anchor_fallbacks() {
        let mut w = world(32, 32);
        let me = Vec2::new(5.0, 5.0);
        assert_eq!(w.worker_anchor(RED, me), me);
        w.place_structure(RED, StructureKind::Refinery, TilePos::new(10, 10), true);
        assert_eq!(w.worker_anchor(RED, me), w.grid.tile_to_world(TilePos::new(10, 10)));
        w.place_structure(RED, StructureKind::Hq, TilePos::new(20, 20), true);
        assert_eq!(w.worker_anchor(RED, me), w.grid.tile_to_world(TilePos::new(20, 20)));
    }

    #[test]
    fn test_scatter_resources_respects_spacing() {
        let mut w = world(64, 64);
        w.place_structure(RED, StructureKind::Hq, TilePos::new(8, 8), true);
        w.place_structure(BLUE, StructureKind::Hq, TilePos::new(55, 55), true);
        let placed = w.scatter_resources();
        assert_eq!(placed, w.nodes.len());
        assert!(placed > 4);

        let home = w
            .nodes
            .iter()
            .filter(|n| w.grid.world_to_tile(n.position).chebyshev(TilePos::new(8, 8)) <= 9)
            .count();
        assert!(home >= 2);

        for (i, a) in w.nodes.iter().enumerate() {
            assert!((1200.0..=2400.0).contains(&a.amount));
            for b in &w.nodes[i + 1..] {
                let ta = w.grid.world_to_tile(a.position);
                let tb = w.grid.world_to_tile(b.position);
                assert!(((ta.x - tb.x) as f32).hypot((ta.y - tb.y) as f32) >= 6.0);
            }
        }
    }
}
