//! Match controller: setup, the fixed tick order, and match outcome.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{info, trace, warn};

use crate::ai::FactionController;
use crate::combat;
use crate::components::EntityId;
use crate::config::MatchConfig;
use crate::data::{Blueprints, StructureKind, UnitKind};
use crate::economy::ResourceNode;
use crate::error::{GameError, Result};
use crate::factions::{FactionId, FactionState};
use crate::map_generation::{carve_path, force_clear_area, generate_map_seeded};
use crate::math::TilePos;
use crate::pathfinding::{find_path_with_budget, NavGrid};
use crate::production;
use crate::world::World;

/// Events generated during a simulation tick.
///
/// A renderer can use these to trigger effects without diffing state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickEvents {
    /// Units spawned from production queues this tick.
    pub spawned: Vec<EntityId>,
    /// Units and structures removed at cleanup.
    pub deaths: Vec<EntityId>,
    /// Resource nodes removed after running dry.
    pub depleted_nodes: Vec<EntityId>,
    /// Set on the tick the match is won.
    pub winner: Option<FactionId>,
}

/// A running match between the two standard factions.
///
/// Owns all simulation state and advances it deterministically: with the
/// same configuration seed and the same sequence of `dt` values, two
/// matches stay bit-identical (see [`Match::state_hash`]).
///
/// # System Execution Order
///
/// Each call to [`Match::update`] runs these phases in turn. A phase
/// finishes for every faction, in id order, before the next one starts.
/// 1. **Commanders** - build, train and retarget timers
/// 2. **Economy** - construction, production queues, worker cycle
/// 3. **Units** - cooldowns, path following, target acquisition, attacks
/// 4. **Cleanup** - remove dead entities, recompute tech and defeat
/// 5. **Resources** - remove depleted nodes
/// 6. **Victory** - a sole surviving faction wins
#[derive(Debug, Clone)]
pub struct Match {
    config: MatchConfig,
    blueprints: Arc<Blueprints>,
    rng: ChaCha8Rng,
    world: World,
    controllers: Vec<FactionController>,
    elapsed_time: f64,
    tick: u64,
    winner: Option<FactionId>,
    finished: bool,
}

impl Match {
    /// Set up a match with the standard blueprints.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid, the embedded
    /// blueprints fail to load, or the generated map has no walkable tile.
    pub fn new(config: MatchConfig) -> Result<Self> {
        let blueprints = Arc::new(Blueprints::standard()?);
        Self::with_blueprints(config, blueprints)
    }

    /// Set up a match with a custom blueprint table.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or setup fails.
    pub fn with_blueprints(config: MatchConfig, blueprints: Arc<Blueprints>) -> Result<Self> {
        config.validate()?;
        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
        let (world, controllers) = setup_match(&config, &blueprints, &mut rng)?;
        Ok(Self {
            config,
            blueprints,
            rng,
            world,
            controllers,
            elapsed_time: 0.0,
            tick: 0,
            winner: None,
            finished: false,
        })
    }

    /// Wrap a hand-built world, skipping terrain generation and setup.
    ///
    /// Controllers are seeded from `seed`. Useful for scripted scenarios.
    #[must_use]
    pub fn from_world(world: World, seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let controllers = world
            .factions
            .iter()
            .map(|f| FactionController::new(f.id, f.profile.aggression, rng.gen()))
            .collect();
        Self {
            config: world.config.clone(),
            blueprints: Arc::clone(&world.blueprints),
            rng,
            world,
            controllers,
            elapsed_time: 0.0,
            tick: 0,
            winner: None,
            finished: false,
        }
    }

    /// Start a fresh match with new terrain and resources.
    ///
    /// Faction identities are kept; everything else is rebuilt from the
    /// next draws of the match stream.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::NoWalkableTile`] if the new map has no walkable tile.
    pub fn reset(&mut self) -> Result<()> {
        let (world, controllers) = setup_match(&self.config, &self.blueprints, &mut self.rng)?;
        self.world = world;
        self.controllers = controllers;
        self.elapsed_time = 0.0;
        self.tick = 0;
        self.winner = None;
        self.finished = false;
        Ok(())
    }

    /// Advance the simulation by `dt` seconds.
    ///
    /// Does nothing once the match is finished or for a non-positive `dt`.
    pub fn update(&mut self, dt: f32) -> TickEvents {
        let mut events = TickEvents::default();
        if self.finished || !dt.is_finite() || dt <= 0.0 {
            return events;
        }

        self.elapsed_time += f64::from(dt);
        self.tick += 1;

        for controller in &mut self.controllers {
            controller.update(&mut self.world, dt);
        }
        for i in 0..self.world.factions.len() {
            let id = FactionId(i as u8);
            events
                .spawned
                .extend(production::update_faction(&mut self.world, id, dt));
        }
        for i in 0..self.world.factions.len() {
            combat::update_units(&mut self.world, FactionId(i as u8), dt);
        }

        events.deaths = self.remove_dead();
        events.depleted_nodes = self.remove_depleted_nodes();
        events.winner = self.check_victory();

        trace!(
            tick = self.tick,
            spawned = events.spawned.len(),
            deaths = events.deaths.len(),
            "tick complete"
        );
        events
    }

    fn remove_dead(&mut self) -> Vec<EntityId> {
        let mut deaths = Vec::new();
        for faction in &mut self.world.factions {
            let before = deaths.len();
            faction.units.retain(|u| {
                if u.alive() {
                    true
                } else {
                    deaths.push(u.id());
                    false
                }
            });
            faction.stats.units_lost += (deaths.len() - before) as u32;

            let before = deaths.len();
            faction.structures.retain(|s| {
                if s.alive() {
                    true
                } else {
                    deaths.push(s.id());
                    false
                }
            });
            faction.stats.structures_lost += (deaths.len() - before) as u32;

            faction.refresh();
        }
        deaths
    }

    fn remove_depleted_nodes(&mut self) -> Vec<EntityId> {
        let depleted: Vec<EntityId> = self
            .world
            .nodes
            .iter()
            .filter(|n| n.depleted())
            .map(|n| n.id)
            .collect();
        if !depleted.is_empty() {
            self.world.nodes.retain(|n| !n.depleted());
        }
        depleted
    }

    fn check_victory(&mut self) -> Option<FactionId> {
        let standing: Vec<FactionId> = self
            .world
            .factions
            .iter()
            .filter(|f| !f.defeated)
            .map(|f| f.id)
            .collect();
        match standing.as_slice() {
            [winner] => {
                self.winner = Some(*winner);
                self.finished = true;
                info!(winner = %winner, elapsed = self.elapsed_time, tick = self.tick, "match won");
                Some(*winner)
            }
            [] => {
                self.finished = true;
                info!(elapsed = self.elapsed_time, tick = self.tick, "all factions defeated");
                None
            }
            _ => None,
        }
    }

    /// Hash of the simulation state for determinism checks.
    ///
    /// Covers the clock, every faction's resources and tech, and the id,
    /// position and health of every entity, in collection order.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();

        self.tick.hash(&mut hasher);
        self.elapsed_time.to_bits().hash(&mut hasher);

        for faction in &self.world.factions {
            faction.id.hash(&mut hasher);
            faction.resources.to_bits().hash(&mut hasher);
            faction.tech_level.hash(&mut hasher);
            faction.defeated.hash(&mut hasher);

            faction.structures.len().hash(&mut hasher);
            for s in &faction.structures {
                s.id().hash(&mut hasher);
                s.body.position.x.to_bits().hash(&mut hasher);
                s.body.position.y.to_bits().hash(&mut hasher);
                s.body.health.to_bits().hash(&mut hasher);
                s.completed.hash(&mut hasher);
                s.production_queue.len().hash(&mut hasher);
            }

            faction.units.len().hash(&mut hasher);
            for u in &faction.units {
                u.id().hash(&mut hasher);
                u.body.position.x.to_bits().hash(&mut hasher);
                u.body.position.y.to_bits().hash(&mut hasher);
                u.body.health.to_bits().hash(&mut hasher);
            }
        }

        self.world.nodes.len().hash(&mut hasher);
        for n in &self.world.nodes {
            n.id.hash(&mut hasher);
            n.amount.to_bits().hash(&mut hasher);
        }

        hasher.finish()
    }

    /// Rules in effect.
    #[must_use]
    pub const fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// Blueprint table in use.
    #[must_use]
    pub fn blueprints(&self) -> &Blueprints {
        &self.blueprints
    }

    /// Full simulation state.
    #[must_use]
    pub const fn world(&self) -> &World {
        &self.world
    }

    /// Mutable simulation state, for scripted scenarios and tests.
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Both factions, in id order.
    #[must_use]
    pub fn factions(&self) -> &[FactionState] {
        &self.world.factions
    }

    /// Terrain.
    #[must_use]
    pub const fn grid(&self) -> &NavGrid {
        &self.world.grid
    }

    /// Resource nodes still on the map.
    #[must_use]
    pub fn resource_nodes(&self) -> &[ResourceNode] {
        &self.world.nodes
    }

    /// Faction commanders, in faction order.
    #[must_use]
    pub fn controllers(&self) -> &[FactionController] {
        &self.controllers
    }

    /// Simulated seconds since setup.
    #[must_use]
    pub const fn elapsed_time(&self) -> f64 {
        self.elapsed_time
    }

    /// Ticks run since setup.
    #[must_use]
    pub const fn tick(&self) -> u64 {
        self.tick
    }

    /// The winning faction, once decided.
    #[must_use]
    pub const fn winner(&self) -> Option<FactionId> {
        self.winner
    }

    /// No further updates will change state.
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.finished
    }
}

/// Build a fresh world and commanders from the next draws of `rng`.
fn setup_match(
    config: &MatchConfig,
    blueprints: &Arc<Blueprints>,
    rng: &mut ChaCha8Rng,
) -> Result<(World, Vec<FactionController>)> {
    let map_seed: u64 = rng.gen();
    let world_seed: u64 = rng.gen();

    let grid = generate_map_seeded(&config.map, map_seed);
    if grid.walkable_count() == 0 {
        return Err(GameError::NoWalkableTile {
            width: grid.width(),
            height: grid.height(),
        });
    }

    let mut world = World::new(grid, Arc::clone(blueprints), config.clone(), world_seed);
    let controllers = world
        .factions
        .iter()
        .map(|f| FactionController::new(f.id, f.profile.aggression, rng.gen()))
        .collect();

    let bases = place_headquarters(&mut world)?;
    for (i, base) in bases.iter().enumerate() {
        let owner = FactionId(i as u8);
        for _ in 0..config.initial_workers {
            if let Some(tile) = world.find_spawn_tile(*base) {
                world.spawn_unit(owner, UnitKind::Worker, tile);
            }
        }
    }
    if let [a, b] = bases.as_slice() {
        ensure_connected(&mut world.grid, *a, *b);
    }
    let nodes = world.scatter_resources();

    info!(
        seed = config.seed,
        width = config.map.width,
        height = config.map.height,
        nodes,
        "match reset"
    );
    Ok((world, controllers))
}

/// Preferred HQ tiles: opposite corners, inset from the edge.
#[must_use]
pub fn preferred_hq_tiles(grid: &NavGrid, inset: i32) -> [TilePos; 2] {
    let w = grid.width() as i32;
    let h = grid.height() as i32;
    [
        TilePos::new(inset, inset),
        TilePos::new(w - 1 - inset, h - 1 - inset),
    ]
}

/// Snap each preferred corner to walkable ground, clear a safe area and
/// place a finished HQ. Returns the HQ tiles in faction order.
fn place_headquarters(world: &mut World) -> Result<Vec<TilePos>> {
    let search_radius = world.grid.width().max(world.grid.height()) as i32;
    let preferred = preferred_hq_tiles(&world.grid, world.config.hq_corner_inset);
    let mut bases = Vec::with_capacity(preferred.len());

    for (i, corner) in preferred.into_iter().enumerate() {
        let tile = world
            .grid
            .nearest_walkable(corner, search_radius)
            .or_else(|| world.grid.first_walkable())
            .ok_or(GameError::NoWalkableTile {
                width: world.grid.width(),
                height: world.grid.height(),
            })?;
        force_clear_area(&mut world.grid, tile, world.config.hq_clear_radius);
        world
            .place_structure(FactionId(i as u8), StructureKind::Hq, tile, true)
            .ok_or_else(|| GameError::MissingBlueprint(StructureKind::Hq.key().to_string()))?;
        bases.push(tile);
    }
    Ok(bases)
}

/// Carve a corridor between two tiles if the pathfinder cannot join them.
/// Returns whether they are connected afterwards.
fn ensure_connected(grid: &mut NavGrid, a: TilePos, b: TilePos) -> bool {
    let budget = grid.width() as usize * grid.height() as usize;
    if find_path_with_budget(grid, a, b, budget).is_some() {
        return true;
    }
    warn!(?a, ?b, "bases not connected; carving corridor");
    carve_path(grid, a, b, 1);
    let connected = find_path_with_budget(grid, a, b, budget).is_some();
    if !connected {
        warn!(?a, ?b, "bases still not connected after carving");
    }
    connected
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MapConfig;
    use crate::economy::{Worker, WorkerState};
    use crate::pathfinding::{TerrainKind, Tile};

    fn small(seed: u64) -> MatchConfig {
        MatchConfig::default()
            .with_seed(seed)
            .with_map(MapConfig::small())
    }

    #[test]
    fn test_setup_places_bases_and_workers() {
        let m = Match::new(small(42)).unwrap();
        for faction in m.factions() {
            assert_eq!(faction.structures.len(), 1);
            assert_eq!(faction.structures[0].kind(), StructureKind::Hq);
            assert!(faction.structures[0].completed);
            assert_eq!(faction.worker_count(), 3);
            assert!((faction.resources - 250.0).abs() < f32::EPSILON);
        }
        assert!(!m.resource_nodes().is_empty());
        assert_eq!(m.winner(), None);
        assert!(!m.is_finished());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = small(1);
        config.max_queue_depth = 0;
        assert!(matches!(Match::new(config), Err(GameError::InvalidConfig(_))));
    }

    #[test]
    fn test_ensure_connected_carves_wall() {
        let mut grid = NavGrid::new(20, 20, 16.0);
        for y in 0..20 {
            grid.set_tile(TilePos::new(10, y), Tile::new(TerrainKind::Water, 0.1));
        }
        assert!(ensure_connected(&mut grid, TilePos::new(2, 3), TilePos::new(17, 15)));
    }

    #[test]
    fn test_zero_dt_is_noop() {
        let mut m = Match::new(small(3)).unwrap();
        let before = m.state_hash();
        assert_eq!(m.update(0.0), TickEvents::default());
        assert_eq!(m.update(-1.0), TickEvents::default());
        assert_eq!(m.update(f32::NAN), TickEvents::default());
        assert_eq!(m.state_hash(), before);
        assert_eq!(m.tick(), 0);
    }

    #[test]
    fn test_update_advances_clock() {
        let mut m = Match::new(small(5)).unwrap();
        m.update(0.25);
        m.update(0.25);
        assert_eq!(m.tick(), 2);
        assert!((m.elapsed_time() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_reset_rebuilds_map() {
        let mut m = Match::new(small(8)).unwrap();
        let first = m.grid().clone();
        for _ in 0..10 {
            m.update(0.1);
        }
        m.reset().unwrap();
        assert_eq!(m.tick(), 0);
        assert_ne!(m.grid(), &first);
        assert_eq!(m.factions()[0].profile.name, "Red Horizon");
        assert_eq!(m.factions()[1].profile.name, "Blue Dawn");
    }

    #[test]
    fn test_double_defeat_finishes_without_winner() {
        let mut m = Match::new(small(13)).unwrap();
        for faction in &mut m.world_mut().factions {
            faction.units.clear();
            faction.structures[0].body.health = 0.0;
        }
        let events = m.update(0.1);
        assert_eq!(events.winner, None);
        assert!(m.is_finished());
        assert_eq!(m.winner(), None);
        assert_eq!(events.deaths.len(), 2);
    }

    #[test]
    fn test_every_economy_runs_before_any_combat() {
        let mut world = World::new(
            NavGrid::new(32, 32, 16.0),
            Arc::new(Blueprints::standard().unwrap()),
            MatchConfig::default(),
            6,
        );
        world.place_structure(FactionId(0), StructureKind::Hq, TilePos::new(2, 25), true);
        world.place_structure(FactionId(1), StructureKind::Hq, TilePos::new(25, 10), true);
        world.spawn_unit(FactionId(0), UnitKind::Infantry, TilePos::new(11, 10));
        let courier = world
            .spawn_unit(FactionId(1), UnitKind::Worker, TilePos::new(10, 10))
            .unwrap();
        let unit = world.factions[1]
            .units
            .iter_mut()
            .find(|u| u.id() == courier)
            .unwrap();
        unit.body.health = 5.0;
        unit.worker = Some(Worker {
            state: WorkerState::Deposit { remaining: 0.01 },
            cargo: 50.0,
            ..Worker::default()
        });

        // Blue's deposit lands before Red's infantry fires in the same tick.
        let mut m = Match::from_world(world, 6);
        let events = m.update(0.05);
        assert!(events.deaths.contains(&courier));
        assert!((m.factions()[1].stats.resources_gathered - 50.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_same_seed_same_hash() {
        let mut a = Match::new(small(77)).unwrap();
        let mut b = Match::new(small(77)).unwrap();
        for _ in 0..120 {
            a.update(1.0 / 30.0);
            b.update(1.0 / 30.0);
        }
        assert_eq!(a.state_hash(), b.state_hash());
    }
}
