//! Autonomous faction commander.
//!
//! Each faction is driven by a [`FactionController`] running three
//! independent timers:
//!
//! - **Build**: walk [`BUILD_WISHLIST`] and start the first affordable
//!   structure still below its target count.
//! - **Train**: top up workers to [`WORKER_QUOTA`], otherwise queue the
//!   next eligible entry of [`COMBAT_CYCLE`].
//! - **Retarget**: send every combat unit toward a random enemy position.
//!
//! Timers start at zero, so every action fires on the first update. Each
//! controller owns its own random stream; two controllers never share
//! draws, so one faction's decisions never perturb the other's.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use crate::components::EntityId;
use crate::data::{StructureKind, UnitKind};
use crate::factions::FactionId;
use crate::world::World;

/// Workers kept alive before any combat unit is trained.
pub const WORKER_QUOTA: usize = 8;

/// Producers with this many queued units are skipped.
pub const BUSY_QUEUE_LENGTH: usize = 3;

/// Structures to build and how many of each, in priority order.
pub const BUILD_WISHLIST: [(StructureKind, usize); 6] = [
    (StructureKind::Refinery, 1),
    (StructureKind::Barracks, 1),
    (StructureKind::Refinery, 2),
    (StructureKind::Factory, 1),
    (StructureKind::Barracks, 2),
    (StructureKind::Lab, 1),
];

/// Round-robin combat training order.
pub const COMBAT_CYCLE: [UnitKind; 6] = [
    UnitKind::Infantry,
    UnitKind::Infantry,
    UnitKind::Ranger,
    UnitKind::Tank,
    UnitKind::Infantry,
    UnitKind::Artillery,
];

const BUILD_INTERVAL: (f32, f32) = (4.0, 6.5);
const TRAIN_INTERVAL: (f32, f32) = (1.8, 2.6);
const RETARGET_INTERVAL: (f32, f32) = (3.0, 5.5);

/// Floor applied to aggression when scaling the retarget interval.
const MIN_AGGRESSION: f32 = 0.5;

/// Decision-making state for one faction.
#[derive(Debug, Clone)]
pub struct FactionController {
    faction: FactionId,
    aggression: f32,
    rng: ChaCha8Rng,
    build_timer: f32,
    train_timer: f32,
    retarget_timer: f32,
    combat_cursor: usize,
}

impl FactionController {
    /// Create a controller with its own seeded stream.
    #[must_use]
    pub fn new(faction: FactionId, aggression: f32, seed: u64) -> Self {
        Self {
            faction,
            aggression,
            rng: ChaCha8Rng::seed_from_u64(seed),
            build_timer: 0.0,
            train_timer: 0.0,
            retarget_timer: 0.0,
            combat_cursor: 0,
        }
    }

    /// Faction this controller drives.
    #[must_use]
    pub const fn faction(&self) -> FactionId {
        self.faction
    }

    /// Position in [`COMBAT_CYCLE`], counting every entry examined.
    #[must_use]
    pub const fn combat_cursor(&self) -> usize {
        self.combat_cursor
    }

    /// Seconds until the next retarget.
    #[must_use]
    pub const fn retarget_timer(&self) -> f32 {
        self.retarget_timer
    }

    fn interval(&mut self, (lo, hi): (f32, f32)) -> f32 {
        self.rng.gen_range(lo..hi)
    }

    /// Run the controller for one tick. A defeated faction does nothing.
    pub fn update(&mut self, world: &mut World, dt: f32) {
        if world.faction(self.faction).map_or(true, |f| f.defeated) {
            return;
        }

        self.build_timer -= dt;
        self.train_timer -= dt;
        self.retarget_timer -= dt;

        if self.build_timer <= 0.0 {
            self.build_timer = self.interval(BUILD_INTERVAL);
            self.attempt_construction(world);
        }
        if self.train_timer <= 0.0 {
            self.train_timer = self.interval(TRAIN_INTERVAL);
            self.attempt_training(world);
        }
        if self.retarget_timer <= 0.0 {
            self.retarget_timer =
                self.interval(RETARGET_INTERVAL) / self.aggression.max(MIN_AGGRESSION);
            self.retarget(world);
        }
    }

    /// Start the first wishlist structure that is wanted, unlocked and
    /// affordable. Returns the new structure's id.
    pub fn attempt_construction(&mut self, world: &mut World) -> Option<EntityId> {
        for (kind, desired) in BUILD_WISHLIST {
            let Some(definition) = world.blueprints.structure(kind) else {
                continue;
            };
            let (required_tech, cost) = (definition.required_tech, definition.cost);
            let faction = world.faction(self.faction)?;
            if faction.count_structures(kind) >= desired
                || faction.tech_level < required_tech
                || faction.resources < cost
            {
                continue;
            }
            if let Some(id) = world.start_structure_construction(self.faction, kind) {
                return Some(id);
            }
        }
        None
    }

    /// Queue a worker below quota, otherwise the next eligible combat unit.
    pub fn attempt_training(&mut self, world: &mut World) -> bool {
        let Some(faction) = world.faction(self.faction) else {
            return false;
        };
        if faction.worker_count() < WORKER_QUOTA {
            return self.queue_unit(world, UnitKind::Worker);
        }
        match self.next_combat_unit(world) {
            Some(kind) => self.queue_unit(world, kind),
            None => false,
        }
    }

    /// Advance the combat cycle to the next entry the faction can train
    /// right now. The cursor moves past every entry examined.
    fn next_combat_unit(&mut self, world: &World) -> Option<UnitKind> {
        let faction = world.faction(self.faction)?;
        for _ in 0..COMBAT_CYCLE.len() {
            let kind = COMBAT_CYCLE[self.combat_cursor % COMBAT_CYCLE.len()];
            self.combat_cursor += 1;
            let Some(definition) = world.blueprints.unit(kind) else {
                continue;
            };
            if faction.tech_level < definition.tech_level
                || faction.available_producers(kind).is_empty()
                || faction.resources < definition.cost
            {
                continue;
            }
            return Some(kind);
        }
        None
    }

    /// Queue `kind` at the least busy producer.
    fn queue_unit(&self, world: &mut World, kind: UnitKind) -> bool {
        let Some(faction) = world.faction(self.faction) else {
            return false;
        };
        let mut producers: Vec<(usize, EntityId)> = faction
            .available_producers(kind)
            .into_iter()
            .map(|i| {
                let s = &faction.structures[i];
                (s.production_queue.len(), s.id())
            })
            .collect();
        producers.sort_by_key(|(queued, _)| *queued);

        for (queued, structure_id) in producers {
            if queued >= BUSY_QUEUE_LENGTH {
                continue;
            }
            if world.queue_unit_production(self.faction, structure_id, kind) {
                return true;
            }
        }
        false
    }

    /// Send all living combat units toward a random enemy position.
    /// Returns the number of units that accepted the order.
    pub fn retarget(&mut self, world: &mut World) -> usize {
        let Some(target) = world.choose_attack_target(self.faction, &mut self.rng) else {
            return 0;
        };
        let ids: Vec<EntityId> = world
            .faction(self.faction)
            .map(|f| {
                f.units
                    .iter()
                    .filter(|u| u.alive() && !u.is_worker())
                    .map(|u| u.id())
                    .collect()
            })
            .unwrap_or_default();

        let ordered = ids
            .into_iter()
            .filter(|id| world.order_unit_to_tile(self.faction, *id, target))
            .count();
        debug!(faction = %self.faction, ?target, ordered, "retarget");
        ordered
    }
}
