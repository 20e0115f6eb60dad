//! Per-faction economy pass: construction, production queues and the
//! worker gather/deposit cycle.

use std::sync::Arc;

use tracing::{debug, trace};

use crate::components::EntityId;
use crate::data::UnitDefinition;
use crate::economy::{step_worker, DepositView, NodeView, WorkerEffect, WorkerState, WorkerView};
use crate::factions::FactionId;
use crate::math::TilePos;
use crate::world::{order_unit, World};

/// Run one economy tick for `owner`. Returns ids of units spawned.
pub fn update_faction(world: &mut World, owner: FactionId, dt: f32) -> Vec<EntityId> {
    let spawned = advance_structures(world, owner, dt);
    run_workers(world, owner, dt);
    spawned
}

/// Advance construction and production of every living structure, then
/// spawn whatever finished training.
///
/// A finished unit with no free tile nearby is lost.
pub fn advance_structures(world: &mut World, owner: FactionId, dt: f32) -> Vec<EntityId> {
    let Some(faction) = world.factions.get_mut(owner.index()) else {
        return Vec::new();
    };

    let mut finished: Vec<(TilePos, Arc<UnitDefinition>)> = Vec::new();
    for structure in faction.structures.iter_mut().filter(|s| s.alive()) {
        if !structure.completed {
            if structure.advance_construction(dt) {
                debug!(%owner, kind = %structure.kind(), id = structure.id(), "construction complete");
            }
            continue;
        }
        if let Some(unit) = structure.advance_production(dt) {
            finished.push((world.grid.world_to_tile(structure.position()), unit));
        }
    }

    let mut spawned = Vec::with_capacity(finished.len());
    for (origin, definition) in finished {
        let kind = definition.kind;
        let Some(tile) = world.find_spawn_tile(origin) else {
            debug!(%owner, %kind, ?origin, "no free spawn tile; unit lost");
            continue;
        };
        if let Some(id) = world.spawn_unit_from(owner, definition, tile) {
            if let Some(faction) = world.faction_mut(owner) {
                faction.stats.units_produced += 1;
            }
            trace!(%owner, %kind, id, ?tile, "unit spawned");
            spawned.push(id);
        }
    }
    spawned
}

/// Step every living worker of `owner` through its gather cycle and apply
/// the resulting effects.
pub fn run_workers(world: &mut World, owner: FactionId, dt: f32) {
    let idx = owner.index();
    let Some(faction) = world.factions.get(idx) else {
        return;
    };
    let deposits: Vec<DepositView> = faction
        .structures
        .iter()
        .filter(|s| s.is_active_deposit())
        .map(|s| DepositView {
            id: s.id(),
            position: s.position(),
            radius: s.definition.radius,
        })
        .collect();
    let tile_size = world.grid.tile_size();
    let unit_count = faction.units.len();

    for i in 0..unit_count {
        let unit = &world.factions[idx].units[i];
        if !unit.alive() {
            continue;
        }
        let Some(worker) = unit.worker.clone() else {
            continue;
        };
        let position = unit.position();
        let path_exhausted = !unit.has_path();

        let anchor = if worker.state == WorkerState::Idle {
            world.worker_anchor(owner, position)
        } else {
            position
        };
        let nodes: Vec<NodeView> = world
            .nodes
            .iter()
            .filter(|n| !n.depleted())
            .map(|n| NodeView {
                id: n.id,
                position: n.position,
                amount: n.amount,
            })
            .collect();
        let view = WorkerView {
            position,
            path_exhausted,
            anchor,
            nodes: &nodes,
            deposits: &deposits,
            tile_size,
        };

        let transition = step_worker(&worker, &view, dt, &world.config.economy);
        let mut next = transition.next;
        for effect in transition.effects {
            match effect {
                WorkerEffect::MoveTo(target) => {
                    let tile = world.grid.world_to_tile(target);
                    if !order_unit(&world.grid, &mut world.factions[idx].units[i], tile) {
                        debug!(%owner, unit = world.factions[idx].units[i].id(), ?tile, "worker route failed");
                        next = next.abandon_route();
                    }
                }
                WorkerEffect::ClearPath => world.factions[idx].units[i].clear_path(),
                WorkerEffect::Harvest { node, amount } => {
                    let taken = world
                        .nodes
                        .iter_mut()
                        .find(|n| n.id == node)
                        .map_or(0.0, |n| n.harvest(amount));
                    if next.state == WorkerState::ToDeposit {
                        next.cargo = taken;
                    }
                }
                WorkerEffect::Deposit { amount } => {
                    let faction = &mut world.factions[idx];
                    faction.resources += amount;
                    faction.stats.resources_gathered += amount;
                }
            }
        }
        world.factions[idx].units[i].worker = Some(next);
    }
}
