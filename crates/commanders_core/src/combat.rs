//! Target acquisition and the per-unit movement/combat pass.
//!
//! Enemy structures are always targetable; enemy units only inside the
//! attacker's vision. The closest candidate wins regardless of kind, with
//! the lower entity id breaking exact ties.

use tracing::trace;

use crate::components::{Body, EntityId};
use crate::factions::{FactionId, FactionState};
use crate::math::Vec2;
use crate::world::{order_unit, World};

/// Which collection a target lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    /// An enemy structure.
    Structure,
    /// An enemy unit.
    Unit,
}

/// A resolved attack target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetRef {
    /// Owning faction.
    pub faction: FactionId,
    /// Collection.
    pub kind: TargetKind,
    /// Index into the owning faction's collection.
    pub index: usize,
    /// Entity id.
    pub id: EntityId,
    /// Position at acquisition time.
    pub position: Vec2,
    /// Distance from the attacker.
    pub distance: f32,
}

impl TargetRef {
    fn beats(&self, other: &Self) -> bool {
        self.distance < other.distance || (self.distance == other.distance && self.id < other.id)
    }
}

/// Find the closest enemy of `owner` as seen from `position`.
#[must_use]
pub fn acquire_target(
    factions: &[FactionState],
    owner: FactionId,
    position: Vec2,
    vision: f32,
) -> Option<TargetRef> {
    let mut best: Option<TargetRef> = None;
    let mut consider = |candidate: TargetRef| {
        if best.as_ref().map_or(true, |b| candidate.beats(b)) {
            best = Some(candidate);
        }
    };

    for enemy in factions.iter().filter(|f| f.id != owner && !f.defeated) {
        for (index, structure) in enemy.structures.iter().enumerate() {
            if !structure.alive() {
                continue;
            }
            consider(TargetRef {
                faction: enemy.id,
                kind: TargetKind::Structure,
                index,
                id: structure.id(),
                position: structure.position(),
                distance: position.distance(structure.position()),
            });
        }
        for (index, unit) in enemy.units.iter().enumerate() {
            if !unit.alive() {
                continue;
            }
            let distance = position.distance(unit.position());
            if distance > vision {
                continue;
            }
            consider(TargetRef {
                faction: enemy.id,
                kind: TargetKind::Unit,
                index,
                id: unit.id(),
                position: unit.position(),
                distance,
            });
        }
    }
    best
}

/// Borrow two distinct factions mutably.
fn pair_mut(
    factions: &mut [FactionState],
    a: usize,
    b: usize,
) -> Option<(&mut FactionState, &mut FactionState)> {
    if a == b || a >= factions.len() || b >= factions.len() {
        return None;
    }
    if a < b {
        let (left, right) = factions.split_at_mut(b);
        Some((&mut left[a], &mut right[0]))
    } else {
        let (left, right) = factions.split_at_mut(a);
        Some((&mut right[0], &mut left[b]))
    }
}

fn target_body<'a>(enemy: &'a mut FactionState, target: &TargetRef) -> Option<&'a mut Body> {
    match target.kind {
        TargetKind::Structure => enemy.structures.get_mut(target.index).map(|s| &mut s.body),
        TargetKind::Unit => enemy.units.get_mut(target.index).map(|u| &mut u.body),
    }
}

/// Move and fight with every living unit of `owner`.
///
/// Each unit counts its cooldown down and walks its path. Units that deal
/// damage then pick the closest enemy: inside range they stop and fire when
/// ready, outside range they path toward the target's tile. Returns total
/// damage dealt.
pub fn update_units(world: &mut World, owner: FactionId, dt: f32) -> f32 {
    let idx = owner.index();
    let Some(unit_count) = world.factions.get(idx).map(|f| f.units.len()) else {
        return 0.0;
    };

    let mut dealt = 0.0;
    for i in 0..unit_count {
        let unit = &mut world.factions[idx].units[i];
        if !unit.alive() {
            continue;
        }
        unit.tick_cooldown(dt);
        unit.advance(dt, &world.grid);
        if !unit.definition.can_attack() {
            continue;
        }
        let position = unit.position();
        let (vision, range) = (unit.definition.vision, unit.definition.range);

        let Some(target) = acquire_target(&world.factions, owner, position, vision) else {
            continue;
        };

        if target.distance <= range {
            let Some((own, enemy)) = pair_mut(&mut world.factions, idx, target.faction.index())
            else {
                continue;
            };
            let unit = &mut own.units[i];
            unit.clear_path();
            if unit.ready_to_attack() {
                if let Some(body) = target_body(enemy, &target) {
                    let damage = unit.attack(body);
                    trace!(attacker = unit.id(), target = target.id, damage, "attack");
                    dealt += damage;
                }
            }
        } else {
            let tile = world.grid.world_to_tile(target.position);
            order_unit(&world.grid, &mut world.factions[idx].units[i], tile);
        }
    }
    dealt
}
