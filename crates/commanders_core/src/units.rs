//! Runtime units: path following and attack cooldowns.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::components::{Body, EntityId};
use crate::data::{UnitDefinition, UnitKind};
use crate::economy::Worker;
use crate::math::{TilePos, Vec2};
use crate::pathfinding::NavGrid;

/// Distance (pixels) at which a path cell counts as reached.
const ARRIVE_EPSILON: f32 = 1.0;

/// A mobile unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Unit {
    /// Identity, ownership, position and health.
    pub body: Body,
    /// Archetype.
    pub definition: Arc<UnitDefinition>,
    /// Seconds until the next attack is allowed.
    pub attack_cooldown_remaining: f32,
    path: Vec<TilePos>,
    path_cursor: usize,
    goal: Option<TilePos>,
    /// Gather cycle state; present only for worker-role units.
    pub worker: Option<Worker>,
}

impl Unit {
    /// Create a unit at full health with no orders.
    #[must_use]
    pub fn new(body: Body, definition: Arc<UnitDefinition>) -> Self {
        let worker = definition.is_worker().then(Worker::default);
        Self {
            body,
            definition,
            attack_cooldown_remaining: 0.0,
            path: Vec::new(),
            path_cursor: 0,
            goal: None,
            worker,
        }
    }

    /// Entity id.
    #[must_use]
    pub const fn id(&self) -> EntityId {
        self.body.id
    }

    /// Archetype key.
    #[must_use]
    pub fn kind(&self) -> UnitKind {
        self.definition.kind
    }

    /// World position.
    #[must_use]
    pub const fn position(&self) -> Vec2 {
        self.body.position
    }

    /// Alive while health is above zero.
    #[must_use]
    pub fn alive(&self) -> bool {
        self.body.alive()
    }

    /// Check if this unit runs the worker cycle.
    #[must_use]
    pub fn is_worker(&self) -> bool {
        self.definition.is_worker()
    }

    /// Tile the unit currently stands on.
    #[must_use]
    pub fn tile(&self, grid: &NavGrid) -> TilePos {
        grid.world_to_tile(self.body.position)
    }

    /// Current goal tile.
    #[must_use]
    pub const fn goal(&self) -> Option<TilePos> {
        self.goal
    }

    /// Set the goal tile. A different goal discards the current path;
    /// the same goal keeps it. Returns `true` if the goal changed.
    pub fn set_goal(&mut self, goal: TilePos) -> bool {
        if self.goal == Some(goal) {
            return false;
        }
        self.goal = Some(goal);
        self.clear_path();
        true
    }

    /// Replace the path and restart at its first cell.
    pub fn assign_path(&mut self, path: Vec<TilePos>) {
        self.path = path;
        self.path_cursor = 0;
    }

    /// Drop the current path.
    pub fn clear_path(&mut self) {
        self.path.clear();
        self.path_cursor = 0;
    }

    /// Cells not yet reached.
    #[must_use]
    pub fn remaining_path(&self) -> &[TilePos] {
        self.path.get(self.path_cursor..).unwrap_or(&[])
    }

    /// True while cells remain to walk.
    #[must_use]
    pub fn has_path(&self) -> bool {
        self.path_cursor < self.path.len()
    }

    /// Walk toward the next path cell at the unit's speed.
    ///
    /// A cell closer than one pixel is consumed without moving that tick.
    pub fn advance(&mut self, dt: f32, grid: &NavGrid) {
        let Some(&next) = self.path.get(self.path_cursor) else {
            return;
        };
        let target = grid.tile_to_world(next);
        let distance = self.body.position.distance(target);
        if distance < ARRIVE_EPSILON {
            self.path_cursor += 1;
            return;
        }
        let step = (self.definition.speed * dt).min(distance);
        self.body.position = self.body.position.move_towards(target, step);
    }

    /// Count the attack cooldown down, never below zero.
    pub fn tick_cooldown(&mut self, dt: f32) {
        if self.attack_cooldown_remaining > 0.0 {
            self.attack_cooldown_remaining = (self.attack_cooldown_remaining - dt).max(0.0);
        }
    }

    /// Cooldown has elapsed and the unit deals damage.
    #[must_use]
    pub fn ready_to_attack(&self) -> bool {
        self.definition.can_attack() && self.attack_cooldown_remaining <= 0.0
    }

    /// Strike `target` and restart the cooldown. Returns damage dealt.
    pub fn attack(&mut self, target: &mut Body) -> f32 {
        self.attack_cooldown_remaining = self.definition.cooldown;
        target.take_damage(self.definition.damage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Blueprints;
    use crate::factions::FactionId;

    fn make_unit(kind: UnitKind, at: Vec2) -> Unit {
        let bp = Blueprints::standard().unwrap();
        let def = Arc::clone(bp.unit(kind).unwrap());
        Unit::new(Body::new(7, FactionId(0), at, def.radius, def.health), def)
    }

    #[test]
    fn test_worker_payload_only_for_workers() {
        assert!(make_unit(UnitKind::Worker, Vec2::ZERO).worker.is_some());
        assert!(make_unit(UnitKind::Tank, Vec2::ZERO).worker.is_none());
    }

    #[test]
    fn test_same_goal_keeps_path() {
        let mut u = make_unit(UnitKind::Infantry, Vec2::new(8.0, 8.0));
        assert!(u.set_goal(TilePos::new(3, 0)));
        u.assign_path(vec![TilePos::new(1, 0), TilePos::new(2, 0), TilePos::new(3, 0)]);
        assert!(!u.set_goal(TilePos::new(3, 0)));
        assert_eq!(u.remaining_path().len(), 3);
        assert!(u.set_goal(TilePos::new(0, 5)));
        assert!(!u.has_path());
    }

    #[test]
    fn test_advance_walks_path() {
        let grid = NavGrid::new(8, 8, 16.0);
        let mut u = make_unit(UnitKind::Infantry, grid.tile_to_world(TilePos::new(0, 0)));
        u.assign_path(vec![TilePos::new(1, 0), TilePos::new(2, 0)]);
        // 90 px/s for 0.1 s moves 9 px toward (24, 8).
        u.advance(0.1, &grid);
        assert!((u.position().x - 17.0).abs() < 1e-4);
        for _ in 0..20 {
            u.advance(0.1, &grid);
        }
        assert!(!u.has_path());
        assert_eq!(u.tile(&grid), TilePos::new(2, 0));
    }

    #[test]
    fn test_attack_and_cooldown() {
        let mut attacker = make_unit(UnitKind::Infantry, Vec2::ZERO);
        let mut target = make_unit(UnitKind::Worker, Vec2::ZERO);
        assert!(attacker.ready_to_attack());
        let dealt = attacker.attack(&mut target.body);
        assert!((dealt - 8.0).abs() < f32::EPSILON);
        assert!((target.body.health - 37.0).abs() < f32::EPSILON);
        assert!(!attacker.ready_to_attack());
        attacker.tick_cooldown(0.5);
        assert!(!attacker.ready_to_attack());
        attacker.tick_cooldown(0.5);
        assert!(attacker.ready_to_attack());
        assert!(attacker.attack_cooldown_remaining.abs() < f32::EPSILON);
    }

    #[test]
    fn test_workers_cannot_attack() {
        assert!(!make_unit(UnitKind::Worker, Vec2::ZERO).ready_to_attack());
    }
}
