//! Runtime structures: construction progress and production queues.

use std::collections::VecDeque;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::components::{Body, EntityId};
use crate::data::{StructureDefinition, StructureKind, UnitDefinition, UnitKind};
use crate::math::Vec2;

/// A placed structure.
///
/// `production_timer` always tracks the head of the queue: it is armed
/// with the new item's build time when added to an empty queue, and with
/// the next item's build time whenever the head completes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Structure {
    /// Identity, ownership, position and health.
    pub body: Body,
    /// Archetype.
    pub definition: Arc<StructureDefinition>,
    /// Construction has finished.
    pub completed: bool,
    /// Seconds of construction left.
    pub construction_remaining: f32,
    /// Units waiting to be trained, head first.
    pub production_queue: VecDeque<Arc<UnitDefinition>>,
    /// Seconds until the head of the queue is ready.
    pub production_timer: f32,
}

impl Structure {
    /// Create a finished structure at full health.
    #[must_use]
    pub fn completed(body: Body, definition: Arc<StructureDefinition>) -> Self {
        Self {
            body,
            definition,
            completed: true,
            construction_remaining: 0.0,
            production_queue: VecDeque::new(),
            production_timer: 0.0,
        }
    }

    /// Create a structure that still has to be built.
    ///
    /// A zero build time completes immediately.
    #[must_use]
    pub fn under_construction(body: Body, definition: Arc<StructureDefinition>) -> Self {
        let remaining = definition.build_time.max(0.0);
        Self {
            body,
            definition,
            completed: remaining <= 0.0,
            construction_remaining: remaining,
            production_queue: VecDeque::new(),
            production_timer: 0.0,
        }
    }

    /// Entity id.
    #[must_use]
    pub const fn id(&self) -> EntityId {
        self.body.id
    }

    /// Archetype key.
    #[must_use]
    pub fn kind(&self) -> StructureKind {
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

    /// Alive and completed: may produce, deposit and grant tech.
    #[must_use]
    pub fn is_operational(&self) -> bool {
        self.alive() && self.completed
    }

    /// Operational deposit for worker cargo.
    #[must_use]
    pub fn is_active_deposit(&self) -> bool {
        self.definition.deposit && self.is_operational()
    }

    /// Operational and able to train `kind`.
    #[must_use]
    pub fn can_produce(&self, kind: UnitKind) -> bool {
        self.is_operational() && self.definition.can_produce(kind)
    }

    /// Append a unit to the queue, arming the timer if the queue was empty.
    pub fn enqueue(&mut self, unit: Arc<UnitDefinition>) {
        if self.production_queue.is_empty() {
            self.production_timer = unit.build_time;
        }
        self.production_queue.push_back(unit);
    }

    /// Remove the head of the queue and rearm the timer from the new head.
    pub fn pop_completed(&mut self) -> Option<Arc<UnitDefinition>> {
        let done = self.production_queue.pop_front()?;
        self.production_timer = self
            .production_queue
            .front()
            .map_or(0.0, |next| next.build_time);
        Some(done)
    }

    /// Advance construction. Returns `true` on the tick it completes.
    pub fn advance_construction(&mut self, dt: f32) -> bool {
        if self.completed {
            return false;
        }
        self.construction_remaining = (self.construction_remaining - dt).max(0.0);
        if self.construction_remaining <= 0.0 {
            self.completed = true;
            return true;
        }
        false
    }

    /// Advance the head of the queue, returning it once its timer runs out.
    ///
    /// Does nothing unless the structure is operational.
    pub fn advance_production(&mut self, dt: f32) -> Option<Arc<UnitDefinition>> {
        if !self.is_operational() || self.production_queue.is_empty() {
            return None;
        }
        self.production_timer -= dt;
        if self.production_timer <= 0.0 {
            self.pop_completed()
        } else {
            None
        }
    }

    /// Seconds left on the whole queue.
    #[must_use]
    pub fn queued_time(&self) -> f32 {
        if self.production_queue.is_empty() {
            return 0.0;
        }
        let waiting: f32 = self.production_queue.iter().skip(1).map(|u| u.build_time).sum();
        self.production_timer.max(0.0) + waiting
    }
}
