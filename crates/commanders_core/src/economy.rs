//! Resource nodes and the worker gather/deposit cycle.
//!
//! The worker cycle is a pure transition function: [`step_worker`] reads a
//! snapshot of what the worker can see and returns its next state plus the
//! side effects the caller must apply (path orders, harvests, deposits).
//! Nothing here touches the world directly.
//!
//! ```text
//! Idle -> ToResource -> Gather -> ToDeposit -> Deposit -> Idle
//!   ^         |           |           |
//!   +---------+-----------+-----------+   (node gone, empty harvest, deposit lost)
//! ```

use serde::{Deserialize, Serialize};

use crate::components::EntityId;
use crate::config::EconomyTuning;
use crate::math::Vec2;

/// A harvestable resource deposit on the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceNode {
    /// Unique id.
    pub id: EntityId,
    /// World position in pixels.
    pub position: Vec2,
    /// Amount left.
    pub amount: f32,
    /// Amount at creation.
    pub initial_amount: f32,
}

impl ResourceNode {
    /// Create a full node.
    #[must_use]
    pub fn new(id: EntityId, position: Vec2, amount: f32) -> Self {
        let amount = amount.max(0.0);
        Self {
            id,
            position,
            amount,
            initial_amount: amount,
        }
    }

    /// Remove up to `requested`, returning the amount actually removed.
    pub fn harvest(&mut self, requested: f32) -> f32 {
        let taken = requested.max(0.0).min(self.amount);
        self.amount -= taken;
        taken
    }

    /// Nothing left to harvest.
    #[must_use]
    pub fn depleted(&self) -> bool {
        self.amount <= 0.0
    }
}

/// Phase of the worker cycle.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum WorkerState {
    /// Waiting for a node assignment.
    #[default]
    Idle,
    /// Walking to the target node.
    ToResource,
    /// Gathering at the node.
    Gather {
        /// Seconds left.
        remaining: f32,
    },
    /// Carrying cargo to the target deposit.
    ToDeposit,
    /// Unloading at the deposit.
    Deposit {
        /// Seconds left.
        remaining: f32,
    },
}

/// Worker payload carried by worker-role units.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Worker {
    /// Current phase.
    pub state: WorkerState,
    /// Node being worked.
    pub target_resource: Option<EntityId>,
    /// Structure receiving the cargo.
    pub target_deposit: Option<EntityId>,
    /// Resources carried.
    pub cargo: f32,
    /// Nodes this worker could not find a route to. Never chosen again.
    #[serde(default)]
    pub unreachable: Vec<EntityId>,
}

impl Worker {
    /// Back to `Idle` with no targets or cargo, keeping the unreachable list.
    #[must_use]
    pub fn to_idle(&self) -> Self {
        Self {
            unreachable: self.unreachable.clone(),
            ..Self::default()
        }
    }

    /// Give up the current trip after a route order failed.
    ///
    /// A node the worker was walking to is remembered as unreachable. Any
    /// cargo is lost.
    #[must_use]
    pub fn abandon_route(&self) -> Self {
        let mut idle = self.to_idle();
        if self.state == WorkerState::ToResource {
            if let Some(node) = self.target_resource {
                if !idle.unreachable.contains(&node) {
                    idle.unreachable.push(node);
                }
            }
        }
        idle
    }
}

/// A non-depleted node as seen by a worker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeView {
    /// Node id.
    pub id: EntityId,
    /// Node position.
    pub position: Vec2,
    /// Amount left.
    pub amount: f32,
}

/// An operational deposit of the worker's own faction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DepositView {
    /// Structure id.
    pub id: EntityId,
    /// Structure position.
    pub position: Vec2,
    /// Structure collision radius.
    pub radius: f32,
}

/// Everything a worker needs to decide its next step.
#[derive(Debug, Clone, Copy)]
pub struct WorkerView<'a> {
    /// Worker position.
    pub position: Vec2,
    /// The worker has no path cells left.
    pub path_exhausted: bool,
    /// Reference point for choosing a node while idle.
    pub anchor: Vec2,
    /// Nodes with resources left.
    pub nodes: &'a [NodeView],
    /// Alive and completed deposits.
    pub deposits: &'a [DepositView],
    /// Tile edge length in pixels.
    pub tile_size: f32,
}

/// Side effect requested by a worker transition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WorkerEffect {
    /// Issue a path order to the tile containing this position.
    MoveTo(Vec2),
    /// Stop walking.
    ClearPath,
    /// Remove resources from a node.
    Harvest {
        /// Node id.
        node: EntityId,
        /// Amount to remove.
        amount: f32,
    },
    /// Credit resources to the faction.
    Deposit {
        /// Amount credited.
        amount: f32,
    },
}

/// Result of one worker step.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkerTransition {
    /// State after the step.
    pub next: Worker,
    /// Effects to apply, in order.
    pub effects: Vec<WorkerEffect>,
}

impl WorkerTransition {
    fn stay(worker: Worker) -> Self {
        Self {
            next: worker,
            effects: Vec::new(),
        }
    }
}

/// Nearest by distance, lower id on ties.
fn nearest<T: Copy>(
    items: &[T],
    from: Vec2,
    key: impl Fn(&T) -> (EntityId, Vec2),
) -> Option<T> {
    items
        .iter()
        .min_by(|a, b| {
            let (ida, pa) = key(a);
            let (idb, pb) = key(b);
            from.distance_squared(pa)
                .total_cmp(&from.distance_squared(pb))
                .then(ida.cmp(&idb))
        })
        .copied()
}

/// Advance one worker by `dt` seconds.
#[must_use]
pub fn step_worker(
    worker: &Worker,
    view: &WorkerView<'_>,
    dt: f32,
    tuning: &EconomyTuning,
) -> WorkerTransition {
    match worker.state {
        WorkerState::Idle => {
            let live: Vec<NodeView> = view
                .nodes
                .iter()
                .copied()
                .filter(|n| n.amount > 0.0 && !worker.unreachable.contains(&n.id))
                .collect();
            let Some(node) = nearest(&live, view.anchor, |n| (n.id, n.position)) else {
                return WorkerTransition::stay(worker.clone());
            };
            WorkerTransition {
                next: Worker {
                    state: WorkerState::ToResource,
                    target_resource: Some(node.id),
                    target_deposit: None,
                    cargo: 0.0,
                    unreachable: worker.unreachable.clone(),
                },
                effects: vec![WorkerEffect::MoveTo(node.position)],
            }
        }

        WorkerState::ToResource => {
            let target = worker
                .target_resource
                .and_then(|id| view.nodes.iter().find(|n| n.id == id && n.amount > 0.0));
            let Some(node) = target else {
                return WorkerTransition {
                    next: worker.to_idle(),
                    effects: vec![WorkerEffect::ClearPath],
                };
            };
            let arrive = tuning.resource_arrive_factor * view.tile_size;
            if view.position.distance(node.position) <= arrive || view.path_exhausted {
                WorkerTransition {
                    next: Worker {
                        state: WorkerState::Gather {
                            remaining: tuning.gather_duration,
                        },
                        ..worker.clone()
                    },
                    effects: vec![WorkerEffect::ClearPath],
                }
            } else {
                WorkerTransition::stay(worker.clone())
            }
        }

        WorkerState::Gather { remaining } => {
            let remaining = remaining - dt;
            if remaining > 0.0 {
                return WorkerTransition::stay(Worker {
                    state: WorkerState::Gather { remaining },
                    ..worker.clone()
                });
            }

            let node = worker
                .target_resource
                .and_then(|id| view.nodes.iter().find(|n| n.id == id));
            let harvested = node.map_or(0.0, |n| n.amount.max(0.0).min(tuning.carry_capacity));
            let Some(node) = node.filter(|_| harvested > 0.0) else {
                return WorkerTransition::stay(worker.to_idle());
            };

            let mut effects = vec![WorkerEffect::Harvest {
                node: node.id,
                amount: harvested,
            }];
            match nearest(view.deposits, view.position, |d| (d.id, d.position)) {
                Some(deposit) => {
                    effects.push(WorkerEffect::MoveTo(deposit.position));
                    WorkerTransition {
                        next: Worker {
                            state: WorkerState::ToDeposit,
                            target_resource: worker.target_resource,
                            target_deposit: Some(deposit.id),
                            cargo: harvested,
                            unreachable: worker.unreachable.clone(),
                        },
                        effects,
                    }
                }
                // Nowhere to unload; the cargo is dropped.
                None => WorkerTransition {
                    next: worker.to_idle(),
                    effects,
                },
            }
        }

        WorkerState::ToDeposit => {
            let target = worker
                .target_deposit
                .and_then(|id| view.deposits.iter().find(|d| d.id == id));
            let Some(deposit) = target else {
                return WorkerTransition {
                    next: worker.to_idle(),
                    effects: vec![WorkerEffect::ClearPath],
                };
            };
            let arrive = deposit.radius + tuning.deposit_arrive_factor * view.tile_size;
            if view.position.distance(deposit.position) <= arrive {
                WorkerTransition {
                    next: Worker {
                        state: WorkerState::Deposit {
                            remaining: tuning.deposit_duration,
                        },
                        ..worker.clone()
                    },
                    effects: vec![WorkerEffect::ClearPath],
                }
            } else if view.path_exhausted {
                WorkerTransition {
                    next: worker.clone(),
                    effects: vec![WorkerEffect::MoveTo(deposit.position)],
                }
            } else {
                WorkerTransition::stay(worker.clone())
            }
        }

        WorkerState::Deposit { remaining } => {
            let remaining = remaining - dt;
            if remaining > 0.0 {
                return WorkerTransition::stay(Worker {
                    state: WorkerState::Deposit { remaining },
                    ..worker.clone()
                });
            }
            let mut effects = Vec::new();
            if worker.cargo > 0.0 {
                effects.push(WorkerEffect::Deposit {
                    amount: worker.cargo,
                });
            }
            WorkerTransition {
                next: worker.to_idle(),
                effects,
            }
        }
    }
}
