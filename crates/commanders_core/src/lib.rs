//! # Commanders Core
//!
//! Simulation engine for Pixel Commanders, a two-faction real-time strategy
//! match played out entirely by autonomous commanders.
//!
//! This crate contains the whole simulation and nothing else:
//! - No rendering
//! - No window or input handling
//! - No file IO (callers hand in RON text or paths to config loaders)
//! - All randomness drawn from explicitly seeded streams
//!
//! Replaying a match with the same seed and the same sequence of frame
//! deltas reproduces it exactly on the same machine.
//!
//! ## Crate Structure
//!
//! - [`map_generation`] - Procedural terrain with connectivity repair
//! - [`pathfinding`] - Navigation grid and weighted A*
//! - [`data`] - Unit and structure blueprints
//! - [`components`], [`units`], [`buildings`], [`economy`] - Runtime entities
//! - [`production`] - Construction, production queues and the worker cycle
//! - [`combat`] - Target acquisition and damage
//! - [`ai`] - Per-faction autonomous controller
//! - [`world`] - Mutable match state and factory operations
//! - [`simulation`] - Match controller driving the tick

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod ai;
pub mod buildings;
pub mod combat;
pub mod components;
pub mod config;
pub mod data;
pub mod economy;
pub mod error;
pub mod factions;
pub mod map_generation;
pub mod math;
pub mod pathfinding;
pub mod production;
pub mod simulation;
pub mod units;
pub mod world;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::buildings::Structure;
    pub use crate::components::{Body, EntityId, IdAllocator};
    pub use crate::config::{EconomyTuning, MapConfig, MatchConfig, ResourceFieldConfig};
    pub use crate::data::{
        Blueprints, StructureDefinition, StructureKind, UnitDefinition, UnitKind, UnitRole,
        MAX_TECH_LEVEL,
    };
    pub use crate::economy::{ResourceNode, Worker, WorkerState};
    pub use crate::error::{GameError, Result};
    pub use crate::factions::{FactionId, FactionProfile, FactionState};
    pub use crate::math::{TilePos, Vec2};
    pub use crate::pathfinding::{find_path, NavGrid, TerrainKind, Tile};
    pub use crate::simulation::{Match, TickEvents};
    pub use crate::units::Unit;
    pub use crate::world::World;
}
