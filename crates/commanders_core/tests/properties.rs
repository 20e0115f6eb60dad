//! Property tests for the pathfinder, economy and terrain generation.

use commanders_core::config::MapConfig;
use commanders_core::data::{StructureKind, UnitKind};
use commanders_core::economy::ResourceNode;
use commanders_core::map_generation::generate_map_seeded;
use commanders_core::math::Vec2;
use commanders_core::pathfinding::find_path;
use commanders_core::production;
use commanders_test_utils::fixtures::{open_grid, WorldBuilder, RED};
use commanders_test_utils::strategies::{nav_grid, tile_in};
use proptest::prelude::*;

proptest! {
    /// On uniform grass the path has exactly Manhattan distance + 1 cells.
    #[test]
    fn prop_open_grid_paths_are_shortest(
        start in tile_in(12, 12),
        goal in tile_in(12, 12),
    ) {
        let grid = open_grid(12, 12);
        let path = find_path(&grid, start, goal).unwrap();
        prop_assert_eq!(path.len() as u32, start.manhattan(goal) + 1);
    }

    /// Any path found steps between adjacent walkable tiles.
    #[test]
    fn prop_paths_are_adjacent_and_walkable(
        grid in nav_grid(10, 10),
        start in tile_in(10, 10),
        goal in tile_in(10, 10),
    ) {
        if let Some(path) = find_path(&grid, start, goal) {
            prop_assert_eq!(path.first().copied(), Some(start));
            prop_assert_eq!(path.last().copied(), Some(goal));
            for pair in path.windows(2) {
                prop_assert!(pair[0].is_adjacent(pair[1]));
                prop_assert!(grid.is_walkable(pair[1]));
            }
        }
    }

    /// Harvesting never yields more than the node held.
    #[test]
    fn prop_harvest_conserves_amount(
        initial in 0.0f32..5000.0,
        requests in proptest::collection::vec(0.0f32..500.0, 0..40),
    ) {
        let mut node = ResourceNode::new(1, Vec2::ZERO, initial);
        let mut total = 0.0f32;
        let mut last = node.amount;
        for r in requests {
            total += node.harvest(r);
            prop_assert!(node.amount >= 0.0);
            prop_assert!(node.amount <= last);
            last = node.amount;
        }
        prop_assert!(total <= initial + 1e-2);
    }

    /// Terrain is a pure function of the seed.
    #[test]
    fn prop_map_generation_is_deterministic(seed in any::<u64>()) {
        let config = MapConfig { width: 24, height: 20, tile_size: 16.0 };
        prop_assert_eq!(generate_map_seeded(&config, seed), generate_map_seeded(&config, seed));
    }

    /// Units leave a production queue in the order they were requested.
    #[test]
    fn prop_production_queue_is_fifo(
        order in proptest::collection::vec(
            prop_oneof![Just(UnitKind::Infantry), Just(UnitKind::Ranger)],
            1..=5,
        ),
    ) {
        let mut world = WorldBuilder::open(24, 24)
            .structure(RED, StructureKind::Barracks, 12, 12)
            .with_resources(RED, 1_000.0)
            .build();
        let barracks = world.factions[0].structures[0].id();
        for kind in &order {
            prop_assert!(world.queue_unit_production(RED, barracks, *kind));
        }

        let mut produced = Vec::new();
        for _ in 0..300 {
            for id in production::update_faction(&mut world, RED, 0.1) {
                produced.push(world.find_unit(id).map(|u| u.kind()));
            }
        }
        let expected: Vec<_> = order.into_iter().map(Some).collect();
        prop_assert_eq!(produced, expected);
    }
}
