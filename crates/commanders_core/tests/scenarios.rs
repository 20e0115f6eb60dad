//! Scripted match scenarios on hand-built maps.

use commanders_core::config::{MapConfig, MatchConfig};
use commanders_core::data::{StructureKind, UnitKind};
use commanders_core::economy::WorkerState;
use commanders_core::math::TilePos;
use commanders_core::pathfinding::{find_path, find_path_with_budget};
use commanders_core::production;
use commanders_core::simulation::{Match, TickEvents};
use commanders_test_utils::fixtures::{two_base_world, WorldBuilder, BLUE, RED};

#[test]
fn test_destroyed_hq_hands_victory_to_opponent() {
    let mut m = two_base_world().into_match(1);
    let red_hq = m.factions()[0].structures[0].id();
    assert!((m.factions()[0].structures[0].body.health - 900.0).abs() < f32::EPSILON);

    m.world_mut().factions[0].structures[0].body.health = 0.0;
    let events = m.update(1.0 / 60.0);

    assert!(m.factions()[0].defeated);
    assert!(!m.factions()[1].defeated);
    assert_eq!(m.winner(), Some(BLUE));
    assert_eq!(events.winner, Some(BLUE));
    assert!(events.deaths.contains(&red_hq));
    assert!(m.is_finished());
}

#[test]
fn test_finished_match_is_frozen() {
    let mut m = two_base_world()
        .unit(BLUE, UnitKind::Infantry, 20, 20)
        .into_match(2);
    m.world_mut().factions[0].structures[0].body.health = 0.0;
    m.update(0.1);
    assert_eq!(m.winner(), Some(BLUE));

    let hash = m.state_hash();
    let tick = m.tick();
    for _ in 0..50 {
        assert_eq!(m.update(0.1), TickEvents::default());
    }
    assert_eq!(m.state_hash(), hash);
    assert_eq!(m.tick(), tick);
}

#[test]
fn test_units_keep_a_faction_alive() {
    let mut m = two_base_world()
        .unit(RED, UnitKind::Worker, 10, 10)
        .into_match(3);
    m.world_mut().factions[0].structures[0].body.health = 0.0;
    m.update(0.1);
    assert!(!m.factions()[0].defeated);
    assert_eq!(m.winner(), None);
}

#[test]
fn test_first_delivery_is_one_full_load() {
    let mut m = two_base_world()
        .unit(RED, UnitKind::Worker, 5, 4)
        .node(11, 4, 500.0)
        .into_match(4);
    let worker = m.factions()[0].units[0].id();

    let mut delivered = None;
    for _ in 0..600 {
        m.update(1.0 / 30.0);
        let gathered = m.factions()[0].stats.resources_gathered;
        if gathered > 0.0 {
            delivered = Some(gathered);
            break;
        }
    }
    assert_eq!(delivered, Some(120.0));
    let unit = m.world().find_unit(worker).unwrap();
    assert_eq!(unit.worker.as_ref().unwrap().state, WorkerState::Idle);
}

#[test]
fn test_production_queue_is_fifo() {
    let mut world = WorldBuilder::open(24, 24)
        .structure(RED, StructureKind::Barracks, 12, 12)
        .with_resources(RED, 1_000.0)
        .build();
    let barracks = world.factions[0].structures[0].id();
    let order = [UnitKind::Ranger, UnitKind::Infantry, UnitKind::Ranger];
    for kind in order {
        assert!(world.queue_unit_production(RED, barracks, kind));
    }

    let mut produced = Vec::new();
    for _ in 0..200 {
        for id in production::update_faction(&mut world, RED, 0.1) {
            produced.push(world.find_unit(id).unwrap().kind());
        }
    }
    assert_eq!(produced, order);
}

#[test]
fn test_generated_bases_are_connected() {
    for seed in 0..6 {
        let config = MatchConfig::default()
            .with_seed(seed)
            .with_map(MapConfig::small());
        let m = Match::new(config).unwrap();
        let grid = m.grid();
        let hqs: Vec<TilePos> = m
            .factions()
            .iter()
            .map(|f| grid.world_to_tile(f.structures[0].position()))
            .collect();
        let budget = (grid.width() * grid.height()) as usize;
        assert!(
            find_path_with_budget(grid, hqs[0], hqs[1], budget).is_some(),
            "seed {seed}: bases not connected"
        );
    }
}

#[test]
fn test_default_maps_connect_within_unit_budget() {
    for seed in 0..4 {
        let m = Match::new(MatchConfig::default().with_seed(seed)).unwrap();
        let grid = m.grid();
        assert_eq!((grid.width(), grid.height()), (128, 128));
        let hqs: Vec<TilePos> = m
            .factions()
            .iter()
            .map(|f| grid.world_to_tile(f.structures[0].position()))
            .collect();
        assert!(
            find_path(grid, hqs[0], hqs[1]).is_some(),
            "seed {seed}: no unit-budget path between bases"
        );
    }
}

#[test]
fn test_commanders_expand_over_time() {
    let config = MatchConfig::default()
        .with_seed(99)
        .with_map(MapConfig::small());
    let mut m = Match::new(config).unwrap();
    for _ in 0..(60 * 30) {
        m.update(1.0 / 30.0);
        if m.is_finished() {
            break;
        }
    }
    for faction in m.factions() {
        assert!(faction.stats.structures_started >= 1, "{} never built", faction.profile.name);
        assert!(faction.stats.units_produced >= 1, "{} never trained", faction.profile.name);
    }
}
