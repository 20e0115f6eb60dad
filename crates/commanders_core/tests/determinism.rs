//! Full-match reproducibility.

use commanders_core::config::{MapConfig, MatchConfig};
use commanders_core::simulation::Match;
use commanders_test_utils::determinism::{run_parallel_matches, verify_determinism, verify_match_determinism};
use commanders_test_utils::strategies::frame_deltas;
use proptest::prelude::*;

fn small(seed: u64) -> MatchConfig {
    MatchConfig::default()
        .with_seed(seed)
        .with_map(MapConfig::small())
}

#[test]
fn test_same_seed_same_match() {
    verify_match_determinism(&small(7), 3, 600, 1.0 / 30.0).assert_deterministic();
}

#[test]
fn test_parallel_matches_agree() {
    run_parallel_matches(&small(21), 4, 300, 1.0 / 30.0).assert_deterministic();
}

#[test]
fn test_different_seeds_diverge() {
    let a = Match::new(small(1)).unwrap().state_hash();
    let b = Match::new(small(2)).unwrap().state_hash();
    assert_ne!(a, b);
}

#[test]
fn test_reset_is_reproducible() {
    let result = verify_determinism(
        2,
        3,
        || Match::new(small(5)).unwrap(),
        |m| {
            for _ in 0..60 {
                m.update(0.05);
            }
            m.reset().unwrap();
        },
        Match::state_hash,
    );
    result.assert_deterministic();
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(8))]

    /// Variable frame deltas replay exactly.
    #[test]
    fn prop_variable_deltas_replay(seed in 0u64..1000, deltas in frame_deltas(120)) {
        let run = |deltas: &[f32]| {
            let mut m = Match::new(small(seed)).unwrap();
            for dt in deltas {
                m.update(*dt);
            }
            m.state_hash()
        };
        prop_assert_eq!(run(&deltas), run(&deltas));
    }
}
