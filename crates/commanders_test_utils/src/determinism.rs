//! Determinism testing utilities.
//!
//! Provides a harness for verifying that a match produces identical
//! results given the same seed and the same sequence of frame deltas.
//!
//! # Testing Strategy
//!
//! Sources of non-determinism the harness is meant to catch:
//!
//! - **Unseeded randomness**: every random draw must come from the match
//!   stream or a sub-stream seeded from it.
//!
//! - **Collection order**: iteration must follow insertion order, never a
//!   hash map's.
//!
//! - **Shared streams**: one faction's decisions must not shift the draws
//!   seen by the other.
//!
//! # Test Levels
//!
//! 1. **Unit tests**: individual systems are pure given their inputs
//! 2. **Integration tests**: full matches are reproducible
//! 3. **Parallel tests**: N matches on N threads all agree

use std::thread;

use commanders_core::config::MatchConfig;
use commanders_core::simulation::Match;

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Hashes from each run.
    pub hashes: Vec<u64>,
    /// Number of ticks simulated.
    pub ticks: u64,
}

impl DeterminismResult {
    /// Get all unique hashes (should be 1 for a deterministic match).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique: Vec<u64> = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that the runs agreed, with a detailed error message.
    ///
    /// # Panics
    ///
    /// Panics if the runs produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            panic!(
                "Match is non-deterministic!\n\
                 Runs: {}\n\
                 Ticks: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                self.ticks,
                self.unique_hashes().len(),
                self.hashes
            );
        }
    }
}

/// Run a simulation multiple times and verify determinism.
///
/// # Arguments
///
/// * `runs` - Number of times to run the simulation
/// * `ticks` - Number of ticks to simulate per run
/// * `setup` - Function to create initial state
/// * `step` - Function to advance by one tick
/// * `hash` - Function to compute state hash
pub fn verify_determinism<S, Setup, Step, HashFn>(
    runs: usize,
    ticks: u64,
    setup: Setup,
    step: Step,
    hash: HashFn,
) -> DeterminismResult
where
    Setup: Fn() -> S,
    Step: Fn(&mut S),
    HashFn: Fn(&S) -> u64,
{
    let mut hashes = Vec::with_capacity(runs);

    for _ in 0..runs {
        let mut state = setup();
        for _ in 0..ticks {
            step(&mut state);
        }
        hashes.push(hash(&state));
    }

    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);

    DeterminismResult {
        is_deterministic,
        hashes,
        ticks,
    }
}

/// Run the same match `runs` times with a fixed `dt` and compare hashes.
///
/// # Panics
///
/// Panics if the configuration fails to set up a match.
#[must_use]
pub fn verify_match_determinism(config: &MatchConfig, runs: usize, ticks: u64, dt: f32) -> DeterminismResult {
    verify_determinism(
        runs,
        ticks,
        || Match::new(config.clone()).expect("match setup failed"),
        |m| {
            m.update(dt);
        },
        Match::state_hash,
    )
}

/// Run the same match on `threads` threads and collect final hashes.
///
/// # Panics
///
/// Panics if a thread panics or setup fails.
#[must_use]
pub fn run_parallel_matches(config: &MatchConfig, threads: usize, ticks: u64, dt: f32) -> DeterminismResult {
    let handles: Vec<_> = (0..threads)
        .map(|_| {
            let config = config.clone();
            thread::spawn(move || {
                let mut m = Match::new(config).expect("match setup failed");
                for _ in 0..ticks {
                    m.update(dt);
                }
                m.state_hash()
            })
        })
        .collect();

    let hashes: Vec<u64> = handles
        .into_iter()
        .map(|h| h.join().expect("simulation thread panicked"))
        .collect();
    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);

    DeterminismResult {
        is_deterministic,
        hashes,
        ticks,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verify_determinism_detects_drift() {
        let stable = verify_determinism(3, 10, || 0u64, |s| *s += 1, |s| *s);
        assert!(stable.is_deterministic);
        assert_eq!(stable.unique_hashes(), vec![10]);

        let counter = std::cell::Cell::new(0u64);
        let drifting = verify_determinism(
            2,
            1,
            || {
                counter.set(counter.get() + 1);
                counter.get()
            },
            |_| {},
            |s| *s,
        );
        assert!(!drifting.is_deterministic);
    }

    #[test]
    #[should_panic(expected = "non-deterministic")]
    fn test_assert_panics_on_mismatch() {
        DeterminismResult {
            is_deterministic: false,
            hashes: vec![1, 2],
            ticks: 1,
        }
        .assert_deterministic();
    }
}
