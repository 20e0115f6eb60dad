//! Fixed-step match runner.
//!
//! Drives a [`Match`] with a constant frame delta until one faction wins,
//! both fall, or the time limit runs out.

use std::path::Path;

use commanders_core::config::MatchConfig;
use commanders_core::simulation::Match;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{HeadlessError, Result};
use crate::report::MatchReport;

/// Default frame delta, roughly 60 frames per second.
pub const DEFAULT_DT: f32 = 0.0166;

/// Default time limit in simulated seconds.
pub const DEFAULT_MAX_SECONDS: f64 = 900.0;

/// Settings for a headless run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSettings {
    /// Rules for the match. The seed lives here.
    pub match_config: MatchConfig,
    /// Frame delta in seconds.
    pub dt: f32,
    /// Time limit in simulated seconds.
    pub max_seconds: f64,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            match_config: MatchConfig::default(),
            dt: DEFAULT_DT,
            max_seconds: DEFAULT_MAX_SECONDS,
        }
    }
}

impl RunSettings {
    /// Settings for the standard rules with a seed.
    pub fn new(seed: u64) -> Self {
        Self {
            match_config: MatchConfig::default().with_seed(seed),
            ..Default::default()
        }
    }

    /// Load the rules from a RON file, keeping the current seed.
    pub fn with_config_file(mut self, path: &Path) -> Result<Self> {
        let seed = self.match_config.seed;
        self.match_config = MatchConfig::load(path)?.with_seed(seed);
        Ok(self)
    }

    /// Replace the rules.
    pub fn with_match_config(mut self, config: MatchConfig) -> Self {
        self.match_config = config;
        self
    }

    /// Set the seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.match_config.seed = seed;
        self
    }

    /// Set the frame delta.
    pub fn with_dt(mut self, dt: f32) -> Self {
        self.dt = dt;
        self
    }

    /// Set the time limit.
    pub fn with_max_seconds(mut self, max_seconds: f64) -> Self {
        self.max_seconds = max_seconds;
        self
    }

    /// Reject settings that would never advance the clock.
    pub fn validate(&self) -> Result<()> {
        if !self.dt.is_finite() || self.dt <= 0.0 {
            return Err(HeadlessError::Settings(format!("dt must be positive, got {}", self.dt)));
        }
        if !self.max_seconds.is_finite() || self.max_seconds < 0.0 {
            return Err(HeadlessError::Settings(format!(
                "max-seconds must be non-negative, got {}",
                self.max_seconds
            )));
        }
        Ok(())
    }

    /// Ticks needed to cover the time limit.
    #[must_use]
    pub fn max_ticks(&self) -> u64 {
        (self.max_seconds / f64::from(self.dt)).ceil() as u64
    }
}

/// Owns one match and steps it to completion.
#[derive(Debug)]
pub struct HeadlessRunner {
    settings: RunSettings,
    game: Match,
}

impl HeadlessRunner {
    /// Set up a match from settings.
    pub fn new(settings: RunSettings) -> Result<Self> {
        settings.validate()?;
        let game = Match::new(settings.match_config.clone())?;
        Ok(Self { settings, game })
    }

    /// The match being run.
    #[must_use]
    pub const fn game(&self) -> &Match {
        &self.game
    }

    /// Advance one frame. Returns false once the match is over or out of time.
    pub fn step(&mut self) -> bool {
        if self.game.is_finished() || self.game.elapsed_time() >= self.settings.max_seconds {
            return false;
        }
        let events = self.game.update(self.settings.dt);
        if !events.deaths.is_empty() {
            debug!(
                tick = self.game.tick(),
                deaths = events.deaths.len(),
                "Entities destroyed"
            );
        }
        true
    }

    /// Step until the match ends and report the result.
    pub fn run_to_completion(mut self) -> MatchReport {
        let max_ticks = self.settings.max_ticks();
        info!(
            seed = self.settings.match_config.seed,
            dt = self.settings.dt,
            max_seconds = self.settings.max_seconds,
            "Running match"
        );

        while self.game.tick() < max_ticks && self.step() {}

        let report = MatchReport::from_match(&self.game);
        if self.game.is_finished() {
            info!(
                winner = ?report.winner,
                elapsed = report.elapsed_seconds,
                ticks = report.ticks,
                "Match finished"
            );
        } else {
            warn!(elapsed = report.elapsed_seconds, "Match hit the time limit");
        }
        report
    }
}

/// Run one match to completion.
pub fn run_match(settings: RunSettings) -> Result<MatchReport> {
    Ok(HeadlessRunner::new(settings)?.run_to_completion())
}

/// Outcome of replaying one seed several times.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeterminismReport {
    /// Seed replayed.
    pub seed: u64,
    /// Ticks advanced per run.
    pub ticks: u64,
    /// Final state hash of each run.
    pub hashes: Vec<u64>,
    /// Whether every run ended on the same hash.
    pub deterministic: bool,
}

/// Replay the same settings `runs` times and compare final state hashes.
///
/// Each run stops at the time limit or when its match finishes.
pub fn verify_determinism(settings: &RunSettings, runs: u32) -> Result<DeterminismReport> {
    if runs == 0 {
        return Err(HeadlessError::Settings("runs must be at least 1".into()));
    }

    let mut hashes = Vec::with_capacity(runs as usize);
    let mut ticks = 0;
    for run in 0..runs {
        let report = run_match(settings.clone())?;
        debug!(run, hash = report.state_hash, ticks = report.ticks, "Replay complete");
        ticks = report.ticks;
        hashes.push(report.state_hash);
    }

    let deterministic = hashes.windows(2).all(|w| w[0] == w[1]);
    if deterministic {
        info!(seed = settings.match_config.seed, runs, "All replays agree");
    } else {
        warn!(seed = settings.match_config.seed, ?hashes, "Replays diverged");
    }

    Ok(DeterminismReport {
        seed: settings.match_config.seed,
        ticks,
        hashes,
        deterministic,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use commanders_core::config::MapConfig;

    fn small(seed: u64) -> RunSettings {
        RunSettings::new(seed)
            .with_match_config(MatchConfig::default().with_seed(seed).with_map(MapConfig::small()))
            .with_dt(1.0 / 30.0)
    }

    #[test]
    fn test_rejects_bad_dt() {
        assert!(matches!(
            small(1).with_dt(0.0).validate(),
            Err(HeadlessError::Settings(_))
        ));
        assert!(small(1).with_dt(f32::NAN).validate().is_err());
        assert!(small(1).with_max_seconds(-1.0).validate().is_err());
    }

    #[test]
    fn test_max_ticks_rounds_up() {
        let settings = small(1).with_dt(0.5).with_max_seconds(10.2);
        assert_eq!(settings.max_ticks(), 21);
    }

    #[test]
    fn test_short_run_times_out() {
        let report = run_match(small(3).with_max_seconds(5.0)).unwrap();
        assert_eq!(report.outcome, crate::report::MatchOutcome::Timeout);
        assert_eq!(report.ticks, 150);
        assert_eq!(report.factions.len(), 2);
        assert!(report.winner.is_none());
    }

    #[test]
    fn test_zero_seconds_does_not_tick() {
        let report = run_match(small(4).with_max_seconds(0.0)).unwrap();
        assert_eq!(report.ticks, 0);
    }

    #[test]
    fn test_verify_short_replays() {
        let report = verify_determinism(&small(8).with_max_seconds(4.0), 2).unwrap();
        assert!(report.deterministic);
        assert_eq!(report.hashes.len(), 2);
        assert!(verify_determinism(&small(8), 0).is_err());
    }
}
