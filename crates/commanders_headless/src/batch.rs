//! Batch match runner for balance testing.
//!
//! Runs many seeds in parallel using rayon and aggregates the outcomes
//! into a [`BatchSummary`].

use std::path::{Path, PathBuf};
use std::time::Instant;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{HeadlessError, Result};
use crate::report::{BatchSummary, MatchReport};
use crate::runner::{run_match, RunSettings};

/// File name used when a batch is written to a directory.
pub const BATCH_FILE_NAME: &str = "batch.json";

/// Configuration for a batch run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Number of matches to run
    pub count: u32,
    /// Seed of the first match; later matches count up from it
    pub seed_start: u64,
    /// Maximum parallel matches (0 = use rayon default)
    pub parallel: usize,
    /// Directory to write `batch.json` into
    pub output_dir: Option<PathBuf>,
    /// Template for every match; its seed is overwritten per match
    pub settings: RunSettings,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            count: 16,
            seed_start: 0,
            parallel: 0,
            output_dir: None,
            settings: RunSettings::default(),
        }
    }
}

impl BatchConfig {
    /// Create config for `count` matches starting at `seed_start`
    pub fn new(count: u32, seed_start: u64) -> Self {
        Self {
            count,
            seed_start,
            ..Default::default()
        }
    }

    /// Set the per-match settings template
    pub fn with_settings(mut self, settings: RunSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Set the worker thread count
    pub fn with_parallel(mut self, parallel: usize) -> Self {
        self.parallel = parallel;
        self
    }

    /// Set output directory
    pub fn with_output(mut self, dir: PathBuf) -> Self {
        self.output_dir = Some(dir);
        self
    }

    /// Seeds this batch covers, in order.
    pub fn seeds(&self) -> impl Iterator<Item = u64> + '_ {
        (0..u64::from(self.count)).map(move |i| self.seed_start.wrapping_add(i))
    }
}

/// Results from a batch run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResults {
    /// Configuration used
    pub config: BatchConfig,
    /// Individual match reports, in seed order
    pub reports: Vec<MatchReport>,
    /// Aggregate summary
    pub summary: BatchSummary,
    /// Wall-clock runtime
    pub duration_seconds: f64,
    /// Matches that failed to set up
    pub errors: Vec<BatchError>,
}

impl BatchResults {
    /// Save results to JSON file
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }

    /// Load results from JSON file
    pub fn load(path: &Path) -> std::io::Result<Self> {
        let json = std::fs::read_to_string(path)?;
        serde_json::from_str(&json).map_err(std::io::Error::other)
    }
}

/// A match that could not be run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchError {
    /// Seed used
    pub seed: u64,
    /// Error message
    pub message: String,
}

/// Run every seed of a batch, writing `batch.json` if an output directory is set.
pub fn run_batch(config: BatchConfig) -> Result<BatchResults> {
    config.settings.validate()?;
    let start = Instant::now();
    let seeds: Vec<u64> = config.seeds().collect();

    info!(
        count = config.count,
        seed_start = config.seed_start,
        parallel = config.parallel,
        "Starting batch"
    );

    let run_all = || -> Vec<(u64, Result<MatchReport>)> {
        seeds
            .par_iter()
            .map(|&seed| (seed, run_match(config.settings.clone().with_seed(seed))))
            .collect()
    };

    let outcomes = if config.parallel > 0 {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.parallel)
            .build()
            .map_err(|e| HeadlessError::Settings(format!("thread pool: {e}")))?;
        pool.install(run_all)
    } else {
        run_all()
    };

    let mut reports = Vec::with_capacity(outcomes.len());
    let mut errors = Vec::new();
    for (seed, outcome) in outcomes {
        match outcome {
            Ok(report) => reports.push(report),
            Err(e) => {
                warn!(seed, error = %e, "Match failed");
                errors.push(BatchError {
                    seed,
                    message: e.to_string(),
                });
            }
        }
    }

    let summary = BatchSummary::from_reports(&reports);
    let results = BatchResults {
        config,
        reports,
        summary,
        duration_seconds: start.elapsed().as_secs_f64(),
        errors,
    };

    info!(
        matches = results.summary.total_matches,
        draws = results.summary.draws,
        timeouts = results.summary.timeouts,
        seconds = results.duration_seconds,
        "Batch complete"
    );

    if let Some(dir) = &results.config.output_dir {
        let path = dir.join(BATCH_FILE_NAME);
        results.save(&path).map_err(|e| HeadlessError::io(&path, e))?;
        info!(path = %path.display(), "Batch results written");
    }

    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeds_count_up() {
        let config = BatchConfig::new(3, 40);
        assert_eq!(config.seeds().collect::<Vec<_>>(), vec![40, 41, 42]);
    }

    #[test]
    fn test_seeds_wrap() {
        let config = BatchConfig::new(2, u64::MAX);
        assert_eq!(config.seeds().collect::<Vec<_>>(), vec![u64::MAX, 0]);
    }

    #[test]
    fn test_empty_batch() {
        let results = run_batch(BatchConfig::new(0, 0)).unwrap();
        assert!(results.reports.is_empty());
        assert_eq!(results.summary.total_matches, 0);
    }

    #[test]
    fn test_rejects_bad_settings() {
        let config =
            BatchConfig::new(1, 0).with_settings(RunSettings::default().with_dt(-1.0));
        assert!(run_batch(config).is_err());
    }
}
