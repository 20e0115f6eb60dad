//! Headless match runner for Pixel Commanders.
//!
//! Runs matches without a window, driving the simulation with a fixed frame
//! delta and reporting outcomes as JSON. This enables:
//!
//! - **Observation**: watch a seed play out and read the final report
//! - **Balance sweeps**: run seed batches in parallel and compare win rates
//! - **CI verification**: check that a seed replays bit-identically
//!
//! # Output
//!
//! - **stdout**: JSON reports (or ASCII maps for `map`)
//! - **stderr**: logs (human-readable)
//!
//! # Example
//!
//! ```bash
//! cargo run -p commanders_headless -- run --seed 7 --pretty
//! cargo run -p commanders_headless -- batch --count 64 --seed 1000 --output results/
//! cargo run -p commanders_headless -- verify --seed 7 --runs 3 --seconds 120
//! ```

pub mod ascii_visualizer;
pub mod batch;
pub mod error;
pub mod report;
pub mod runner;
pub mod validate;

pub use ascii_visualizer::{render_ascii, render_terrain, AsciiConfig};
pub use batch::{run_batch, BatchConfig, BatchResults};
pub use error::{HeadlessError, Result};
pub use report::{BatchSummary, FactionReport, MatchOutcome, MatchReport};
pub use runner::{run_match, verify_determinism, DeterminismReport, HeadlessRunner, RunSettings};
pub use validate::{validate_file, FileKind, ValidationReport};
