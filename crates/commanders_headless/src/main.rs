//! Headless Pixel Commanders runner.
//!
//! Runs AI-versus-AI matches without graphics and reports results as JSON.
//! Designed for balance sweeps, CI determinism checks and quick map review.
//!
//! # Usage
//!
//! ```bash
//! # Run one match to a winner or the time limit
//! cargo run -p commanders_headless -- run --seed 7 --pretty
//!
//! # Run a batch of seeds in parallel
//! cargo run -p commanders_headless -- batch --count 64 --seed 1000 --output results/
//!
//! # Replay a seed and compare state hashes
//! cargo run -p commanders_headless -- verify --seed 7 --runs 3 --seconds 120
//!
//! # Print the generated map
//! cargo run -p commanders_headless -- map --seed 7 --entities
//!
//! # Check a config or blueprint file
//! cargo run -p commanders_headless -- validate rules.ron
//! ```
//!
//! Output (stdout): JSON reports or ASCII maps
//! Logs (stderr): human-readable, filtered by `RUST_LOG`

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use commanders_core::config::MatchConfig;
use commanders_core::simulation::Match;
use commanders_headless::{
    ascii_visualizer::{render_ascii, AsciiConfig},
    batch::{run_batch, BatchConfig},
    error::Result,
    runner::{run_match, verify_determinism, RunSettings, DEFAULT_DT, DEFAULT_MAX_SECONDS},
    validate::validate_file,
};

#[derive(Parser)]
#[command(name = "commanders_headless")]
#[command(about = "Headless Pixel Commanders runner for balance testing and CI")]
#[command(version)]
struct Cli {
    /// Enable verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a single match and print its report
    Run {
        /// Match seed
        #[arg(short, long, default_value = "0")]
        seed: u64,

        /// Frame delta in seconds
        #[arg(long, default_value_t = DEFAULT_DT)]
        dt: f32,

        /// Time limit in simulated seconds
        #[arg(long, default_value_t = DEFAULT_MAX_SECONDS)]
        max_seconds: f64,

        /// RON match config to use instead of the defaults
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Pretty-print the JSON report
        #[arg(long)]
        pretty: bool,
    },

    /// Run a batch of seeds in parallel
    Batch {
        /// Number of matches to run
        #[arg(short, long, default_value = "16")]
        count: u32,

        /// Seed of the first match
        #[arg(short, long, default_value = "0")]
        seed: u64,

        /// Maximum parallel matches (0 = auto)
        #[arg(short, long, default_value = "0")]
        parallel: usize,

        /// Directory to write batch.json into
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Frame delta in seconds
        #[arg(long, default_value_t = DEFAULT_DT)]
        dt: f32,

        /// Time limit per match in simulated seconds
        #[arg(long, default_value_t = DEFAULT_MAX_SECONDS)]
        max_seconds: f64,

        /// RON match config shared by every match
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Replay a seed several times and compare state hashes
    Verify {
        /// Match seed
        #[arg(short, long, default_value = "0")]
        seed: u64,

        /// Number of replays
        #[arg(short, long, default_value = "3")]
        runs: u32,

        /// Simulated seconds per replay
        #[arg(long, default_value = "120")]
        seconds: f64,

        /// Frame delta in seconds
        #[arg(long, default_value_t = DEFAULT_DT)]
        dt: f32,
    },

    /// Print the generated map as ASCII
    Map {
        /// Match seed
        #[arg(short, long, default_value = "0")]
        seed: u64,

        /// Overlay structures, units and resource nodes
        #[arg(long)]
        entities: bool,

        /// RON match config to use instead of the defaults
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Parse and validate a config or blueprint file
    Validate {
        /// File to check
        file: PathBuf,

        /// Treat the file as a blueprint table
        #[arg(long)]
        blueprints: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Logs go to stderr; stdout is for reports
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(true),
        )
        .with(filter)
        .init();

    let outcome = match cli.command {
        Commands::Run {
            seed,
            dt,
            max_seconds,
            config,
            pretty,
        } => cmd_run(seed, dt, max_seconds, config.as_deref(), pretty),
        Commands::Batch {
            count,
            seed,
            parallel,
            output,
            dt,
            max_seconds,
            config,
        } => cmd_batch(count, seed, parallel, output, dt, max_seconds, config.as_deref()),
        Commands::Verify {
            seed,
            runs,
            seconds,
            dt,
        } => cmd_verify(seed, runs, seconds, dt),
        Commands::Map {
            seed,
            entities,
            config,
        } => cmd_map(seed, entities, config.as_deref()),
        Commands::Validate { file, blueprints } => cmd_validate(&file, blueprints),
    };

    match outcome {
        Ok(code) => code,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn settings(seed: u64, dt: f32, max_seconds: f64, config: Option<&Path>) -> Result<RunSettings> {
    let settings = RunSettings::new(seed).with_dt(dt).with_max_seconds(max_seconds);
    match config {
        Some(path) => settings.with_config_file(path),
        None => Ok(settings),
    }
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{json}");
    Ok(())
}

fn cmd_run(seed: u64, dt: f32, max_seconds: f64, config: Option<&Path>, pretty: bool) -> Result<ExitCode> {
    let report = run_match(settings(seed, dt, max_seconds, config)?)?;
    print_json(&report, pretty)?;
    Ok(ExitCode::SUCCESS)
}

fn cmd_batch(
    count: u32,
    seed: u64,
    parallel: usize,
    output: Option<PathBuf>,
    dt: f32,
    max_seconds: f64,
    config: Option<&Path>,
) -> Result<ExitCode> {
    let mut batch = BatchConfig::new(count, seed)
        .with_parallel(parallel)
        .with_settings(settings(seed, dt, max_seconds, config)?);
    if let Some(dir) = output {
        batch = batch.with_output(dir);
    }

    let results = run_batch(batch)?;
    print_json(&results.summary, true)?;
    if results.errors.is_empty() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

fn cmd_verify(seed: u64, runs: u32, seconds: f64, dt: f32) -> Result<ExitCode> {
    let report = verify_determinism(&settings(seed, dt, seconds, None)?, runs)?;
    print_json(&report, true)?;
    if report.deterministic {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

fn cmd_map(seed: u64, entities: bool, config: Option<&Path>) -> Result<ExitCode> {
    let match_config = match config {
        Some(path) => MatchConfig::load(path)?.with_seed(seed),
        None => MatchConfig::default().with_seed(seed),
    };
    let game = Match::new(match_config)?;
    let ascii = AsciiConfig {
        show_entities: entities,
        show_legend: true,
    };
    print!("{}", render_ascii(&game, &ascii));
    Ok(ExitCode::SUCCESS)
}

fn cmd_validate(file: &Path, blueprints: bool) -> Result<ExitCode> {
    let report = validate_file(file, blueprints)?;
    print_json(&report, true)?;
    Ok(ExitCode::SUCCESS)
}
