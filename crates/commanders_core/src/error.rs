//! Error types for match setup.
//!
//! Nothing inside a running tick returns these: orders, construction and
//! production requests simply decline. Errors are reserved for loading data
//! and for the one unrecoverable setup condition.

use thiserror::Error;

/// Result type alias using [`GameError`].
pub type Result<T> = std::result::Result<T, GameError>;

/// Top-level error type for simulation setup.
#[derive(Debug, Error)]
pub enum GameError {
    /// Terrain generation produced no walkable tile anywhere.
    #[error("No walkable tile found on a {width}x{height} map")]
    NoWalkableTile {
        /// Map width in tiles.
        width: u32,
        /// Map height in tiles.
        height: u32,
    },

    /// Data file parsing error.
    #[error("Failed to parse data file '{path}': {message}")]
    DataParseError {
        /// Path (or label for embedded data) of the file that failed to parse.
        path: String,
        /// Error message.
        message: String,
    },

    /// A blueprint table failed validation.
    #[error("Invalid blueprint table: {0}")]
    InvalidBlueprint(String),

    /// A blueprint key was looked up but is not registered.
    #[error("Blueprint not found: {0}")]
    MissingBlueprint(String),

    /// Configuration values are out of range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Failed to read a configuration file.
    #[error("Failed to read '{path}': {source}")]
    Io {
        /// Path to the file.
        path: String,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },
}
