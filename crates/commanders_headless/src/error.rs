//! Error type for the headless runner.

use commanders_core::error::GameError;
use thiserror::Error;

/// Result type alias using [`HeadlessError`].
pub type Result<T> = std::result::Result<T, HeadlessError>;

/// Errors surfaced by the headless commands.
#[derive(Debug, Error)]
pub enum HeadlessError {
    /// Match setup or data loading failed.
    #[error(transparent)]
    Game(#[from] GameError),

    /// Reading or writing an output file failed.
    #[error("I/O error on '{path}': {source}")]
    Io {
        /// File involved.
        path: String,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// JSON encoding or decoding failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// RON encoding failed.
    #[error("RON error: {0}")]
    Ron(#[from] ron::Error),

    /// Invalid command-line settings.
    #[error("Invalid settings: {0}")]
    Settings(String),
}

impl HeadlessError {
    pub(crate) fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            source,
        }
    }
}
