//! Error types for the magecheck library.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for magecheck operations.
///
/// These are the fatal conditions. Problems found *in* a submission are
/// recorded on status channels as [`Finding`](crate::validation::Finding)s instead.
#[derive(Debug, Error)]
pub enum MagetabError {
    /// Error reading or accessing a file.
    #[error("IO error for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error from the CSV library.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Invalid validator configuration, detected before any I/O.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A requested check module is not present in the registry.
    #[error("Configuration error: unknown check module '{0}'")]
    UnknownCheckModule(String),

    /// A combined document has no `[IDF]` section marker.
    #[error("No [IDF] section marker found in combined document '{path}'")]
    SplitFormat { path: PathBuf },

    /// A naive stage parser could not make sense of a file.
    #[error("Parse error in '{path}': {message}")]
    Parse { path: PathBuf, message: String },

    /// A status channel was queried before it was created.
    #[error("Status channel not found: {0}")]
    ChannelNotFound(String),

    /// The full-model builder failed.
    #[error("Full MAGE-TAB parse failed: {0}")]
    FullParse(String),
}

impl MagetabError {
    /// Wrap an I/O error with the path it occurred on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        MagetabError::Io {
            path: path.into(),
            source,
        }
    }

    /// Build a parse error for `path`.
    pub fn parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        MagetabError::Parse {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Result type alias for magecheck operations.
pub type Result<T> = std::result::Result<T, MagetabError>;
