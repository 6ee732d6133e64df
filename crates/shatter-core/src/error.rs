//! Error types.

use std::path::PathBuf;

use thiserror::Error;

/// Failure to load or validate a [`GameConfig`](crate::config::GameConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        /// Path that was read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The config text is not valid JSON for the schema.
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    /// A value parsed but is out of range.
    #[error("invalid config value for {field}: {reason}")]
    Invalid {
        /// Dotted field path.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },
}

/// Failure to resolve a class by name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClassError {
    /// No class has this name.
    #[error("unknown class: {0}")]
    UnknownClass(String),
}
