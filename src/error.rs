//! Error type shared by the library and the binary.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result alias used across the harness.
pub type Result<T> = std::result::Result<T, SweepError>;

/// Fatal errors. Per-trial failures are reported through
/// [`TrialOutcome`](crate::trial::TrialOutcome) instead.
#[derive(Debug, Error)]
pub enum SweepError {
    /// The configured benchmark executable does not exist.
    #[error("executable not found: {}", path.display())]
    ExecutableNotFound {
        /// Path that was checked.
        path: PathBuf,
    },
    /// The merged configuration cannot drive a sweep.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// The config file exists but could not be read.
    #[error("failed to read config {}: {source}", path.display())]
    ConfigRead {
        /// Config file path.
        path: PathBuf,
        /// Underlying I/O failure.
        source: io::Error,
    },
    /// The config file is not valid TOML for the expected schema.
    #[error("failed to parse config {}: {source}", path.display())]
    ConfigParse {
        /// Config file path.
        path: PathBuf,
        /// Underlying TOML failure.
        source: toml::de::Error,
    },
    /// Filesystem or pipe failure outside a trial.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    /// Drawing or saving the chart failed.
    #[error("failed to render chart {}: {message}", path.display())]
    Render {
        /// Chart output path.
        path: PathBuf,
        /// Backend error text.
        message: String,
    },
    /// JSON serialization failed.
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
    /// CSV writing failed.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    /// The tracing subscriber could not be installed.
    #[error("logging setup failed: {0}")]
    Logging(String),
}
