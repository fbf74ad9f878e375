//! Layered sweep configuration: built-in defaults, then the TOML config file,
//! then command-line overrides.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, SweepError};

/// Step counts swept when neither the config file nor the CLI names any.
pub const DEFAULT_STEPS: [u64; 3] = [100_000_000, 1_000_000_000, 3_000_000_000];
/// Highest thread count tried per step count by default.
pub const DEFAULT_MAX_THREADS: u32 = 50;
/// Chart written when no output path is configured.
pub const DEFAULT_OUTPUT: &str = "wykres_pi.svg";

/// Fully resolved settings for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepConfig {
    /// Benchmark executable launched for every trial.
    pub executable: PathBuf,
    /// Step counts in sweep order.
    pub steps: Vec<u64>,
    /// Thread counts run from 1 up to and including this value.
    pub max_threads: u32,
    /// Chart destination.
    pub output: PathBuf,
    /// Optional CSV export of every recorded point.
    pub csv: Option<PathBuf>,
    /// Optional JSON export of the full result set.
    pub json: Option<PathBuf>,
    /// Whether to hand the chart to the system viewer after saving it.
    pub show: bool,
}

/// On-disk config file shape. Every key is optional.
#[derive(Debug, Default, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    /// Benchmark executable path.
    pub executable: Option<PathBuf>,
    /// Step counts in sweep order.
    pub steps: Option<Vec<u64>>,
    /// Maximum thread count.
    pub max_threads: Option<u32>,
    /// Chart destination.
    pub output: Option<PathBuf>,
    /// CSV export destination.
    pub csv: Option<PathBuf>,
    /// JSON export destination.
    pub json: Option<PathBuf>,
    /// Open the chart after saving.
    pub show: Option<bool>,
}

/// Values supplied on the command line; `Some` wins over the config file.
#[derive(Debug, Default, Clone)]
pub struct ConfigOverrides {
    /// Benchmark executable path.
    pub executable: Option<PathBuf>,
    /// Step counts in sweep order.
    pub steps: Option<Vec<u64>>,
    /// Maximum thread count.
    pub max_threads: Option<u32>,
    /// Chart destination.
    pub output: Option<PathBuf>,
    /// CSV export destination.
    pub csv: Option<PathBuf>,
    /// JSON export destination.
    pub json: Option<PathBuf>,
    /// Open the chart after saving.
    pub show: Option<bool>,
}

impl FileConfig {
    /// Loads the config file.
    ///
    /// An explicit path must exist. The default location is skipped silently
    /// when nothing is there.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_path(path);
        }
        match default_config_path() {
            Some(path) if path.exists() => Self::from_path(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Reads and parses a config file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|source| SweepError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| SweepError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }
}

impl SweepConfig {
    /// Merges defaults, file values and overrides, then validates the result.
    pub fn resolve(file: FileConfig, overrides: ConfigOverrides) -> Result<Self> {
        let executable = overrides
            .executable
            .or(file.executable)
            .ok_or_else(|| {
                SweepError::InvalidConfig(
                    "no executable configured; pass --exe or set `executable` in the config file"
                        .into(),
                )
            })?;
        let config = Self {
            executable,
            steps: overrides
                .steps
                .or(file.steps)
                .unwrap_or_else(|| DEFAULT_STEPS.to_vec()),
            max_threads: overrides
                .max_threads
                .or(file.max_threads)
                .unwrap_or(DEFAULT_MAX_THREADS),
            output: overrides
                .output
                .or(file.output)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT)),
            csv: overrides.csv.or(file.csv),
            json: overrides.json.or(file.json),
            show: overrides.show.or(file.show).unwrap_or(true),
        };
        config.validate()?;
        Ok(config)
    }

    /// Rejects settings that cannot produce a sweep.
    pub fn validate(&self) -> Result<()> {
        if self.executable.as_os_str().is_empty() {
            return Err(SweepError::InvalidConfig("executable path is empty".into()));
        }
        if self.steps.is_empty() {
            return Err(SweepError::InvalidConfig(
                "at least one step count is required".into(),
            ));
        }
        if self.steps.contains(&0) {
            return Err(SweepError::InvalidConfig(
                "step counts must be positive".into(),
            ));
        }
        if self.max_threads == 0 {
            return Err(SweepError::InvalidConfig(
                "max_threads must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// `<config_dir>/thread-sweep/config.toml`, when the platform has a config dir.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|base| base.join("thread-sweep").join("config.toml"))
}
