//! `tracing` subscriber setup; diagnostics go to stderr.

use tracing_subscriber::{fmt, EnvFilter};

use crate::error::{Result, SweepError};

/// Installs the global `tracing` subscriber on stderr.
///
/// `level` takes `EnvFilter` syntax (`warn`, `thread_sweep=debug`, ...). When
/// it is `None`, `RUST_LOG` is consulted and `warn` is the fallback.
pub fn init_logging(level: Option<&str>) -> Result<()> {
    let filter = match level {
        Some(level) => EnvFilter::try_new(level)
            .map_err(|e| SweepError::Logging(format!("invalid log level: {e}")))?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };
    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|_| SweepError::Logging("logging already initialized".into()))
}
