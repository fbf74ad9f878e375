//! End-to-end run: availability check, sweep, chart and exports.

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::chart;
use crate::config::SweepConfig;
use crate::env::EnvMetadata;
use crate::error::{Result, SweepError};
use crate::export::{self, RunReport};
use crate::sweep::{run_sweep, ResultSet, SweepObserver, SweepPlan};
use crate::trial::{Launcher, ProcessLauncher};

/// Fails with [`SweepError::ExecutableNotFound`] unless `path` is an existing file.
pub fn ensure_executable(path: &Path) -> Result<()> {
    if path.is_file() {
        Ok(())
    } else {
        Err(SweepError::ExecutableNotFound {
            path: path.to_path_buf(),
        })
    }
}

/// Artifacts of a completed run.
#[derive(Debug)]
pub struct RunOutcome {
    /// Host description captured before the sweep.
    pub environment: EnvMetadata,
    /// Collected timings.
    pub results: ResultSet,
    /// Chart file that was written.
    pub chart: PathBuf,
}

/// Runs the configured sweep against the real executable.
pub fn execute<O>(config: &SweepConfig, observer: &mut O) -> Result<RunOutcome>
where
    O: SweepObserver + ?Sized,
{
    ensure_executable(&config.executable)?;
    let launcher = ProcessLauncher::new(&config.executable);
    execute_with(config, &launcher, observer)
}

/// Like [`execute`] but with a caller-supplied launcher. The availability
/// check is skipped.
pub fn execute_with<L, O>(
    config: &SweepConfig,
    launcher: &L,
    observer: &mut O,
) -> Result<RunOutcome>
where
    L: Launcher + ?Sized,
    O: SweepObserver + ?Sized,
{
    let environment = EnvMetadata::collect();
    if environment.oversubscribed(config.max_threads) {
        warn!(
            max_threads = config.max_threads,
            logical_cores = environment.cpu_logical_cores,
            "thread counts above the logical core count measure oversubscription"
        );
    }

    let plan = SweepPlan {
        steps: config.steps.clone(),
        max_threads: config.max_threads,
    };
    info!(
        executable = %config.executable.display(),
        trials = plan.trial_count(),
        "starting sweep"
    );
    let results = run_sweep(&plan, launcher, observer);

    chart::render(&results, config.max_threads, &config.output)?;
    if let Some(path) = &config.csv {
        export::write_csv(path, &results)?;
    }
    if let Some(path) = &config.json {
        let report = RunReport {
            environment: &environment,
            executable: &config.executable,
            max_threads: config.max_threads,
            series: &results,
        };
        export::write_json(path, &report)?;
    }

    Ok(RunOutcome {
        environment,
        results,
        chart: config.output.clone(),
    })
}
