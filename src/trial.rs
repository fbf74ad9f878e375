//! One benchmark invocation: launch the executable, feed it the step and
//! thread counts, and pull the elapsed time out of its stdout.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;
use tracing::debug;

/// Label the integrator prints in front of its elapsed time, in seconds.
pub const ELAPSED_LABEL: &str = "Czas obliczen:";

/// Parameters of a single trial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TrialInput {
    /// Integration step count.
    pub steps: u64,
    /// Requested worker thread count.
    pub threads: u32,
}

impl TrialInput {
    /// Text written to the child's stdin, one answer per prompt.
    pub fn stdin_payload(&self) -> String {
        format!("{}\n{}\n", self.steps, self.threads)
    }
}

/// Everything a finished child produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LaunchOutput {
    /// Captured stdout, lossily decoded.
    pub stdout: String,
    /// Captured stderr, lossily decoded.
    pub stderr: String,
    /// Exit code, `None` when the child was killed by a signal.
    pub exit_code: Option<i32>,
}

/// Runs the benchmark for one input and returns its captured output.
///
/// An `Err` means the process could not be created or talked to; the sweep
/// treats that as fatal for the rest of the current step count.
pub trait Launcher {
    /// Executes one trial to completion.
    fn launch(&self, input: TrialInput) -> io::Result<LaunchOutput>;
}

/// [`Launcher`] backed by an OS child process.
#[derive(Debug, Clone)]
pub struct ProcessLauncher {
    executable: PathBuf,
}

impl ProcessLauncher {
    /// Launches `executable` with no arguments for every trial.
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
        }
    }

    /// Path this launcher spawns.
    pub fn executable(&self) -> &Path {
        &self.executable
    }
}

impl Launcher for ProcessLauncher {
    fn launch(&self, input: TrialInput) -> io::Result<LaunchOutput> {
        let mut child = Command::new(&self.executable)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        if let Some(mut stdin) = child.stdin.take() {
            match stdin.write_all(input.stdin_payload().as_bytes()) {
                Ok(()) => {}
                // Child stopped reading early; its output is still worth parsing.
                Err(err) if err.kind() == io::ErrorKind::BrokenPipe => {
                    debug!(
                        steps = input.steps,
                        threads = input.threads,
                        "child closed stdin early"
                    );
                }
                Err(err) => {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(err);
                }
            }
        }

        // stdin is dropped above, so the child sees EOF; both pipes are drained
        // and the child is reaped before returning.
        let output = child.wait_with_output()?;
        Ok(LaunchOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            exit_code: output.status.code(),
        })
    }
}

/// Result of one trial.
#[derive(Debug)]
pub enum TrialOutcome {
    /// Elapsed seconds reported by the child.
    Timed(f64),
    /// The child ran but its stdout carried no elapsed-time label.
    Unparsed {
        /// Raw stdout, kept for diagnostics.
        stdout: String,
    },
    /// The label was there but the digits after it are not a number.
    Malformed {
        /// Text captured after the label.
        value: String,
    },
    /// The child could not be launched or communicated with.
    LaunchFailed(io::Error),
}

/// Runs one trial and classifies what came back.
pub fn run_trial<L: Launcher + ?Sized>(launcher: &L, input: TrialInput) -> TrialOutcome {
    let output = match launcher.launch(input) {
        Ok(output) => output,
        Err(err) => {
            debug!(
                steps = input.steps,
                threads = input.threads,
                error = %err,
                "failed to launch benchmark"
            );
            return TrialOutcome::LaunchFailed(err);
        }
    };

    if output.exit_code != Some(0) {
        debug!(
            steps = input.steps,
            threads = input.threads,
            exit_code = ?output.exit_code,
            "benchmark exited unsuccessfully"
        );
    }
    if !output.stderr.is_empty() {
        debug!(steps = input.steps, threads = input.threads, stderr = %output.stderr.trim_end());
    }

    match parse_elapsed(&output.stdout) {
        Elapsed::Seconds(seconds) => {
            debug!(steps = input.steps, threads = input.threads, seconds, "trial timed");
            TrialOutcome::Timed(seconds)
        }
        Elapsed::Missing => {
            debug!(
                steps = input.steps,
                threads = input.threads,
                stdout = %output.stdout,
                "benchmark output has no elapsed time"
            );
            TrialOutcome::Unparsed {
                stdout: output.stdout,
            }
        }
        Elapsed::Malformed(value) => {
            debug!(
                steps = input.steps,
                threads = input.threads,
                value = %value,
                "elapsed time is not a number"
            );
            TrialOutcome::Malformed { value }
        }
    }
}

fn elapsed_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        let pattern = format!(r"{}\s*([0-9.]+)", regex::escape(ELAPSED_LABEL));
        Regex::new(&pattern).expect("elapsed-time pattern compiles")
    })
}

/// What the first `Czas obliczen:` label in a child's stdout yielded.
#[derive(Debug, Clone, PartialEq)]
pub enum Elapsed {
    /// Elapsed seconds.
    Seconds(f64),
    /// No label followed by digits.
    Missing,
    /// Digits and dots that do not form a number (`1.2.3`, a lone `.`).
    Malformed(String),
}

/// Extracts the elapsed time from the first `Czas obliczen:` label in `stdout`.
pub fn parse_elapsed(stdout: &str) -> Elapsed {
    let Some(digits) = elapsed_pattern().captures(stdout).and_then(|c| c.get(1)) else {
        return Elapsed::Missing;
    };
    match digits.as_str().parse::<f64>() {
        Ok(seconds) => Elapsed::Seconds(seconds),
        Err(_) => Elapsed::Malformed(digits.as_str().to_string()),
    }
}
