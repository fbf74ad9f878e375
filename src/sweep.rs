//! Sweep driver: every configured step count crossed with thread counts
//! `1..=max_threads`, one blocking trial at a time.

use serde::Serialize;
use tracing::{debug, info};

use crate::trial::{run_trial, Launcher, TrialInput, TrialOutcome};

/// Timings recorded for one step count.
///
/// `threads` and `seconds` always have the same length; failed trials leave
/// gaps instead of placeholder values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    /// Step count shared by every trial in the series.
    pub steps: u64,
    /// Thread counts that produced a timing, ascending.
    pub threads: Vec<u32>,
    /// Elapsed seconds, index-aligned with `threads`.
    pub seconds: Vec<f64>,
    /// Thread counts whose output carried no elapsed time.
    pub unparsed: Vec<u32>,
    /// Set when a launch failure cut the series short.
    pub aborted: Option<Abort>,
}

/// Where and why a series stopped early.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Abort {
    /// Thread count at which the series stopped.
    pub threads: u32,
    /// Launch error or the unreadable elapsed-time text.
    pub reason: String,
}

impl Series {
    /// Empty series for `steps`.
    pub fn new(steps: u64) -> Self {
        Self {
            steps,
            threads: Vec::new(),
            seconds: Vec::new(),
            unparsed: Vec::new(),
            aborted: None,
        }
    }

    /// Appends a successful trial.
    pub fn record(&mut self, threads: u32, seconds: f64) {
        debug_assert!(self.threads.last().map_or(true, |&last| last < threads));
        self.threads.push(threads);
        self.seconds.push(seconds);
    }

    /// `(threads, seconds)` pairs in recording order.
    pub fn points(&self) -> impl Iterator<Item = (u32, f64)> + '_ {
        self.threads.iter().copied().zip(self.seconds.iter().copied())
    }

    /// Number of recorded points.
    pub fn len(&self) -> usize {
        self.threads.len()
    }

    /// True when no trial in the series produced a timing.
    pub fn is_empty(&self) -> bool {
        self.threads.is_empty()
    }

    /// Fastest recorded point.
    pub fn fastest(&self) -> Option<(u32, f64)> {
        self.points().min_by(|a, b| a.1.total_cmp(&b.1))
    }
}

/// All series of a run, keyed by step count in first-insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ResultSet {
    series: Vec<Series>,
}

impl ResultSet {
    /// Empty result set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `series` under its step count. A repeated step count keeps its
    /// original position and takes the new value.
    pub fn insert(&mut self, series: Series) {
        match self.series.iter_mut().find(|s| s.steps == series.steps) {
            Some(slot) => *slot = series,
            None => self.series.push(series),
        }
    }

    /// Series for `steps`, if it was swept.
    pub fn get(&self, steps: u64) -> Option<&Series> {
        self.series.iter().find(|s| s.steps == steps)
    }

    /// Series in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Series> {
        self.series.iter()
    }

    /// Number of step counts held.
    pub fn len(&self) -> usize {
        self.series.len()
    }

    /// True when nothing has been inserted.
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Largest recorded time across every series.
    pub fn max_seconds(&self) -> Option<f64> {
        self.series
            .iter()
            .flat_map(|s| s.seconds.iter().copied())
            .max_by(f64::total_cmp)
    }
}

impl<'a> IntoIterator for &'a ResultSet {
    type Item = &'a Series;
    type IntoIter = std::slice::Iter<'a, Series>;

    fn into_iter(self) -> Self::IntoIter {
        self.series.iter()
    }
}

/// What to sweep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweepPlan {
    /// Step counts in sweep order.
    pub steps: Vec<u64>,
    /// Highest thread count; every series starts at 1.
    pub max_threads: u32,
}

impl SweepPlan {
    /// Total trials if nothing aborts.
    pub fn trial_count(&self) -> u64 {
        self.steps.len() as u64 * u64::from(self.max_threads)
    }
}

/// Progress hooks for a running sweep. Every method defaults to a no-op.
pub trait SweepObserver {
    /// A new step count is starting.
    fn series_started(&mut self, _steps: u64, _max_threads: u32) {}
    /// A trial is about to launch.
    fn trial_started(&mut self, _input: TrialInput) {}
    /// Periodic heartbeat, see [`is_heartbeat`].
    fn heartbeat(&mut self, _input: TrialInput, _seconds: f64) {}
    /// The child ran but printed no usable time.
    fn unparsed(&mut self, _input: TrialInput, _stdout: &str) {}
    /// The series stopped at this trial; the rest of this step count is skipped.
    fn series_aborted(&mut self, _input: TrialInput, _reason: &str) {}
    /// A step count is finished.
    fn series_finished(&mut self, _series: &Series) {}
}

/// Observer that ignores everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct Silent;

impl SweepObserver for Silent {}

/// Heartbeats fire on the first thread count and every fifth one.
pub fn is_heartbeat(threads: u32) -> bool {
    threads == 1 || threads % 5 == 0
}

/// Runs the whole sweep sequentially.
///
/// Output without an elapsed-time label skips only that thread count. A launch
/// failure or a labelled but unreadable number ends the current step count;
/// later step counts still run.
pub fn run_sweep<L, O>(plan: &SweepPlan, launcher: &L, observer: &mut O) -> ResultSet
where
    L: Launcher + ?Sized,
    O: SweepObserver + ?Sized,
{
    let mut results = ResultSet::new();
    for &steps in &plan.steps {
        info!(steps, max_threads = plan.max_threads, "starting series");
        observer.series_started(steps, plan.max_threads);
        let series = sweep_series(steps, plan.max_threads, launcher, observer);
        info!(
            steps,
            points = series.len(),
            unparsed = series.unparsed.len(),
            aborted = series.aborted.is_some(),
            "series finished"
        );
        observer.series_finished(&series);
        results.insert(series);
    }
    results
}

fn sweep_series<L, O>(steps: u64, max_threads: u32, launcher: &L, observer: &mut O) -> Series
where
    L: Launcher + ?Sized,
    O: SweepObserver + ?Sized,
{
    let mut series = Series::new(steps);
    for threads in 1..=max_threads {
        let input = TrialInput { steps, threads };
        observer.trial_started(input);
        match run_trial(launcher, input) {
            TrialOutcome::Timed(seconds) => {
                series.record(threads, seconds);
                if is_heartbeat(threads) {
                    observer.heartbeat(input, seconds);
                }
            }
            TrialOutcome::Unparsed { stdout } => {
                observer.unparsed(input, &stdout);
                series.unparsed.push(threads);
            }
            TrialOutcome::Malformed { value } => {
                let reason = format!("unparsable elapsed time `{value}`");
                abort(&mut series, input, reason, observer);
                break;
            }
            TrialOutcome::LaunchFailed(err) => {
                abort(&mut series, input, err.to_string(), observer);
                break;
            }
        }
    }
    series
}

fn abort<O>(series: &mut Series, input: TrialInput, reason: String, observer: &mut O)
where
    O: SweepObserver + ?Sized,
{
    debug!(
        steps = input.steps,
        threads = input.threads,
        %reason,
        "abandoning remaining thread counts"
    );
    observer.series_aborted(input, &reason);
    series.aborted = Some(Abort {
        threads: input.threads,
        reason,
    });
}
