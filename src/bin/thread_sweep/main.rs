//! Binary entry point for the thread-scaling sweep.
#![forbid(unsafe_code)]

mod ui;

use std::error::Error;
use std::path::PathBuf;

use clap::Parser;
use thread_sweep::{
    chart,
    config::{ConfigOverrides, FileConfig, SweepConfig},
    logging::init_logging,
    runner::{self, RunOutcome},
    sweep::{Series, SweepObserver},
    trial::TrialInput,
};

use ui::{elapsed_label, Console, SeriesProgress};

#[derive(Parser, Debug)]
#[command(
    name = "thread-sweep",
    version,
    about = "Times an integration executable across step and thread counts and charts the results"
)]
struct Cli {
    #[arg(
        long = "exe",
        value_name = "PATH",
        env = "THREAD_SWEEP_EXE",
        help = "Benchmark executable to launch for every trial"
    )]
    executable: Option<PathBuf>,

    #[arg(
        long,
        value_name = "N,N,...",
        value_delimiter = ',',
        help = "Step counts to sweep, in order"
    )]
    steps: Option<Vec<u64>>,

    #[arg(long, value_name = "N", help = "Highest thread count to try")]
    max_threads: Option<u32>,

    #[arg(long, value_name = "FILE", help = "Chart output path (SVG)")]
    output: Option<PathBuf>,

    #[arg(long, value_name = "FILE", help = "Also write recorded points as CSV")]
    csv: Option<PathBuf>,

    #[arg(long, value_name = "FILE", help = "Also write the full run report as JSON")]
    json: Option<PathBuf>,

    #[arg(long, help = "Do not open the chart after saving it")]
    no_show: bool,

    #[arg(
        long,
        value_name = "FILE",
        env = "THREAD_SWEEP_CONFIG",
        help = "Config file (defaults to <config dir>/thread-sweep/config.toml)"
    )]
    config: Option<PathBuf>,

    #[arg(
        long,
        value_name = "FILTER",
        help = "Log filter, e.g. `debug` or `thread_sweep=trace` (RUST_LOG otherwise)"
    )]
    log_level: Option<String>,

    #[arg(long, help = "Disable colored console output")]
    plain: bool,

    #[arg(long, help = "No progress bars; bare warning lines")]
    quiet: bool,
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            executable: self.executable.clone(),
            steps: self.steps.clone(),
            max_threads: self.max_threads,
            output: self.output.clone(),
            csv: self.csv.clone(),
            json: self.json.clone(),
            show: self.no_show.then_some(false),
        }
    }
}

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_logging(cli.log_level.as_deref())?;

    let file = FileConfig::load(cli.config.as_deref())?;
    let config = SweepConfig::resolve(file, cli.overrides())?;

    let console = Console::new(cli.plain, cli.quiet);
    console.block(
        "Sweep",
        &[
            ("executable", config.executable.display().to_string()),
            ("steps", join(&config.steps)),
            ("threads", format!("1..={}", config.max_threads)),
            ("chart", config.output.display().to_string()),
        ],
    );

    let mut observer = ConsoleObserver::new(&console);
    let outcome = runner::execute(&config, &mut observer)?;

    report(&console, &outcome);
    if let Some(path) = &config.csv {
        console.line(&format!("CSV written to {}", path.display()));
    }
    if let Some(path) = &config.json {
        console.line(&format!("JSON report written to {}", path.display()));
    }
    console.line(&format!("Chart saved as {}", outcome.chart.display()));

    if config.show {
        if let Err(err) = chart::show(&outcome.chart) {
            console.warn(&format!("could not open chart viewer: {err}"));
        }
    }
    Ok(())
}

fn report(console: &Console, outcome: &RunOutcome) {
    let env = &outcome.environment;
    console.blank();
    console.block(
        "Host",
        &[
            ("cpu", env.cpu_brand.clone().unwrap_or_else(|| "unknown".into())),
            ("logical cores", env.cpu_logical_cores.to_string()),
            (
                "physical cores",
                env.cpu_physical_cores
                    .map_or_else(|| "unknown".into(), |n| n.to_string()),
            ),
        ],
    );
    console.blank();
    let fastest: Vec<(String, String)> = outcome
        .results
        .iter()
        .map(|series| {
            let best = match series.fastest() {
                Some((threads, seconds)) => format!("{seconds:.4} s with {threads} threads"),
                None => "no timings".to_string(),
            };
            (format!("{} steps", series.steps), best)
        })
        .collect();
    let rows: Vec<(&str, &str)> = fastest
        .iter()
        .map(|(key, value)| (key.as_str(), value.as_str()))
        .collect();
    console.block("Fastest", &rows);
}

fn join(values: &[u64]) -> String {
    values
        .iter()
        .map(u64::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Prints the per-series progress the sweep reports.
struct ConsoleObserver<'a> {
    console: &'a Console,
    progress: Option<SeriesProgress>,
    max_threads: u32,
}

impl<'a> ConsoleObserver<'a> {
    fn new(console: &'a Console) -> Self {
        Self {
            console,
            progress: None,
            max_threads: 0,
        }
    }

    fn emit<F: FnOnce(&Console)>(&self, f: F) {
        match &self.progress {
            Some(progress) => progress.suspend(|| f(self.console)),
            None => f(self.console),
        }
    }
}

impl SweepObserver for ConsoleObserver<'_> {
    fn series_started(&mut self, steps: u64, max_threads: u32) {
        self.max_threads = max_threads;
        self.console.blank();
        self.console.line(&format!("Series for {steps} steps"));
        self.progress = Some(self.console.series(steps, max_threads));
    }

    fn trial_started(&mut self, input: TrialInput) {
        if let Some(progress) = &self.progress {
            progress.at(input.threads);
        }
    }

    fn heartbeat(&mut self, input: TrialInput, seconds: f64) {
        self.emit(|console| console.heartbeat(input.threads, seconds));
    }

    fn unparsed(&mut self, input: TrialInput, stdout: &str) {
        self.emit(|console| {
            console.warn(&format!(
                "no elapsed time for {} threads; program printed: {}",
                input.threads,
                stdout.trim_end()
            ))
        });
    }

    fn series_aborted(&mut self, input: TrialInput, reason: &str) {
        self.emit(|console| {
            console.warn(&format!(
                "stopping at {} threads: {reason}; skipping the rest of this series",
                input.threads
            ))
        });
    }

    fn series_finished(&mut self, series: &Series) {
        let elapsed = self
            .progress
            .take()
            .map(SeriesProgress::finish)
            .map(elapsed_label)
            .unwrap_or_default();
        self.console.line(&format!(
            "{} steps: {} of {} thread counts timed in {elapsed}",
            series.steps,
            series.len(),
            self.max_threads
        ));
    }
}
