//! Operator console: a progress bar per series, heartbeat lines, warnings and
//! the closing report.

use std::fmt::Display;
use std::io::IsTerminal;
use std::time::{Duration, Instant};

use indicatif::{ProgressBar, ProgressStyle};
use nu_ansi_term::Color;

pub struct Console {
    color: bool,
    quiet: bool,
}

impl Console {
    /// `plain` turns colors off; `quiet` also drops progress bars and blank lines.
    pub fn new(plain: bool, quiet: bool) -> Self {
        let color = !plain && !quiet && std::io::stdout().is_terminal();

        #[cfg(windows)]
        if color {
            let _ = nu_ansi_term::enable_ansi_support();
        }

        Self { color, quiet }
    }

    fn tint(&self, color: Color, text: &str) -> String {
        if self.color {
            color.bold().paint(text).to_string()
        } else {
            text.to_string()
        }
    }

    pub fn blank(&self) {
        if !self.quiet {
            println!();
        }
    }

    /// Title followed by aligned `key  value` rows.
    pub fn block<V: Display>(&self, title: &str, rows: &[(&str, V)]) {
        println!("{}", self.tint(Color::Purple, title));
        let width = rows.iter().map(|(key, _)| key.len()).max().unwrap_or(0);
        for (key, value) in rows {
            println!("  {key:<width$}  {value}");
        }
    }

    pub fn line(&self, message: &str) {
        println!("{message}");
    }

    pub fn heartbeat(&self, threads: u32, seconds: f64) {
        println!("  threads: {threads} -> time: {seconds:.4} s");
    }

    /// Warnings go to stderr so stdout stays a clean log of timings.
    pub fn warn(&self, message: &str) {
        if self.quiet {
            eprintln!("{message}");
        } else {
            eprintln!("{} {message}", self.tint(Color::Yellow, "warning:"));
        }
    }

    pub fn series(&self, steps: u64, max_threads: u32) -> SeriesProgress {
        let bar = (!self.quiet).then(|| {
            let style = ProgressStyle::with_template("{prefix} [{bar:30}] {pos}/{len} threads")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=> ");
            ProgressBar::new(u64::from(max_threads))
                .with_style(style)
                .with_prefix(format!("{steps} steps"))
        });
        SeriesProgress {
            bar,
            started: Instant::now(),
        }
    }
}

/// Progress of one step count; the bar position counts finished trials.
pub struct SeriesProgress {
    bar: Option<ProgressBar>,
    started: Instant,
}

impl SeriesProgress {
    /// Called as the trial at `threads` starts.
    pub fn at(&self, threads: u32) {
        if let Some(bar) = &self.bar {
            bar.set_position(u64::from(threads.saturating_sub(1)));
        }
    }

    /// Runs `f` with the bar hidden so printed lines do not interleave with it.
    pub fn suspend<F: FnOnce()>(&self, f: F) {
        match &self.bar {
            Some(bar) => bar.suspend(f),
            None => f(),
        }
    }

    pub fn finish(self) -> Duration {
        if let Some(bar) = &self.bar {
            bar.finish_and_clear();
        }
        self.started.elapsed()
    }
}

/// Wall-clock label for a finished series: `42.0s` or `3m 07.5s`.
pub fn elapsed_label(elapsed: Duration) -> String {
    let secs = elapsed.as_secs_f64();
    if secs < 60.0 {
        format!("{secs:.1}s")
    } else {
        let minutes = (secs / 60.0).floor();
        format!("{minutes:.0}m {:04.1}s", secs - minutes * 60.0)
    }
}
