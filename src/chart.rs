//! SVG line chart of time versus thread count, one line per step count.

use std::path::Path;
use std::process::{Command, Stdio};

use plotters::prelude::*;
use tracing::debug;

use crate::error::{Result, SweepError};
use crate::sweep::ResultSet;

/// Chart title.
pub const TITLE: &str = "Czas obliczen PI w zaleznosci od liczby watkow";
/// X axis description.
pub const X_LABEL: &str = "Liczba watkow";
/// Y axis description.
pub const Y_LABEL: &str = "Czas (sekundy)";

const SIZE: (u32, u32) = (1000, 600);
const MARKER_RADIUS: i32 = 4;

/// Legend text for one series.
pub fn series_label(steps: u64) -> String {
    format!("Kroki: {steps}")
}

/// Draws every series of `results` into an SVG file at `path`.
///
/// Series without points still get a legend entry.
pub fn render(results: &ResultSet, max_threads: u32, path: &Path) -> Result<()> {
    draw(results, max_threads, path).map_err(|message| SweepError::Render {
        path: path.to_path_buf(),
        message,
    })
}

fn draw(
    results: &ResultSet,
    max_threads: u32,
    path: &Path,
) -> std::result::Result<(), String> {
    let root = SVGBackend::new(path, SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(|e| e.to_string())?;

    let y_max = results
        .max_seconds()
        .filter(|max| *max > 0.0)
        .map_or(1.0, |max| max * 1.1);
    let mut chart = ChartBuilder::on(&root)
        .caption(TITLE, ("sans-serif", 24))
        .margin(16)
        .x_label_area_size(48)
        .y_label_area_size(64)
        .build_cartesian_2d(0u32..max_threads.saturating_add(1), 0f64..y_max)
        .map_err(|e| e.to_string())?;

    chart
        .configure_mesh()
        .x_desc(X_LABEL)
        .y_desc(Y_LABEL)
        .draw()
        .map_err(|e| e.to_string())?;

    for (idx, series) in results.iter().enumerate() {
        let color = Palette99::pick(idx).to_rgba();
        let points: Vec<(u32, f64)> = series.points().collect();
        chart
            .draw_series(LineSeries::new(points.clone(), color.stroke_width(2)))
            .map_err(|e| e.to_string())?
            .label(series_label(series.steps))
            .legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2))
            });
        chart
            .draw_series(
                points
                    .into_iter()
                    .map(|point| Circle::new(point, MARKER_RADIUS, color.filled())),
            )
            .map_err(|e| e.to_string())?;
    }

    if !results.is_empty() {
        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()
            .map_err(|e| e.to_string())?;
    }
    root.present().map_err(|e| e.to_string())?;
    debug!(path = %path.display(), series = results.len(), "chart written");
    Ok(())
}

/// Hands the chart to the platform's default viewer without waiting for it.
pub fn show(path: &Path) -> std::io::Result<()> {
    viewer_command(path)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map(|_| ())
}

#[cfg(target_os = "macos")]
fn viewer_command(path: &Path) -> Command {
    let mut cmd = Command::new("open");
    cmd.arg(path);
    cmd
}

#[cfg(windows)]
fn viewer_command(path: &Path) -> Command {
    let mut cmd = Command::new("cmd");
    cmd.args(["/C", "start", ""]).arg(path);
    cmd
}

#[cfg(not(any(target_os = "macos", windows)))]
fn viewer_command(path: &Path) -> Command {
    let mut cmd = Command::new("xdg-open");
    cmd.arg(path);
    cmd
}
