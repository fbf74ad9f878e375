//! CSV and JSON dumps of a finished sweep, written next to the chart.

use std::fs;
use std::path::Path;

use csv::Writer;
use serde::Serialize;

use crate::env::EnvMetadata;
use crate::error::Result;
use crate::sweep::{ResultSet, Series};

/// Document written by [`write_json`].
#[derive(Debug, Serialize)]
pub struct RunReport<'a> {
    /// Host the sweep ran on.
    pub environment: &'a EnvMetadata,
    /// Benchmark executable.
    pub executable: &'a Path,
    /// Highest thread count requested.
    pub max_threads: u32,
    /// Every series in sweep order.
    pub series: &'a ResultSet,
}

/// Writes one `steps,threads,seconds` row per recorded point.
pub fn write_csv(path: &Path, results: &ResultSet) -> Result<()> {
    let mut writer = Writer::from_path(path)?;
    writer.write_record(["steps", "threads", "seconds"])?;
    for series in results {
        write_series_rows(&mut writer, series)?;
    }
    writer.flush()?;
    Ok(())
}

fn write_series_rows<W: std::io::Write>(writer: &mut Writer<W>, series: &Series) -> Result<()> {
    let steps = series.steps.to_string();
    for (threads, seconds) in series.points() {
        writer.write_record([
            steps.as_str(),
            threads.to_string().as_str(),
            format!("{seconds}").as_str(),
        ])?;
    }
    Ok(())
}

/// Writes the pretty-printed run report.
pub fn write_json(path: &Path, report: &RunReport<'_>) -> Result<()> {
    fs::write(path, serde_json::to_vec_pretty(report)?)?;
    Ok(())
}
