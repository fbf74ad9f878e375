//! Thread-scaling benchmark harness.
//!
//! Runs an external integration executable once per (step count, thread count)
//! pair, scrapes the elapsed time from its stdout and charts the timings.

#![warn(missing_docs)]

pub mod chart;
pub mod config;
pub mod env;
pub mod error;
pub mod export;
pub mod logging;
pub mod runner;
pub mod sweep;
pub mod trial;

pub use config::SweepConfig;
pub use error::{Result, SweepError};
pub use sweep::{ResultSet, Series};
