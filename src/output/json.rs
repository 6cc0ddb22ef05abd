//! JSON output formatting
//!
//! One report per run: run parameters, the final census, termination reason
//! and timing. Durations carry both a machine value and a human string.

use crate::engine::{RunSummary, Termination};
use crate::grid::PopulationCounts;
use crate::Result;
use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use std::time::Duration;

/// Duration with both microseconds and human-readable format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonDuration {
    pub micros: u64,
    pub human: String,
}

impl JsonDuration {
    pub fn from_duration(d: Duration) -> Self {
        let micros = d.as_micros() as u64;
        let human = format_duration_human(d);
        Self { micros, human }
    }
}

/// Grid and engine parameters of a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRun {
    pub rows: usize,
    pub cols: usize,
    pub workers: usize,
    pub seed: u64,
}

/// Complete JSON report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonReport {
    pub timestamp: DateTime<Utc>,
    pub run: JsonRun,
    pub iterations: usize,
    pub termination: Termination,
    pub population: PopulationCounts,
    pub total_dead: u64,
    pub total_survivors: u64,
    pub elapsed: JsonDuration,
    pub elapsed_secs: f64,
}

impl JsonReport {
    /// Build a report for `summary`, stamped with the current time
    pub fn from_summary(summary: &RunSummary) -> Self {
        Self {
            timestamp: Utc::now(),
            run: JsonRun {
                rows: summary.rows,
                cols: summary.cols,
                workers: summary.workers,
                seed: summary.seed,
            },
            iterations: summary.iterations,
            termination: summary.termination,
            population: summary.counts,
            total_dead: summary.dead(),
            total_survivors: summary.survivors(),
            elapsed: JsonDuration::from_duration(summary.elapsed),
            elapsed_secs: summary.elapsed.as_secs_f64(),
        }
    }
}

/// Write a JSON report for `summary` to `path`
pub fn write_json_report(summary: &RunSummary, path: &Path, pretty: bool) -> Result<()> {
    let report = JsonReport::from_summary(summary);
    let file = File::create(path)
        .with_context(|| format!("Failed to create JSON output: {}", path.display()))?;
    let writer = BufWriter::new(file);

    if pretty {
        serde_json::to_writer_pretty(writer, &report)?;
    } else {
        serde_json::to_writer(writer, &report)?;
    }

    Ok(())
}

/// Format duration in human-readable format
fn format_duration_human(d: Duration) -> String {
    let micros = d.as_micros() as u64;

    if micros == 0 {
        return "0µs".to_string();
    }

    if micros < 1000 {
        format!("{}µs", micros)
    } else if micros < 1_000_000 {
        format!("{:.3}ms", micros as f64 / 1000.0)
    } else if micros < 60_000_000 {
        format!("{:.3}s", micros as f64 / 1_000_000.0)
    } else if micros < 3_600_000_000 {
        format!("{:.2}m", micros as f64 / 60_000_000.0)
    } else {
        format!("{:.2}h", micros as f64 / 3_600_000_000.0)
    }
}
