//! Plain-text run summary
//!
//! Format:
//!
//! ```text
//! Total dead: <dead + dead_prior>
//! Total survivors: <healthy + infected>
//! Execution time: <seconds, 6 decimals> seconds
//! Iterations: <n>
//! Termination: <reason>
//! ```

use crate::engine::RunSummary;
use crate::Result;
use anyhow::Context;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Write the summary lines for `summary`
pub fn write_summary<W: Write>(summary: &RunSummary, mut out: W) -> Result<()> {
    writeln!(out, "Total dead: {}", summary.dead())?;
    writeln!(out, "Total survivors: {}", summary.survivors())?;
    writeln!(out, "Execution time: {:.6} seconds", summary.elapsed.as_secs_f64())?;
    writeln!(out, "Iterations: {}", summary.iterations)?;
    writeln!(out, "Termination: {}", summary.termination)?;
    out.flush()?;
    Ok(())
}

/// Write the summary to a file, creating parent directories as needed
pub fn save_summary(summary: &RunSummary, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    let file = File::create(path)
        .with_context(|| format!("Failed to create summary file: {}", path.display()))?;
    write_summary(summary, BufWriter::new(file))
        .with_context(|| format!("Failed to write summary file: {}", path.display()))
}
