//! Human-readable text output

use crate::engine::RunSummary;

/// Print run results to console
///
/// Displays the grid and run parameters, the final population, and why the
/// run stopped.
pub fn print_results(summary: &RunSummary) {
    println!("═══════════════════════════════════════════════════════════");
    println!("                  SIMULATION RESULTS");
    println!("═══════════════════════════════════════════════════════════");
    println!();

    println!("Elapsed Time: {:.3}s", summary.elapsed.as_secs_f64());
    println!();

    println!("Run:");
    println!(
        "  Grid:        {} x {} ({} cells)",
        summary.rows,
        summary.cols,
        format_number(summary.counts.total())
    );
    println!("  Workers:     {}", summary.workers);
    println!("  Seed:        {}", summary.seed);
    println!("  Iterations:  {}", format_number(summary.iterations as u64));
    println!("  Termination: {}", summary.termination);
    println!();

    let total = summary.counts.total();
    println!("Population:");
    print_population("Healthy:", summary.healthy(), total);
    print_population("Infected:", summary.infected(), total);
    print_population("Dead:", summary.dead(), total);
    print_population("Empty:", summary.counts.empty, total);
    println!();
    println!("  Survivors: {:>12}", format_number(summary.survivors()));
    println!();
    println!("═══════════════════════════════════════════════════════════");
}

fn print_population(label: &str, count: u64, total: u64) {
    println!("  {:<10} {:>12} ({})", label, format_number(count), percent(count, total));
}

/// Format number with thousands separators
fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::new();

    for (count, c) in s.chars().rev().enumerate() {
        if count > 0 && count % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }

    result.chars().rev().collect()
}

fn percent(part: u64, total: u64) -> String {
    if total == 0 {
        return "0.00%".to_string();
    }
    format!("{:.2}%", part as f64 / total as f64 * 100.0)
}
