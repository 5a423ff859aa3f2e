pub mod aggregator;
pub mod json;
pub mod junit;
pub mod types;

pub use aggregator::ReportAggregator;
pub use json::write_report;
pub use types::{ExecutionReport, ReportSummary};

use anyhow::{Context, Result};
use colored::Colorize;
use std::path::{Path, PathBuf};

/// Render a saved report. `results_path` may be a report file or a directory
/// holding `test_report_*.json` files, in which case the newest is used.
pub async fn generate_report(
    results_path: &Path,
    format: &str,
    output: Option<&Path>,
) -> Result<()> {
    let path = if results_path.is_dir() {
        latest_report(results_path)?
    } else {
        results_path.to_path_buf()
    };

    let report = json::read_report(&path)
        .with_context(|| format!("Failed to read report {}", path.display()))?;

    match format {
        "summary" => {
            print_summary(&path, &report);
            Ok(())
        }
        "json" => json::generate(&report, output),
        "junit" => junit::generate(&report, output),
        _ => anyhow::bail!("Unknown format: {}", format),
    }
}

/// Most recently modified `test_report_*.json` in `dir`
pub fn latest_report(dir: &Path) -> Result<PathBuf> {
    let pattern = dir.join("test_report_*.json");
    let pattern = pattern.to_string_lossy();

    glob::glob(&pattern)?
        .filter_map(|entry| entry.ok())
        .filter_map(|path| {
            let modified = path.metadata().and_then(|m| m.modified()).ok()?;
            Some((modified, path))
        })
        .max_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)))
        .map(|(_, path)| path)
        .with_context(|| format!("No test reports found in {}", dir.display()))
}

fn print_summary(path: &Path, report: &ExecutionReport) {
    let s = &report.summary;
    println!("{} {}", "Report:".bold(), path.display());
    println!("  Generated: {}", s.timestamp);
    println!(
        "  Total: {}  Passed: {}  Failed: {}  Skipped: {}",
        s.total,
        s.passed.to_string().green(),
        s.failed.to_string().red(),
        s.skipped.to_string().yellow()
    );
    println!("  Execution Time: {:.2} seconds", s.execution_time);

    for test in report.failed_tests() {
        println!(
            "  {} {} ({}/{} steps, {} retries): {}",
            "✗".red(),
            test.name,
            test.steps_executed,
            test.total_steps,
            test.retry_count,
            test.error.as_deref().unwrap_or("unknown error")
        );
    }

    for observation in report.observations() {
        println!("  • {}", observation);
    }
}
