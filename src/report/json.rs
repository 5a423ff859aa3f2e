use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use super::types::ExecutionReport;
use crate::error::EngineResult;

/// Write `test_report_<timestamp>.json` into `output_dir`, appending `_1`,
/// `_2`, ... when a report with the same timestamp already exists.
pub fn write_report(report: &ExecutionReport, output_dir: &Path) -> EngineResult<PathBuf> {
    std::fs::create_dir_all(output_dir)?;
    let json = serde_json::to_string_pretty(report)?;

    let stem = format!("test_report_{}", report.summary.timestamp);
    let mut suffix = 0u32;
    loop {
        let name = if suffix == 0 {
            format!("{}.json", stem)
        } else {
            format!("{}_{}.json", stem, suffix)
        };
        let path = output_dir.join(name);

        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(mut file) => {
                file.write_all(json.as_bytes())?;
                log::info!("Report written to {}", path.display());
                return Ok(path);
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => suffix += 1,
            Err(e) => return Err(e.into()),
        }
    }
}

/// Load a report previously written by [`write_report`]
pub fn read_report(path: &Path) -> EngineResult<ExecutionReport> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Print a report as pretty JSON, or save it to `output`
pub fn generate(report: &ExecutionReport, output: Option<&Path>) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(report)?;

    if let Some(path) = output {
        std::fs::write(path, json)?;
        println!("JSON report saved to: {}", path.display());
    } else {
        println!("{}", json);
    }

    Ok(())
}
