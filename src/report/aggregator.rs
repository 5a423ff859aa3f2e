use std::time::Instant;

use super::types::{ExecutionReport, ReportSummary};
use crate::runner::state::TestResult;

/// Timestamp format used in the report summary and file name
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Accumulates test results in execution order
#[derive(Debug, Default)]
pub struct ReportAggregator {
    started: Option<Instant>,
    results: Vec<TestResult>,
    skipped: usize,
}

impl ReportAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start the wall clock. Called before the first test runs.
    pub fn start(&mut self) {
        self.started = Some(Instant::now());
    }

    pub fn record(&mut self, result: TestResult) {
        self.results.push(result);
    }

    pub fn mark_skipped(&mut self) {
        self.skipped += 1;
    }

    pub fn finish(self) -> ExecutionReport {
        let execution_time = self
            .started
            .map(|s| s.elapsed().as_secs_f64())
            .unwrap_or_default();
        let passed = self.results.iter().filter(|r| r.passed()).count();

        ExecutionReport {
            summary: ReportSummary {
                timestamp: chrono::Local::now().format(TIMESTAMP_FORMAT).to_string(),
                execution_time,
                total: self.results.len() + self.skipped,
                passed,
                failed: self.results.len() - passed,
                skipped: self.skipped,
            },
            tests: self.results,
        }
    }
}
