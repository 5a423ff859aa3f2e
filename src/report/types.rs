use crate::runner::state::TestResult;
use serde::{Deserialize, Serialize};

/// Suite-level counts written at the top of every report
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReportSummary {
    /// Local time the run finished, `YYYYMMDD_HHMMSS`
    pub timestamp: String,
    /// Wall clock seconds from first test start to suite completion
    pub execution_time: f64,
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
}

/// Execution report for one run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExecutionReport {
    pub summary: ReportSummary,
    pub tests: Vec<TestResult>,
}

impl ExecutionReport {
    /// Human readable remarks about the run
    pub fn observations(&self) -> Vec<String> {
        let mut observations = Vec::new();
        if self.summary.failed > 0 {
            observations.push(format!(
                "{} tests failed out of {}",
                self.summary.failed, self.summary.total
            ));
        }
        if self.summary.passed == self.summary.total {
            observations.push("All tests passed successfully".to_string());
        }
        observations
    }

    pub fn failed_tests(&self) -> impl Iterator<Item = &TestResult> {
        self.tests.iter().filter(|t| !t.passed())
    }
}
