use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::selector::SelectorTrace;
use crate::error::EngineError;

/// Terminal state of a test case
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TestStatus {
    Passed,
    Failed,
}

/// Final outcome of one test case across all of its attempts
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TestResult {
    pub name: String,
    pub status: TestStatus,
    /// Steps completed in the most recent attempt
    pub steps_executed: usize,
    pub total_steps: usize,
    pub error: Option<String>,
    /// Attempts used beyond the first
    pub retry_count: u32,
}

impl TestResult {
    pub fn passed(&self) -> bool {
        self.status == TestStatus::Passed
    }
}

/// How a single step ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    Passed,
    /// Recognized as a no-op (unknown action, unsupported `expect` target)
    NoOp,
    Failed,
}

/// Result of interpreting one step
#[derive(Debug)]
pub struct StepResult {
    pub index: usize,
    pub status: StepStatus,
    /// Selector that satisfied the action, if the action used one
    pub selector: Option<String>,
    pub trace: SelectorTrace,
    pub error: Option<EngineError>,
    /// Diagnostic artifacts written while executing the step
    pub artifacts: Vec<PathBuf>,
    pub duration_ms: u64,
}

impl StepResult {
    pub fn new(index: usize) -> Self {
        Self {
            index,
            status: StepStatus::Passed,
            selector: None,
            trace: SelectorTrace::default(),
            error: None,
            artifacts: Vec::new(),
            duration_ms: 0,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status != StepStatus::Failed
    }

    pub fn fail(&mut self, error: EngineError) {
        self.status = StepStatus::Failed;
        self.error = Some(error);
    }

    pub fn noop(&mut self) {
        self.status = StepStatus::NoOp;
    }
}
