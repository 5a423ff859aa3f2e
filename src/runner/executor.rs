use std::time::Instant;

use super::context::TestContext;
use super::events::{EventEmitter, TestEvent};
use super::interpreter::StepInterpreter;
use super::state::{StepStatus, TestResult, TestStatus};
use crate::driver::traits::{BrowserPage, BrowserRuntime};
use crate::error::{EngineError, EngineResult};
use crate::parser::types::TestCase;
use crate::utils::config::EngineConfig;

/// Runs test cases one at a time, each attempt on a fresh page
pub struct TestExecutor<'a> {
    runtime: &'a dyn BrowserRuntime,
    config: &'a EngineConfig,
    context: TestContext,
    emitter: &'a EventEmitter,
}

impl<'a> TestExecutor<'a> {
    pub fn new(
        runtime: &'a dyn BrowserRuntime,
        config: &'a EngineConfig,
        emitter: &'a EventEmitter,
    ) -> Self {
        Self {
            runtime,
            config,
            context: TestContext::new(&config.output_dir),
            emitter,
        }
    }

    /// Run a test with up to `retries` extra attempts.
    ///
    /// Step failures never surface as `Err`; they end up in the returned
    /// `TestResult`. Only fatal runtime errors are returned.
    pub async fn run_test(&self, test: &TestCase) -> EngineResult<TestResult> {
        let started = Instant::now();
        let retries = self.config.retries;
        log::info!(
            "Running '{}' with up to {} attempt(s)",
            test.name,
            self.config.max_attempts()
        );

        self.emitter.emit(TestEvent::TestStarted {
            name: test.name.clone(),
            step_count: test.steps.len(),
        });

        let mut result = TestResult {
            name: test.name.clone(),
            status: TestStatus::Failed,
            steps_executed: 0,
            total_steps: test.steps.len(),
            error: None,
            retry_count: 0,
        };

        for attempt in 0..=retries {
            if attempt > 0 {
                result.retry_count = attempt;
                self.emitter.emit(TestEvent::TestRetrying {
                    name: test.name.clone(),
                    attempt,
                    retries,
                });
            }

            let page = self.runtime.new_page().await.map_err(|e| match e {
                EngineError::Fatal(_) => e,
                other => EngineError::Fatal(format!("Failed to open page: {}", other)),
            })?;

            let outcome = self.run_attempt(page.as_ref(), test, &mut result).await;

            if outcome.is_err() {
                self.capture_failure(page.as_ref(), test, attempt).await;
            }
            if let Err(e) = page.close().await {
                log::warn!("Failed to close page for '{}': {}", test.name, e);
            }

            match outcome {
                Ok(()) => {
                    // A failure from an earlier attempt stays on record
                    result.status = TestStatus::Passed;
                    break;
                }
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    log::info!(
                        "Attempt {} of '{}' failed: {}",
                        attempt + 1,
                        test.name,
                        e
                    );
                    result.error = Some(e.to_string());
                }
            }
        }

        self.emitter.emit(TestEvent::TestFinished {
            name: test.name.clone(),
            status: result.status,
            retry_count: result.retry_count,
            duration_ms: started.elapsed().as_millis() as u64,
        });

        Ok(result)
    }

    /// Execute every step in order, stopping at the first failure
    async fn run_attempt(
        &self,
        page: &dyn BrowserPage,
        test: &TestCase,
        result: &mut TestResult,
    ) -> EngineResult<()> {
        result.steps_executed = 0;
        let interpreter =
            StepInterpreter::new(page, self.config, &self.context, self.emitter, &test.name);

        for (i, step) in test.steps.iter().enumerate() {
            self.emitter.emit(TestEvent::StepStarted {
                index: i,
                description: step.display_name(),
            });

            let step_result = interpreter.execute(i, step).await;

            if let Some(error) = step_result.error {
                self.emitter.emit(TestEvent::StepFailed {
                    index: i,
                    error: format!("{}: {}", error.kind(), error),
                    duration_ms: step_result.duration_ms,
                });
                return Err(error);
            }

            if step_result.status == StepStatus::NoOp {
                self.emitter.emit(TestEvent::StepNoOp {
                    index: i,
                    reason: format!("'{}' skipped", step.action),
                });
            } else {
                self.emitter.emit(TestEvent::StepPassed {
                    index: i,
                    selector: step_result.selector,
                    duration_ms: step_result.duration_ms,
                });
            }

            result.steps_executed += 1;
        }

        Ok(())
    }

    /// Best effort screenshot of a failed attempt
    async fn capture_failure(&self, page: &dyn BrowserPage, test: &TestCase, attempt: u32) {
        let path = self.context.error_screenshot_path(&test.name, attempt);
        match page.screenshot(&path).await {
            Ok(()) => self
                .emitter
                .log(format!("📸 Screenshot saved: {}", path.display()), 1),
            Err(e) => log::warn!("Failed to capture {}: {}", path.display(), e),
        }
    }
}
