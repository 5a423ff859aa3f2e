pub mod context;
pub mod events;
pub mod executor;
pub mod heuristics;
pub mod interpreter;
pub mod selector;
pub mod state;

use std::path::PathBuf;
use uuid::Uuid;

use crate::driver::traits::BrowserRuntime;
use crate::driver::web::{WebDriverConfig, WebRuntime};
use crate::error::EngineResult;
use crate::parser::types::TestSuite;
use crate::report::{write_report, ExecutionReport, ReportAggregator};
use crate::utils::config::EngineConfig;

pub use events::*;
pub use executor::TestExecutor;
pub use state::*;

/// Run every test of `suite` in order against an already running browser.
///
/// Returns `Err` only when the runtime fails fatally, in which case no
/// report is produced.
pub async fn execute_suite(
    runtime: &dyn BrowserRuntime,
    suite: &TestSuite,
    config: &EngineConfig,
    emitter: &EventEmitter,
) -> EngineResult<ExecutionReport> {
    emitter.emit(TestEvent::SessionStarted {
        session_id: Uuid::new_v4().to_string(),
        test_count: suite.len(),
    });

    let executor = TestExecutor::new(runtime, config, emitter);
    let mut aggregator = ReportAggregator::new();
    aggregator.start();

    for test in &suite.tests {
        let result = executor.run_test(test).await?;
        aggregator.record(result);
    }

    let report = aggregator.finish();
    emitter.emit(TestEvent::SessionFinished {
        summary: report.summary.clone(),
    });
    Ok(report)
}

/// Launch a browser, run the suite, and write the JSON report into
/// `config.output_dir`. Progress is printed to the console.
pub async fn run_tests(suite: &TestSuite, config: &EngineConfig) -> EngineResult<PathBuf> {
    let (emitter, receiver) = EventEmitter::new();
    let listener = tokio::spawn(ConsoleEventListener::listen(receiver));

    let outcome = run_with_browser(suite, config, &emitter).await;

    // Closing the channel lets the listener drain and exit
    drop(emitter);
    if let Err(e) = listener.await {
        log::warn!("Console listener stopped abnormally: {}", e);
    }

    outcome
}

async fn run_with_browser(
    suite: &TestSuite,
    config: &EngineConfig,
    emitter: &EventEmitter,
) -> EngineResult<PathBuf> {
    let runtime = WebRuntime::launch(WebDriverConfig::from(config)).await?;

    let report = execute_suite(&runtime, suite, config, emitter).await;
    if let Err(e) = runtime.close().await {
        log::warn!("Failed to close browser: {}", e);
    }

    write_report(&report?, &config.output_dir)
}
