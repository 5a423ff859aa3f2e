use super::state::TestStatus;
use crate::report::types::ReportSummary;
use tokio::sync::broadcast;

/// Test execution events for real-time updates
#[derive(Debug, Clone)]
pub enum TestEvent {
    // Session events
    SessionStarted {
        session_id: String,
        test_count: usize,
    },
    SessionFinished {
        summary: ReportSummary,
    },

    // Test events
    TestStarted {
        name: String,
        step_count: usize,
    },
    TestRetrying {
        name: String,
        attempt: u32,
        retries: u32,
    },
    TestFinished {
        name: String,
        status: TestStatus,
        retry_count: u32,
        duration_ms: u64,
    },

    // Step events
    StepStarted {
        index: usize,
        description: String,
    },
    StepPassed {
        index: usize,
        selector: Option<String>,
        duration_ms: u64,
    },
    StepNoOp {
        index: usize,
        reason: String,
    },
    StepFailed {
        index: usize,
        error: String,
        duration_ms: u64,
    },

    // Log event for coordinated output
    Log {
        message: String,
        depth: usize,
    },
}

/// Event emitter for broadcasting test events
pub struct EventEmitter {
    sender: broadcast::Sender<TestEvent>,
}

impl EventEmitter {
    pub fn new() -> (Self, broadcast::Receiver<TestEvent>) {
        let (sender, receiver) = broadcast::channel(256);
        (Self { sender }, receiver)
    }

    pub fn emit(&self, event: TestEvent) {
        let _ = self.sender.send(event);
    }

    pub fn log(&self, message: impl Into<String>, depth: usize) {
        self.emit(TestEvent::Log {
            message: message.into(),
            depth,
        });
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TestEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventEmitter {
    fn default() -> Self {
        let (sender, _) = broadcast::channel(256);
        Self { sender }
    }
}

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::time::Duration as StdDuration;

/// Console event listener for printing real-time updates
pub struct ConsoleEventListener;

impl ConsoleEventListener {
    /// Render events until every sender has been dropped
    pub async fn listen(mut receiver: broadcast::Receiver<TestEvent>) {
        use colored::Colorize;
        use indicatif::ProgressDrawTarget;
        use std::io::IsTerminal;

        // Hidden target when piped, to avoid terminal escape codes
        let multi = if std::io::stdout().is_terminal() {
            MultiProgress::new()
        } else {
            MultiProgress::with_draw_target(ProgressDrawTarget::hidden())
        };

        let mut spinner: Option<ProgressBar> = None;
        let mut step_text = String::new();

        loop {
            let event = match receiver.recv().await {
                Ok(event) => event,
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => break,
            };

            match event {
                TestEvent::SessionStarted {
                    session_id,
                    test_count,
                } => {
                    println!(
                        "\n{} Test session started: {} ({} tests)",
                        "▶".green().bold(),
                        session_id.cyan(),
                        test_count
                    );
                }

                TestEvent::SessionFinished { summary } => {
                    if let Some(pb) = spinner.take() {
                        pb.finish();
                    }

                    println!("\n{}", "=".repeat(50));
                    println!("TEST EXECUTION SUMMARY");
                    println!("{}", "=".repeat(50));
                    println!("Total Tests: {}", summary.total);
                    println!("Passed: {}", summary.passed.to_string().green());
                    println!("Failed: {}", summary.failed.to_string().red());
                    println!("Skipped: {}", summary.skipped.to_string().yellow());
                    println!("Execution Time: {:.2} seconds", summary.execution_time);
                    println!("{}", "=".repeat(50));
                }

                TestEvent::TestStarted { name, step_count } => {
                    println!(
                        "\n  {} Test: {} ({} steps)",
                        "→".blue(),
                        name.white().bold(),
                        step_count
                    );
                }

                TestEvent::TestRetrying {
                    name,
                    attempt,
                    retries,
                } => {
                    println!(
                        "  {} Retry {}/{} for test: {}",
                        "↻".yellow(),
                        attempt,
                        retries,
                        name
                    );
                }

                TestEvent::TestFinished {
                    name,
                    status,
                    retry_count,
                    duration_ms,
                } => {
                    if let Some(pb) = spinner.take() {
                        pb.finish();
                    }
                    let status_str = match status {
                        TestStatus::Passed => "PASSED".green().bold(),
                        TestStatus::Failed => "FAILED".red().bold(),
                    };
                    println!(
                        "  {} Test {} [{}] retries: {}, {}ms",
                        "←".blue(),
                        name,
                        status_str,
                        retry_count,
                        duration_ms
                    );
                }

                TestEvent::StepStarted { index, description } => {
                    let pb = multi.add(ProgressBar::new_spinner());
                    if let Ok(style) = ProgressStyle::default_spinner()
                        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ ")
                        .template("    {spinner} {msg}")
                    {
                        pb.set_style(style);
                    }

                    step_text = format!("Step {}: {}... ", index + 1, description.dimmed());
                    pb.set_message(step_text.clone());
                    pb.enable_steady_tick(StdDuration::from_millis(100));
                    spinner = Some(pb);
                }

                TestEvent::StepPassed {
                    selector,
                    duration_ms,
                    ..
                } => {
                    let via = selector
                        .map(|s| format!("via '{}' ", s))
                        .unwrap_or_default();
                    let done_msg = format!(
                        "    {} {}{}({}ms)",
                        "✓".green(),
                        step_text,
                        via.dimmed(),
                        duration_ms
                    );
                    if let Some(pb) = spinner.take() {
                        pb.finish_and_clear();
                    }
                    println!("{}", done_msg);
                }

                TestEvent::StepNoOp { reason, .. } => {
                    if let Some(pb) = spinner.take() {
                        pb.finish_and_clear();
                    }
                    println!("    {} {}({})", "○".yellow(), step_text, reason.dimmed());
                }

                TestEvent::StepFailed {
                    error, duration_ms, ..
                } => {
                    if let Some(pb) = spinner.take() {
                        pb.finish_and_clear();
                    }
                    println!("    {} {}({}ms)", "✗".red(), step_text, duration_ms);
                    println!("      {}", error.red());
                }

                TestEvent::Log { message, depth } => {
                    let line = format!("{}  {}", "    ".repeat(depth), message);
                    if multi.is_hidden() {
                        println!("{}", line);
                    } else {
                        multi.println(line).ok();
                    }
                }
            }
        }
    }
}
