use anyhow::Context;
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;

use lumi_web_runner::parser::normalize::apply_base_url;
use lumi_web_runner::utils::{BrowserType, EngineConfig};
use lumi_web_runner::{parser, report, runner};

#[derive(Parser)]
#[command(name = "lumi-web-runner")]
#[command(author = "NL Team")]
#[command(version = "0.1.0")]
#[command(about = "Data-driven UI acceptance test runner for web apps", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a test suite file
    Run {
        /// Path to the test suite (JSON or YAML)
        suite: PathBuf,

        /// Run the browser without a window
        #[arg(long, default_value = "false")]
        headless: bool,

        /// Per-operation timeout in milliseconds
        #[arg(long)]
        timeout: Option<u64>,

        /// Extra attempts for a failing test
        #[arg(long)]
        retries: Option<u32>,

        /// Base URL every test starts from
        #[arg(long)]
        base_url: Option<String>,

        /// Output directory for the report and screenshots
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Browser engine (chromium, firefox, webkit)
        #[arg(short, long)]
        browser: Option<String>,
    },

    /// Show or convert a saved execution report
    Report {
        /// Report file, or a directory holding test_report_*.json files
        results: PathBuf,

        /// Output format (summary, json, junit)
        #[arg(short, long, default_value = "summary")]
        format: String,

        /// Output file path
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Check that a suite file loads, without running it
    Validate {
        /// Path to the test suite (JSON or YAML)
        suite: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            suite,
            headless,
            timeout,
            retries,
            base_url,
            output,
            browser,
        } => {
            let mut config = EngineConfig::from_env();
            if headless {
                config.headless = true;
            }
            if let Some(timeout) = timeout {
                config.timeout_ms = timeout;
            }
            if let Some(retries) = retries {
                config.retries = retries;
            }
            if let Some(url) = base_url.filter(|u| !u.is_empty()) {
                config.base_url = Some(url);
            }
            if let Some(output) = output {
                config.output_dir = output;
            }
            if let Some(ref name) = browser {
                config.browser = BrowserType::parse(name)
                    .with_context(|| format!("Unknown browser: {}", name))?;
            }

            println!("{} Starting automated test execution", "🚀".green());
            println!("📋 Loading test cases from: {}", suite.display());

            let mut test_suite = parser::load_suite(&suite)?;
            if let Some(ref url) = config.base_url {
                apply_base_url(&mut test_suite, url);
            }

            println!("  Tests: {}", test_suite.len().to_string().cyan());
            println!("  Browser: {:?}", config.browser);
            println!(
                "  Headless: {}",
                if config.headless {
                    "Enabled".green()
                } else {
                    "Disabled".yellow()
                }
            );
            println!(
                "  Timeout: {}ms, retries: {}",
                config.timeout_ms, config.retries
            );
            if let Some(ref url) = config.base_url {
                println!("  Base URL: {}", url.cyan());
            }
            println!(
                "  Output: {}",
                config.output_dir.display().to_string().cyan()
            );

            let report_path = runner::run_tests(&test_suite, &config).await?;

            println!(
                "\n{} JSON report saved to: {}",
                "📄".to_string().blue(),
                report_path.display().to_string().cyan()
            );
        }

        Commands::Report {
            results,
            format,
            output,
        } => {
            println!(
                "{} Generating {} report from: {}",
                "📊".to_string().blue(),
                format.cyan(),
                results.display()
            );
            report::generate_report(&results, &format, output.as_deref()).await?;
        }

        Commands::Validate { suite } => {
            let test_suite = parser::load_suite(&suite)?;
            let steps: usize = test_suite.tests.iter().map(|t| t.steps.len()).sum();
            println!(
                "{} {} is valid: {} tests, {} steps",
                "✓".green().bold(),
                suite.display(),
                test_suite.len(),
                steps
            );
        }
    }

    Ok(())
}
