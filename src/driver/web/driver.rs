//! Browser runtime backed by Playwright
//!
//! One `WebRuntime` owns the Playwright server, the browser and a single
//! browser context for the whole suite run. Each test attempt gets its own
//! `WebPage` opened in that context.

use async_trait::async_trait;
use colored::Colorize;
use playwright::api::{Browser, BrowserContext, Page, Viewport};
use playwright::Playwright;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

use crate::driver::traits::{BrowserPage, BrowserRuntime};
use crate::error::{EngineError, EngineResult};
use crate::utils::config::{BrowserType, EngineConfig};

/// Interval between URL checks while waiting for a navigation
const NAVIGATION_POLL_MS: u64 = 100;

/// Web Driver configuration
#[derive(Debug, Clone)]
pub struct WebDriverConfig {
    pub browser_type: BrowserType,
    pub headless: bool,
    pub viewport_width: u32,
    pub viewport_height: u32,
    /// Default timeout applied to every page operation (ms)
    pub timeout_ms: u64,
}

impl WebDriverConfig {
    /// Page default timeout, clamped to what Playwright accepts
    pub fn page_timeout_ms(&self) -> u32 {
        u32::try_from(self.timeout_ms).unwrap_or(u32::MAX)
    }
}

impl From<&EngineConfig> for WebDriverConfig {
    fn from(config: &EngineConfig) -> Self {
        Self {
            browser_type: config.browser,
            headless: config.headless,
            viewport_width: config.viewport_width,
            viewport_height: config.viewport_height,
            timeout_ms: config.timeout_ms,
        }
    }
}

/// Playwright browser shared across a suite run
pub struct WebRuntime {
    #[allow(dead_code)]
    playwright: Arc<Playwright>,
    browser: Arc<Browser>,
    context: Arc<BrowserContext>,
    config: WebDriverConfig,
}

impl WebRuntime {
    /// Start Playwright and launch the configured browser.
    /// Any failure is fatal for the run.
    pub async fn launch(config: WebDriverConfig) -> EngineResult<Self> {
        let playwright = Playwright::initialize()
            .await
            .map_err(|e| EngineError::Fatal(format!("Failed to initialize Playwright: {}", e)))?;

        let browser = match config.browser_type {
            BrowserType::Chromium => launch_chromium_browser(&playwright.chromium(), &config).await?,
            BrowserType::Firefox => playwright
                .firefox()
                .launcher()
                .headless(config.headless)
                .launch()
                .await
                .map_err(|e| EngineError::Fatal(format!("Failed to launch Firefox: {}", e)))?,
            BrowserType::Webkit => playwright
                .webkit()
                .launcher()
                .headless(config.headless)
                .launch()
                .await
                .map_err(|e| EngineError::Fatal(format!("Failed to launch WebKit: {}", e)))?,
        };

        let context = browser
            .context_builder()
            .build()
            .await
            .map_err(|e| EngineError::Fatal(format!("Failed to create browser context: {}", e)))?;

        log::info!(
            "Launched {:?} (headless: {})",
            config.browser_type,
            config.headless
        );

        Ok(Self {
            playwright: Arc::new(playwright),
            browser: Arc::new(browser),
            context: Arc::new(context),
            config,
        })
    }
}

#[async_trait]
impl BrowserRuntime for WebRuntime {
    async fn new_page(&self) -> EngineResult<Box<dyn BrowserPage>> {
        let page = self
            .context
            .new_page()
            .await
            .map_err(|e| EngineError::Fatal(format!("Failed to open a new page: {}", e)))?;

        page.set_viewport_size(Viewport {
            width: self.config.viewport_width as i32,
            height: self.config.viewport_height as i32,
        })
        .await
        .map_err(|e| EngineError::Fatal(format!("Failed to set viewport: {}", e)))?;

        // Screenshots, evaluations and close have no per-call timeout
        page.set_default_timeout(self.config.page_timeout_ms())
            .await
            .map_err(|e| EngineError::Fatal(format!("Failed to set page timeout: {}", e)))?;

        Ok(Box::new(WebPage {
            page: Mutex::new(page),
            timeout_ms: self.config.timeout_ms,
        }))
    }

    async fn close(&self) -> EngineResult<()> {
        self.browser.close().await.map_err(EngineError::from_driver)?;
        Ok(())
    }
}

/// A single Playwright page
pub struct WebPage {
    page: Mutex<Page>,
    timeout_ms: u64,
}

impl WebPage {
    fn timeout(&self) -> f64 {
        self.timeout_ms as f64
    }
}

#[async_trait]
impl BrowserPage for WebPage {
    async fn goto(&self, url: &str) -> EngineResult<()> {
        let page = self.page.lock().await;
        page.goto_builder(url)
            .timeout(self.timeout())
            .goto()
            .await
            .map_err(EngineError::from_driver)?;
        Ok(())
    }

    async fn click(&self, selector: &str) -> EngineResult<()> {
        let page = self.page.lock().await;
        page.click_builder(selector)
            .timeout(self.timeout())
            .click()
            .await
            .map_err(EngineError::from_driver)?;
        Ok(())
    }

    async fn fill(&self, selector: &str, value: &str) -> EngineResult<()> {
        let page = self.page.lock().await;
        page.fill_builder(selector, value)
            .timeout(self.timeout())
            .fill()
            .await
            .map_err(EngineError::from_driver)?;
        Ok(())
    }

    async fn wait_for_visible(&self, selector: &str) -> EngineResult<()> {
        let page = self.page.lock().await;
        let handle = page
            .wait_for_selector_builder(selector)
            .timeout(self.timeout())
            .wait_for_selector()
            .await
            .map_err(EngineError::from_driver)?;

        match handle {
            Some(_) => Ok(()),
            None => Err(EngineError::Timeout(format!(
                "'{}' did not become visible within {}ms",
                selector, self.timeout_ms
            ))),
        }
    }

    async fn text_content(&self, selector: &str) -> EngineResult<String> {
        // Only needs the element attached, hidden elements still have text
        let page = self.page.lock().await;
        let text = page
            .text_content(selector, Some(self.timeout()))
            .await
            .map_err(EngineError::from_driver)?;
        Ok(text.unwrap_or_default())
    }

    async fn is_visible(&self, selector: &str) -> EngineResult<bool> {
        let page = self.page.lock().await;
        let element = page
            .query_selector(selector)
            .await
            .map_err(EngineError::from_driver)?;
        match element {
            Some(el) => Ok(el.is_visible().await.map_err(EngineError::from_driver)?),
            None => Ok(false),
        }
    }

    async fn url(&self) -> EngineResult<String> {
        let page = self.page.lock().await;
        let href: String = page
            .evaluate::<(), String>("() => window.location.href", ())
            .await
            .map_err(EngineError::from_driver)?;
        Ok(href)
    }

    async fn wait_for_navigation(&self, from_url: &str, timeout_ms: u64) -> EngineResult<()> {
        let poll = async {
            loop {
                // An evaluation error means the document is being replaced
                match self.url().await {
                    Ok(current) if current != from_url => return,
                    Ok(_) | Err(_) => {}
                }
                tokio::time::sleep(Duration::from_millis(NAVIGATION_POLL_MS)).await;
            }
        };

        tokio::time::timeout(Duration::from_millis(timeout_ms), poll)
            .await
            .map_err(|_| {
                EngineError::Timeout(format!(
                    "No navigation away from {} within {}ms",
                    from_url, timeout_ms
                ))
            })
    }

    async fn pause(&self, duration_ms: u64) {
        tokio::time::sleep(Duration::from_millis(duration_ms)).await;
    }

    async fn screenshot(&self, path: &Path) -> EngineResult<()> {
        let page = self.page.lock().await;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        page.screenshot_builder()
            .path(path.to_path_buf())
            .screenshot()
            .await
            .map_err(EngineError::from_driver)?;
        Ok(())
    }

    async fn close(&self) -> EngineResult<()> {
        let page = self.page.lock().await;
        page.close(None).await.map_err(EngineError::from_driver)?;
        Ok(())
    }
}

/// Launch a new Chromium browser, preferring an explicitly configured or
/// locally installed executable
async fn launch_chromium_browser(
    chromium: &playwright::api::BrowserType,
    config: &WebDriverConfig,
) -> EngineResult<Browser> {
    let mut launcher = chromium.launcher();
    launcher = launcher.headless(config.headless);

    let env_path = std::env::var("PLAYWRIGHT_CHROMIUM_EXECUTABLE_PATH")
        .ok()
        .map(PathBuf::from);
    let executable = env_path.or_else(find_system_browser);

    if let Some(ref path) = executable {
        println!("{} Using browser: {}", "🌐".blue(), path.display());
        launcher = launcher.executable(path);
    } else {
        log::info!("No browser executable found, using the Playwright-managed Chromium");
    }

    let args: Vec<String> = [
        "--no-sandbox",
        "--disable-setuid-sandbox",
        "--disable-dev-shm-usage",
        "--disable-gpu",
        "--ignore-certificate-errors",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();

    launcher = launcher.args(&args);

    launcher
        .launch()
        .await
        .map_err(|e| EngineError::Fatal(format!("Failed to launch Chromium: {}", e)))
}

fn find_system_browser() -> Option<PathBuf> {
    let common_paths = [
        "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
        "/usr/bin/google-chrome",
        "/usr/bin/google-chrome-stable",
        "/Applications/Chromium.app/Contents/MacOS/Chromium",
        "/usr/bin/chromium",
        "/usr/bin/chromium-browser",
    ];

    common_paths
        .iter()
        .map(Path::new)
        .find(|p| p.exists())
        .map(Path::to_path_buf)
}
