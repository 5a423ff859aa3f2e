use std::path::PathBuf;

/// Web browser type
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BrowserType {
    #[default]
    Chromium,
    Firefox,
    Webkit,
}

impl BrowserType {
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "chromium" | "chrome" => Some(BrowserType::Chromium),
            "firefox" => Some(BrowserType::Firefox),
            "webkit" | "safari" => Some(BrowserType::Webkit),
            _ => None,
        }
    }
}

/// Execution engine configuration
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Run the browser without a window
    pub headless: bool,

    /// Per-operation timeout for navigation and element waits (ms)
    pub timeout_ms: u64,

    /// Extra attempts allowed after the first failed one
    pub retries: u32,

    /// Base URL used to normalize relative navigation targets
    pub base_url: Option<String>,

    /// Directory for reports and screenshots
    pub output_dir: PathBuf,

    /// How long a submit-like click waits for navigation (ms)
    pub navigation_timeout_ms: u64,

    /// Pause after a submit-like click, whether or not it navigated (ms)
    pub post_submit_settle_ms: u64,

    pub browser: BrowserType,
    pub viewport_width: u32,
    pub viewport_height: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            headless: false,
            timeout_ms: 5000,
            retries: 2,
            base_url: None,
            output_dir: PathBuf::from("."),
            navigation_timeout_ms: 5000,
            post_submit_settle_ms: 2000,
            browser: BrowserType::Chromium,
            viewport_width: 1280,
            viewport_height: 720,
        }
    }
}

impl EngineConfig {
    /// Defaults overridden by `LUMI_*` environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(v) = lookup("LUMI_HEADLESS") {
            config.headless = v == "true" || v == "1";
        }
        if let Some(v) = lookup("LUMI_TIMEOUT_MS").and_then(|v| v.parse().ok()) {
            config.timeout_ms = v;
        }
        if let Some(v) = lookup("LUMI_RETRIES").and_then(|v| v.parse().ok()) {
            config.retries = v;
        }
        if let Some(v) = lookup("LUMI_BASE_URL").filter(|v| !v.is_empty()) {
            config.base_url = Some(v);
        }
        if let Some(v) = lookup("LUMI_OUTPUT_DIR").filter(|v| !v.is_empty()) {
            config.output_dir = PathBuf::from(v);
        }

        config
    }

    /// Total attempts a test may take
    pub fn max_attempts(&self) -> u32 {
        self.retries + 1
    }
}
