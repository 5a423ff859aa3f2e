use crate::error::EngineResult;
use async_trait::async_trait;
use std::path::Path;

/// A running browser shared by every test of a suite run.
#[async_trait]
pub trait BrowserRuntime: Send + Sync {
    /// Open a fresh, isolated page. Failure here means the runtime itself is
    /// unusable and is reported as `EngineError::Fatal`.
    async fn new_page(&self) -> EngineResult<Box<dyn BrowserPage>>;

    /// Shut the browser down
    async fn close(&self) -> EngineResult<()>;
}

/// One page, owned by a single test attempt.
///
/// Selector arguments are opaque locator strings (CSS-like or XPath-like)
/// passed through to the browser unchanged.
#[async_trait]
pub trait BrowserPage: Send + Sync {
    /// Load `url` and wait for the load signal
    async fn goto(&self, url: &str) -> EngineResult<()>;

    async fn click(&self, selector: &str) -> EngineResult<()>;

    /// Replace the value of an input
    async fn fill(&self, selector: &str, value: &str) -> EngineResult<()>;

    /// Wait until the element is attached and visible
    async fn wait_for_visible(&self, selector: &str) -> EngineResult<()>;

    /// Text content of the element, waiting for it to be attached.
    /// Hidden elements are read as well.
    async fn text_content(&self, selector: &str) -> EngineResult<String>;

    /// Immediate visibility check, `false` when the element does not exist
    async fn is_visible(&self, selector: &str) -> EngineResult<bool>;

    /// Current page URL
    async fn url(&self) -> EngineResult<String>;

    /// Wait until the page navigates away from `from_url`.
    /// Returns `EngineError::Timeout` if nothing happens within `timeout_ms`.
    async fn wait_for_navigation(&self, from_url: &str, timeout_ms: u64) -> EngineResult<()>;

    /// Fixed-duration pause
    async fn pause(&self, duration_ms: u64);

    async fn screenshot(&self, path: &Path) -> EngineResult<()>;

    async fn close(&self) -> EngineResult<()>;
}
