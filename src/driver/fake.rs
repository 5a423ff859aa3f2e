//! Scripted in-memory browser used by unit tests.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use super::traits::{BrowserPage, BrowserRuntime};
use crate::error::{EngineError, EngineResult};

#[derive(Debug, Clone)]
pub struct FakeElement {
    pub text: String,
    pub visible: bool,
    /// Element only exists on pages opened at or after this index (0-based)
    pub available_from_page: usize,
    /// URL the page moves to when the element is clicked
    pub navigates_to: Option<String>,
    pub click_error: Option<String>,
}

impl FakeElement {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            visible: true,
            available_from_page: 0,
            navigates_to: None,
            click_error: None,
        }
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    pub fn from_page(mut self, index: usize) -> Self {
        self.available_from_page = index;
        self
    }

    pub fn navigates_to(mut self, url: &str) -> Self {
        self.navigates_to = Some(url.to_string());
        self
    }

    pub fn failing_click(mut self, error: &str) -> Self {
        self.click_error = Some(error.to_string());
        self
    }
}

#[derive(Debug, Clone, Default)]
struct Site {
    elements: HashMap<String, FakeElement>,
    start_url: String,
    unreachable: HashSet<String>,
}

/// Fake runtime. Every page starts from the same scripted site, so no state
/// leaks between pages.
#[derive(Default)]
pub struct FakeBrowser {
    site: Site,
    fail_new_page: bool,
    fail_screenshots: bool,
    pages_opened: AtomicUsize,
    pages_closed: Arc<AtomicUsize>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl FakeBrowser {
    pub fn new() -> Self {
        Self {
            site: Site {
                start_url: "about:blank".to_string(),
                ..Site::default()
            },
            ..Self::default()
        }
    }

    pub fn with_element(mut self, selector: &str, element: FakeElement) -> Self {
        self.site.elements.insert(selector.to_string(), element);
        self
    }

    pub fn with_start_url(mut self, url: &str) -> Self {
        self.site.start_url = url.to_string();
        self
    }

    pub fn with_unreachable(mut self, url: &str) -> Self {
        self.site.unreachable.insert(url.to_string());
        self
    }

    pub fn failing_new_page(mut self) -> Self {
        self.fail_new_page = true;
        self
    }

    pub fn failing_screenshots(mut self) -> Self {
        self.fail_screenshots = true;
        self
    }

    pub fn pages_opened(&self) -> usize {
        self.pages_opened.load(Ordering::SeqCst)
    }

    pub fn pages_closed(&self) -> usize {
        self.pages_closed.load(Ordering::SeqCst)
    }

    /// Every page operation so far, e.g. `"click #a"`
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Open a page directly, for tests that drive a page without a runtime
    pub fn page(&self) -> FakePage {
        let index = self.pages_opened.fetch_add(1, Ordering::SeqCst);
        FakePage {
            index,
            site: self.site.clone(),
            url: Mutex::new(self.site.start_url.clone()),
            fail_screenshots: self.fail_screenshots,
            closed: self.pages_closed.clone(),
            calls: self.calls.clone(),
        }
    }
}

#[async_trait]
impl BrowserRuntime for FakeBrowser {
    async fn new_page(&self) -> EngineResult<Box<dyn BrowserPage>> {
        if self.fail_new_page {
            return Err(EngineError::Fatal("browser process exited".to_string()));
        }
        Ok(Box::new(self.page()))
    }

    async fn close(&self) -> EngineResult<()> {
        Ok(())
    }
}

pub struct FakePage {
    index: usize,
    site: Site,
    url: Mutex<String>,
    fail_screenshots: bool,
    closed: Arc<AtomicUsize>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl FakePage {
    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn element(&self, selector: &str) -> EngineResult<&FakeElement> {
        self.site
            .elements
            .get(selector)
            .filter(|el| self.index >= el.available_from_page)
            .ok_or_else(|| {
                EngineError::Timeout(format!(
                    "Timeout 5000ms exceeded waiting for selector \"{}\"",
                    selector
                ))
            })
    }
}

#[async_trait]
impl BrowserPage for FakePage {
    async fn goto(&self, url: &str) -> EngineResult<()> {
        self.record(format!("goto {}", url));
        if self.site.unreachable.contains(url) {
            return Err(EngineError::Timeout(format!("navigating to \"{}\"", url)));
        }
        *self.url.lock().unwrap() = url.to_string();
        Ok(())
    }

    async fn click(&self, selector: &str) -> EngineResult<()> {
        self.record(format!("click {}", selector));
        let element = self.element(selector)?;
        if let Some(ref error) = element.click_error {
            return Err(EngineError::Browser(error.clone()));
        }
        if let Some(ref target) = element.navigates_to {
            *self.url.lock().unwrap() = target.clone();
        }
        Ok(())
    }

    async fn fill(&self, selector: &str, value: &str) -> EngineResult<()> {
        self.record(format!("fill {}={}", selector, value));
        self.element(selector).map(|_| ())
    }

    async fn wait_for_visible(&self, selector: &str) -> EngineResult<()> {
        self.record(format!("wait_visible {}", selector));
        let element = self.element(selector)?;
        if element.visible {
            Ok(())
        } else {
            Err(EngineError::Timeout(format!("'{}' is hidden", selector)))
        }
    }

    async fn text_content(&self, selector: &str) -> EngineResult<String> {
        self.record(format!("text {}", selector));
        Ok(self.element(selector)?.text.clone())
    }

    async fn is_visible(&self, selector: &str) -> EngineResult<bool> {
        self.record(format!("is_visible {}", selector));
        Ok(self.element(selector).map(|el| el.visible).unwrap_or(false))
    }

    async fn url(&self) -> EngineResult<String> {
        Ok(self.url.lock().unwrap().clone())
    }

    async fn wait_for_navigation(&self, from_url: &str, timeout_ms: u64) -> EngineResult<()> {
        self.record(format!("wait_navigation {}", timeout_ms));
        if *self.url.lock().unwrap() != from_url {
            Ok(())
        } else {
            Err(EngineError::Timeout(format!("no navigation from {}", from_url)))
        }
    }

    async fn pause(&self, duration_ms: u64) {
        self.record(format!("pause {}", duration_ms));
    }

    async fn screenshot(&self, path: &Path) -> EngineResult<()> {
        self.record(format!("screenshot {}", path.display()));
        if self.fail_screenshots {
            return Err(EngineError::Browser("screenshot failed".to_string()));
        }
        std::fs::write(path, b"\x89PNG")?;
        Ok(())
    }

    async fn close(&self) -> EngineResult<()> {
        self.record("close".to_string());
        self.closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
