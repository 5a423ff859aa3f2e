//! Maps declarative steps onto page operations.

use std::time::Instant;

use super::context::TestContext;
use super::events::EventEmitter;
use super::heuristics::{self, ERROR_INDICATORS};
use super::selector;
use super::state::StepResult;
use crate::driver::traits::BrowserPage;
use crate::error::{EngineError, EngineResult};
use crate::parser::types::{Action, Step};
use crate::utils::config::EngineConfig;

/// Pause used by `wait` when the value is not a number of milliseconds
const DEFAULT_WAIT_MS: u64 = 1000;

/// Executes the steps of one attempt against one page
pub struct StepInterpreter<'a> {
    page: &'a dyn BrowserPage,
    config: &'a EngineConfig,
    context: &'a TestContext,
    emitter: &'a EventEmitter,
    test_name: &'a str,
}

impl<'a> StepInterpreter<'a> {
    pub fn new(
        page: &'a dyn BrowserPage,
        config: &'a EngineConfig,
        context: &'a TestContext,
        emitter: &'a EventEmitter,
        test_name: &'a str,
    ) -> Self {
        Self {
            page,
            config,
            context,
            emitter,
            test_name,
        }
    }

    /// Execute a single step. Errors are returned inside the `StepResult`.
    pub async fn execute(&self, index: usize, step: &Step) -> StepResult {
        let started = Instant::now();
        let mut result = StepResult::new(index);

        let outcome = match step.action {
            Action::Navigate => self.navigate(step).await,
            Action::Click => self.click(step, &mut result).await,
            Action::Type => self.type_text(step, &mut result).await,
            Action::Wait => self.wait(step, &mut result).await,
            Action::Assert => self.assert_text(step, &mut result).await,
            Action::AssertVisible => self.assert_visible(step, &mut result).await,
            Action::Expect => self.expect(step, &mut result).await,
            Action::Other(ref name) => {
                // Forward-declared action kinds pass through and still count as executed
                log::info!("Skipping unrecognized action '{}'", name);
                result.noop();
                Ok(())
            }
        };

        for line in result.trace.lines() {
            self.emitter.log(line, 1);
        }

        if let Err(e) = outcome {
            result.fail(e);
        }
        result.duration_ms = started.elapsed().as_millis() as u64;
        result
    }

    async fn navigate(&self, step: &Step) -> EngineResult<()> {
        if step.value.is_empty() {
            return Err(EngineError::Validation(
                "navigate requires a URL value".to_string(),
            ));
        }
        self.page.goto(&step.value).await
    }

    async fn click(&self, step: &Step, result: &mut StepResult) -> EngineResult<()> {
        let page = self.page;
        let submit = heuristics::is_submit_control(&step.selector);
        let url_before = if submit {
            page.url().await.unwrap_or_default()
        } else {
            String::new()
        };

        let (selector, ()) =
            selector::resolve(&step.selector, &mut result.trace, move |s| page.click(s)).await?;
        result.selector = Some(selector.to_string());

        if submit {
            self.await_submit_navigation(&url_before, result).await?;
        }
        Ok(())
    }

    /// After a login/submit click, give the page a bounded chance to navigate.
    /// A stall is not a failure, but on an auth page it is worth a screenshot.
    async fn await_submit_navigation(
        &self,
        url_before: &str,
        result: &mut StepResult,
    ) -> EngineResult<()> {
        self.emitter
            .log("🔄 Waiting for navigation after form submission...", 1);

        match self
            .page
            .wait_for_navigation(url_before, self.config.navigation_timeout_ms)
            .await
        {
            Ok(()) => {
                let url = self.page.url().await.unwrap_or_default();
                self.emitter
                    .log(format!("✓ Navigation completed. Current URL: {}", url), 1);
            }
            Err(EngineError::Timeout(_)) => {
                let url = self.page.url().await.unwrap_or_default();
                self.emitter.log(
                    format!("⚠️ No navigation occurred after form submission. URL: {}", url),
                    1,
                );
                if heuristics::is_auth_page(&url) {
                    self.debug_auth_failure(result).await;
                }
            }
            Err(e) => return Err(e),
        }

        self.page.pause(self.config.post_submit_settle_ms).await;
        Ok(())
    }

    /// Best effort: screenshot the page and report visible error messages
    async fn debug_auth_failure(&self, result: &mut StepResult) {
        self.emitter.log("🔍 Debugging authentication failure:", 1);

        let path = self.context.auth_debug_screenshot_path(self.test_name);
        match self.page.screenshot(&path).await {
            Ok(()) => {
                self.emitter.log(
                    format!("📸 Auth debug screenshot: {}", path.display()),
                    1,
                );
                result.artifacts.push(path);
            }
            Err(e) => {
                log::warn!("Auth debug screenshot failed: {}", e);
                self.emitter
                    .log(format!("⚠️ Error during debugging: {}", e), 1);
            }
        }

        for indicator in ERROR_INDICATORS {
            match self.page.is_visible(indicator).await {
                Ok(true) => {
                    let text = self.page.text_content(indicator).await.unwrap_or_default();
                    self.emitter.log(
                        format!("❌ Found error element: {}: {}", indicator, text.trim()),
                        1,
                    );
                }
                Ok(false) => {}
                Err(e) => log::warn!("Probing '{}' failed: {}", indicator, e),
            }
        }
    }

    async fn type_text(&self, step: &Step, result: &mut StepResult) -> EngineResult<()> {
        let page = self.page;
        let value = step.value.as_str();
        let (selector, ()) =
            selector::resolve(&step.selector, &mut result.trace, move |s| {
                page.fill(s, value)
            })
            .await?;
        result.selector = Some(selector.to_string());
        Ok(())
    }

    async fn wait(&self, step: &Step, result: &mut StepResult) -> EngineResult<()> {
        if step.value == "visible" {
            let page = self.page;
            let (selector, ()) =
                selector::resolve(&step.selector, &mut result.trace, move |s| {
                    page.wait_for_visible(s)
                })
                .await?;
            result.selector = Some(selector.to_string());
        } else {
            self.page.pause(parse_wait_ms(&step.value)).await;
        }
        Ok(())
    }

    async fn assert_text(&self, step: &Step, result: &mut StepResult) -> EngineResult<()> {
        let page = self.page;
        let expected = step.value.as_str();

        let (selector, ()) =
            selector::resolve(&step.selector, &mut result.trace, move |s| async move {
                let content = match page.text_content(s).await {
                    Ok(content) => content,
                    Err(EngineError::Timeout(_)) => {
                        return Err(EngineError::Assertion(format!(
                            "Element '{}' not found, expected text '{}'",
                            s, expected
                        )))
                    }
                    Err(e) => return Err(e),
                };

                if content.contains(expected) {
                    Ok(())
                } else {
                    Err(EngineError::Assertion(format!(
                        "Text '{}' not found in '{}'",
                        expected, content
                    )))
                }
            })
            .await?;

        result.selector = Some(selector.to_string());
        Ok(())
    }

    async fn assert_visible(&self, step: &Step, result: &mut StepResult) -> EngineResult<()> {
        let page = self.page;

        let (selector, ()) =
            selector::resolve(&step.selector, &mut result.trace, move |s| async move {
                if page.is_visible(s).await? {
                    Ok(())
                } else {
                    Err(EngineError::Assertion(format!(
                        "Element '{}' is not visible",
                        s
                    )))
                }
            })
            .await?;

        result.selector = Some(selector.to_string());
        Ok(())
    }

    async fn expect(&self, step: &Step, result: &mut StepResult) -> EngineResult<()> {
        if !step.selector.is_url_pseudo() {
            log::info!(
                "Unsupported expect target {:?}, step skipped",
                step.selector.as_slice()
            );
            result.noop();
            return Ok(());
        }

        let url = self.page.url().await?;
        if url.contains(&step.value) {
            Ok(())
        } else {
            Err(EngineError::Assertion(format!(
                "Expected URL to contain '{}', but got '{}'",
                step.value, url
            )))
        }
    }
}

/// Milliseconds for a `wait` value, `DEFAULT_WAIT_MS` unless it is all digits
fn parse_wait_ms(value: &str) -> u64 {
    if !value.is_empty() && value.chars().all(|c| c.is_ascii_digit()) {
        value.parse().unwrap_or(DEFAULT_WAIT_MS)
    } else {
        DEFAULT_WAIT_MS
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::fake::{FakeBrowser, FakeElement};
    use crate::parser::types::SelectorSet;
    use crate::runner::state::StepStatus;

    struct Harness {
        config: EngineConfig,
        context: TestContext,
        emitter: EventEmitter,
        _dir: tempfile::TempDir,
    }

    impl Harness {
        fn new() -> Self {
            let dir = tempfile::tempdir().unwrap();
            Self {
                config: EngineConfig::default(),
                context: TestContext::new(dir.path()),
                emitter: EventEmitter::default(),
                _dir: dir,
            }
        }

        async fn run(&self, browser: &FakeBrowser, step: Step) -> StepResult {
            let page = browser.page();
            let interpreter =
                StepInterpreter::new(&page, &self.config, &self.context, &self.emitter, "Login Test");
            interpreter.execute(0, &step).await
        }
    }

    #[tokio::test]
    async fn test_navigate() {
        let h = Harness::new();
        let browser = FakeBrowser::new();
        let result = h
            .run(&browser, Step::navigate("https://example.test/"))
            .await;
        assert_eq!(result.status, StepStatus::Passed);
        assert_eq!(browser.calls(), vec!["goto https://example.test/"]);
    }

    #[tokio::test]
    async fn test_click_falls_back_to_second_selector() {
        let h = Harness::new();
        let browser = FakeBrowser::new()
            .with_element("#a", FakeElement::new("").failing_click("detached"))
            .with_element("#b", FakeElement::new(""));

        let step = Step::new(Action::Click, SelectorSet::from(vec!["#a", "#b"]), "");
        let result = h.run(&browser, step).await;

        assert!(result.is_success());
        assert_eq!(result.selector.as_deref(), Some("#b"));
        assert_eq!(result.trace.attempted(), vec!["#a", "#b"]);
        assert!(!result.trace.attempts[0].succeeded());
        assert_eq!(browser.calls(), vec!["click #a", "click #b"]);
    }

    #[tokio::test]
    async fn test_submit_click_without_navigation_on_auth_page() {
        let h = Harness::new();
        let browser = FakeBrowser::new()
            .with_start_url("https://example.test/auth/login")
            .with_element("text=Sign In", FakeElement::new("Sign In"))
            .with_element(".alert", FakeElement::new("Invalid password"));

        let step = Step::new(Action::Click, SelectorSet::from("text=Sign In"), "");
        let result = h.run(&browser, step).await;

        assert_eq!(result.status, StepStatus::Passed);
        let shot = h.context.auth_debug_screenshot_path("Login Test");
        assert_eq!(result.artifacts, vec![shot.clone()]);
        assert!(shot.exists());

        let calls = browser.calls();
        assert!(calls.contains(&"wait_navigation 5000".to_string()));
        assert!(calls.contains(&"is_visible .alert".to_string()));
        assert!(calls.contains(&"text .alert".to_string()));
        assert_eq!(calls.last().map(String::as_str), Some("pause 2000"));
    }

    #[tokio::test]
    async fn test_submit_click_that_navigates() {
        let h = Harness::new();
        let browser = FakeBrowser::new()
            .with_start_url("https://example.test/auth/login")
            .with_element(
                "button[type='submit']",
                FakeElement::new("Go").navigates_to("https://example.test/home"),
            );

        let step = Step::new(Action::Click, SelectorSet::from("button[type='submit']"), "");
        let result = h.run(&browser, step).await;

        assert!(result.is_success());
        assert!(result.artifacts.is_empty());
        assert!(!h.context.auth_debug_screenshot_path("Login Test").exists());
    }

    #[tokio::test]
    async fn test_submit_stall_off_auth_page_has_no_diagnostics() {
        let h = Harness::new();
        let browser = FakeBrowser::new()
            .with_start_url("https://example.test/contact")
            .with_element("#submit", FakeElement::new(""));

        let result = h
            .run(&browser, Step::new(Action::Click, SelectorSet::from("#submit"), ""))
            .await;

        assert!(result.is_success());
        assert!(result.artifacts.is_empty());
        assert!(!browser.calls().iter().any(|c| c.starts_with("screenshot")));
    }

    #[tokio::test]
    async fn test_auth_screenshot_failure_is_swallowed() {
        let h = Harness::new();
        let browser = FakeBrowser::new()
            .with_start_url("https://example.test/auth")
            .with_element("#login", FakeElement::new(""))
            .failing_screenshots();

        let result = h
            .run(&browser, Step::new(Action::Click, SelectorSet::from("#login"), ""))
            .await;

        assert!(result.is_success());
        assert!(result.artifacts.is_empty());
    }

    #[tokio::test]
    async fn test_click_requires_selector() {
        let h = Harness::new();
        let browser = FakeBrowser::new();
        let result = h
            .run(&browser, Step::new(Action::Click, SelectorSet::default(), ""))
            .await;

        assert_eq!(result.status, StepStatus::Failed);
        assert!(matches!(result.error, Some(EngineError::Validation(_))));
        assert!(browser.calls().is_empty());
    }

    #[tokio::test]
    async fn test_type_fills_value() {
        let h = Harness::new();
        let browser = FakeBrowser::new().with_element("#email", FakeElement::new(""));
        let step = Step::new(
            Action::Type,
            SelectorSet::from(vec!["input[name='mail']", "#email"]),
            "a@b.c",
        );
        let result = h.run(&browser, step).await;

        assert!(result.is_success());
        assert_eq!(
            browser.calls(),
            vec!["fill input[name='mail']=a@b.c", "fill #email=a@b.c"]
        );
    }

    #[tokio::test]
    async fn test_wait_variants() {
        let h = Harness::new();
        let browser = FakeBrowser::new().with_element("#panel", FakeElement::new(""));

        let r = h
            .run(&browser, Step::new(Action::Wait, SelectorSet::from("#panel"), "visible"))
            .await;
        assert_eq!(r.selector.as_deref(), Some("#panel"));

        h.run(&browser, Step::new(Action::Wait, SelectorSet::default(), "250"))
            .await;
        h.run(&browser, Step::new(Action::Wait, SelectorSet::default(), "soon"))
            .await;

        assert_eq!(
            browser.calls(),
            vec!["wait_visible #panel", "pause 250", "pause 1000"]
        );
    }

    #[tokio::test]
    async fn test_wait_visible_on_hidden_element_fails() {
        let h = Harness::new();
        let browser = FakeBrowser::new().with_element("#panel", FakeElement::new("").hidden());
        let r = h
            .run(&browser, Step::new(Action::Wait, SelectorSet::from("#panel"), "visible"))
            .await;
        assert!(matches!(
            r.error.as_ref().map(EngineError::root),
            Some(EngineError::Timeout(_))
        ));
    }

    #[tokio::test]
    async fn test_assert_text() {
        let h = Harness::new();
        let browser = FakeBrowser::new().with_element("h1", FakeElement::new("Hello, world"));

        let ok = h
            .run(&browser, Step::new(Action::Assert, SelectorSet::from("h1"), "Hello"))
            .await;
        assert!(ok.is_success());

        let bad = h
            .run(&browser, Step::new(Action::Assert, SelectorSet::from("h1"), "Bye"))
            .await;
        let err = bad.error.unwrap();
        assert!(matches!(err.root(), EngineError::Assertion(_)));
        assert!(err.to_string().contains("Text 'Bye' not found in 'Hello, world'"));
    }

    #[tokio::test]
    async fn test_assert_reads_text_of_hidden_element() {
        let h = Harness::new();
        let browser = FakeBrowser::new()
            .with_element("#toast", FakeElement::new("Saved successfully").hidden());

        let r = h
            .run(&browser, Step::new(Action::Assert, SelectorSet::from("#toast"), "Saved"))
            .await;
        assert!(r.is_success(), "{:?}", r.error);
        assert_eq!(r.selector.as_deref(), Some("#toast"));
    }

    #[tokio::test]
    async fn test_assert_missing_element_is_assertion_failure() {
        let h = Harness::new();
        let browser = FakeBrowser::new();
        let r = h
            .run(&browser, Step::new(Action::Assert, SelectorSet::from(vec!["#missing"]), "Hello"))
            .await;

        let err = r.error.unwrap();
        assert!(matches!(err, EngineError::SelectorResolution { attempted: 1, .. }));
        assert!(matches!(err.root(), EngineError::Assertion(_)));
    }

    #[tokio::test]
    async fn test_assert_visible() {
        let h = Harness::new();
        let browser = FakeBrowser::new()
            .with_element("#hidden", FakeElement::new("").hidden())
            .with_element("#shown", FakeElement::new(""));

        let r = h
            .run(
                &browser,
                Step::new(Action::AssertVisible, SelectorSet::from(vec!["#hidden", "#shown"]), ""),
            )
            .await;
        assert_eq!(r.selector.as_deref(), Some("#shown"));

        let r = h
            .run(&browser, Step::new(Action::AssertVisible, SelectorSet::from("#hidden"), ""))
            .await;
        assert!(r.error.unwrap().to_string().contains("is not visible"));
    }

    #[tokio::test]
    async fn test_expect_url() {
        let h = Harness::new();
        let browser = FakeBrowser::new().with_start_url("https://example.test/dashboard");

        let ok = h
            .run(&browser, Step::new(Action::Expect, SelectorSet::from("url"), "/dashboard"))
            .await;
        assert_eq!(ok.status, StepStatus::Passed);

        let bad = h
            .run(&browser, Step::new(Action::Expect, SelectorSet::from("url"), "/settings"))
            .await;
        assert!(bad
            .error
            .unwrap()
            .to_string()
            .contains("Expected URL to contain '/settings'"));
    }

    #[tokio::test]
    async fn test_unsupported_expect_and_unknown_action_are_noops() {
        let h = Harness::new();
        let browser = FakeBrowser::new();

        let r = h
            .run(&browser, Step::new(Action::Expect, SelectorSet::from("title"), "Home"))
            .await;
        assert_eq!(r.status, StepStatus::NoOp);

        let r = h
            .run(&browser, Step::new(Action::from("hover"), SelectorSet::from("#menu"), ""))
            .await;
        assert_eq!(r.status, StepStatus::NoOp);
        assert!(r.is_success());
        assert!(browser.calls().is_empty());
    }

    #[test]
    fn test_parse_wait_ms() {
        assert_eq!(parse_wait_ms("1500"), 1500);
        assert_eq!(parse_wait_ms(""), DEFAULT_WAIT_MS);
        assert_eq!(parse_wait_ms("-5"), DEFAULT_WAIT_MS);
        assert_eq!(parse_wait_ms("1.5"), DEFAULT_WAIT_MS);
    }
}
