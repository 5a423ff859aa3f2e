//! Ordered multi-selector fallback.

use std::future::Future;

use crate::error::{EngineError, EngineResult};
use crate::parser::types::SelectorSet;

/// One candidate tried by [`resolve`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorAttempt {
    pub selector: String,
    /// `None` on success, the failure message otherwise
    pub error: Option<String>,
}

impl SelectorAttempt {
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

/// Attempts made while resolving one step, in order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectorTrace {
    pub attempts: Vec<SelectorAttempt>,
}

impl SelectorTrace {
    pub fn attempted(&self) -> Vec<&str> {
        self.attempts.iter().map(|a| a.selector.as_str()).collect()
    }

    /// The selector that worked, if any
    pub fn winner(&self) -> Option<&str> {
        self.attempts
            .iter()
            .find(|a| a.succeeded())
            .map(|a| a.selector.as_str())
    }

    /// Console lines describing each attempt
    pub fn lines(&self) -> Vec<String> {
        self.attempts
            .iter()
            .map(|a| match a.error {
                None => format!("✓ selector worked: '{}'", a.selector),
                Some(ref e) => format!("✗ selector failed: '{}' - {}", a.selector, e),
            })
            .collect()
    }
}

/// Run `op` against each candidate of `selectors` in order and return the
/// first success together with the selector that produced it.
///
/// Fails with `Validation` before calling `op` when the set has no usable
/// candidate, and with `SelectorResolution` wrapping the last candidate's
/// error when every candidate fails. Candidates are neither retried nor
/// deduplicated.
pub async fn resolve<'s, T, F, Fut>(
    selectors: &'s SelectorSet,
    trace: &mut SelectorTrace,
    mut op: F,
) -> EngineResult<(&'s str, T)>
where
    F: FnMut(&'s str) -> Fut,
    Fut: Future<Output = EngineResult<T>>,
{
    if selectors.is_empty() {
        return Err(EngineError::Validation(
            "No valid selectors provided".to_string(),
        ));
    }

    let mut attempted = 0;
    let mut last_error = None;

    for selector in selectors.candidates() {
        attempted += 1;
        log::debug!("Trying selector '{}'", selector);

        match op(selector).await {
            Ok(value) => {
                log::debug!("Selector worked: '{}'", selector);
                trace.attempts.push(SelectorAttempt {
                    selector: selector.to_string(),
                    error: None,
                });
                return Ok((selector, value));
            }
            Err(e) => {
                log::debug!("Selector failed: '{}' - {}", selector, e);
                trace.attempts.push(SelectorAttempt {
                    selector: selector.to_string(),
                    error: Some(e.to_string()),
                });
                last_error = Some(e);
            }
        }
    }

    let source = last_error
        .unwrap_or_else(|| EngineError::Validation("No valid selectors provided".to_string()));
    Err(EngineError::SelectorResolution {
        attempted,
        source: Box::new(source),
    })
}
