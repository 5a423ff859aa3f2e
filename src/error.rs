//! Error taxonomy for the execution engine.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    /// Malformed or empty suite, or a missing selector where one is required.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Every candidate of a selector set failed; carries the last failure.
    #[error("All {attempted} selector(s) failed, last error: {source}")]
    SelectorResolution {
        attempted: usize,
        #[source]
        source: Box<EngineError>,
    },

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Assertion failed: {0}")]
    Assertion(String),

    /// Non-timeout failure reported by the browser for a single operation.
    #[error("Browser error: {0}")]
    Browser(String),

    /// The browser runtime could not be started or was lost.
    #[error("Fatal browser runtime error: {0}")]
    Fatal(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type EngineResult<T> = Result<T, EngineError>;

impl EngineError {
    pub fn is_fatal(&self) -> bool {
        matches!(self, EngineError::Fatal(_))
    }

    /// Short class name used in console output.
    pub fn kind(&self) -> &'static str {
        match self {
            EngineError::Validation(_) => "ValidationError",
            EngineError::SelectorResolution { .. } => "SelectorResolutionError",
            EngineError::Timeout(_) => "TimeoutError",
            EngineError::Assertion(_) => "AssertionError",
            EngineError::Browser(_) => "BrowserError",
            EngineError::Fatal(_) => "FatalError",
            EngineError::Io(_) | EngineError::Json(_) | EngineError::Yaml(_) => "IoError",
        }
    }

    /// The innermost error, looking through selector resolution wrappers.
    pub fn root(&self) -> &EngineError {
        match self {
            EngineError::SelectorResolution { source, .. } => source.root(),
            other => other,
        }
    }

    /// Classify a driver error message, mapping Playwright timeouts to `Timeout`.
    pub fn from_driver(message: impl std::fmt::Display) -> Self {
        let message = message.to_string();
        if message.contains("Timeout") || message.contains("timeout") {
            EngineError::Timeout(message)
        } else {
            EngineError::Browser(message)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_driver_error_classification() {
        assert!(matches!(
            EngineError::from_driver("Timeout 5000ms exceeded."),
            EngineError::Timeout(_)
        ));
        assert!(matches!(
            EngineError::from_driver("Element is not attached to the DOM"),
            EngineError::Browser(_)
        ));
    }

    #[test]
    fn test_root_unwraps_resolution() {
        let err = EngineError::SelectorResolution {
            attempted: 2,
            source: Box::new(EngineError::Assertion("missing".into())),
        };
        assert_eq!(err.root().kind(), "AssertionError");
        assert!(err.to_string().contains("Assertion failed: missing"));
        assert!(!err.is_fatal());
    }
}
