use super::types::{TestCase, TestSuite};
use crate::error::{EngineError, EngineResult};
use serde::Deserialize;
use std::path::Path;

/// Suite document as written on disk. `tests` is optional here so that a
/// missing key is reported as a validation error instead of a parse error.
#[derive(Debug, Deserialize)]
struct SuiteDocument {
    tests: Option<Vec<TestCase>>,
}

/// Load and validate a test suite from a JSON (or YAML) file
pub fn load_suite(path: &Path) -> EngineResult<TestSuite> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        EngineError::Validation(format!(
            "Test case file '{}' could not be read: {}",
            path.display(),
            e
        ))
    })?;

    let is_yaml = path
        .extension()
        .map_or(false, |ext| ext == "yaml" || ext == "yml");

    let suite = if is_yaml {
        parse_yaml_suite(&content)
    } else {
        parse_json_suite(&content)
    }
    .map_err(|e| match e {
        EngineError::Validation(msg) => {
            EngineError::Validation(format!("{} (in '{}')", msg, path.display()))
        }
        other => other,
    })?;

    log::info!("Loaded {} tests from {}", suite.len(), path.display());
    Ok(suite)
}

/// Parse and validate a suite from JSON text
pub fn parse_json_suite(content: &str) -> EngineResult<TestSuite> {
    let doc: SuiteDocument = serde_json::from_str(content)
        .map_err(|e| EngineError::Validation(format!("Invalid JSON in test suite: {}", e)))?;
    validate(doc)
}

/// Parse and validate a suite from YAML text
pub fn parse_yaml_suite(content: &str) -> EngineResult<TestSuite> {
    let doc: SuiteDocument = serde_yaml::from_str(content)
        .map_err(|e| EngineError::Validation(format!("Invalid YAML in test suite: {}", e)))?;
    validate(doc)
}

fn validate(doc: SuiteDocument) -> EngineResult<TestSuite> {
    let tests = doc
        .tests
        .ok_or_else(|| EngineError::Validation("No 'tests' array found".to_string()))?;

    if tests.is_empty() {
        return Err(EngineError::Validation("Empty 'tests' array".to_string()));
    }

    Ok(TestSuite { tests })
}
