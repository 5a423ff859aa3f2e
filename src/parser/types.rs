use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// A loaded, validated test suite
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestSuite {
    pub tests: Vec<TestCase>,
}

impl TestSuite {
    pub fn len(&self) -> usize {
        self.tests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tests.is_empty()
    }
}

/// A single test case
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestCase {
    pub name: String,

    #[serde(default)]
    pub description: String,

    /// Informational only, navigation is driven by steps
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    pub steps: Vec<Step>,

    /// Descriptive, never machine-checked
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_result: Option<String>,
}

/// One declarative step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Step {
    pub action: Action,

    #[serde(default)]
    pub selector: SelectorSet,

    #[serde(default, deserialize_with = "lenient_string")]
    pub value: String,
}

impl Step {
    pub fn new(action: Action, selector: SelectorSet, value: impl Into<String>) -> Self {
        Self {
            action,
            selector,
            value: value.into(),
        }
    }

    pub fn navigate(url: &str) -> Self {
        Self::new(Action::Navigate, SelectorSet::default(), url)
    }

    /// Human readable one-line description for console output
    pub fn display_name(&self) -> String {
        let mut desc = self.action.to_string();
        match self.selector.len() {
            0 => {}
            1 => desc.push_str(&format!(" on '{}'", self.selector.as_slice()[0])),
            n => desc.push_str(&format!(" with {} selectors", n)),
        }
        if !self.value.is_empty() {
            desc.push_str(&format!(" with value '{}'", self.value));
        }
        desc
    }
}

/// Closed set of step actions. Unrecognized names are kept in `Other` and
/// executed as no-ops.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Action {
    Navigate,
    Click,
    Type,
    Wait,
    Assert,
    AssertVisible,
    Expect,
    Other(String),
}

impl Action {
    pub fn as_str(&self) -> &str {
        match self {
            Action::Navigate => "navigate",
            Action::Click => "click",
            Action::Type => "type",
            Action::Wait => "wait",
            Action::Assert => "assert",
            Action::AssertVisible => "assert_visible",
            Action::Expect => "expect",
            Action::Other(name) => name,
        }
    }
}

impl From<String> for Action {
    fn from(name: String) -> Self {
        match name.as_str() {
            "navigate" => Action::Navigate,
            "click" => Action::Click,
            "type" => Action::Type,
            "wait" => Action::Wait,
            "assert" => Action::Assert,
            "assert_visible" => Action::AssertVisible,
            "expect" => Action::Expect,
            _ => Action::Other(name),
        }
    }
}

impl From<&str> for Action {
    fn from(name: &str) -> Self {
        Action::from(name.to_string())
    }
}

impl From<Action> for String {
    fn from(action: Action) -> Self {
        action.as_str().to_string()
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered selector candidates for one logical element, first match wins.
///
/// Accepts a bare string, an array, `null` or nothing at all.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawSelector", into = "Vec<String>")]
pub struct SelectorSet(Vec<String>);

#[derive(Deserialize)]
#[serde(untagged)]
enum RawSelector {
    None,
    One(String),
    Many(Vec<String>),
}

impl From<RawSelector> for SelectorSet {
    fn from(raw: RawSelector) -> Self {
        match raw {
            RawSelector::None => SelectorSet::default(),
            RawSelector::One(s) => SelectorSet(vec![s]),
            RawSelector::Many(list) => SelectorSet(list),
        }
    }
}

impl From<SelectorSet> for Vec<String> {
    fn from(set: SelectorSet) -> Self {
        set.0
    }
}

impl From<&str> for SelectorSet {
    fn from(s: &str) -> Self {
        SelectorSet(vec![s.to_string()])
    }
}

impl From<Vec<&str>> for SelectorSet {
    fn from(list: Vec<&str>) -> Self {
        SelectorSet(list.into_iter().map(String::from).collect())
    }
}

impl SelectorSet {
    /// Raw candidates, including empty strings
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when no usable (non-empty) candidate exists
    pub fn is_empty(&self) -> bool {
        self.candidates().next().is_none()
    }

    /// Usable candidates in priority order, empty strings skipped
    pub fn candidates(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str).filter(|s| !s.is_empty())
    }

    /// True when the set is exactly the `url` pseudo-selector used by `expect`.
    /// A bare `"url"` and a one-element `["url"]` deserialize the same way.
    pub fn is_url_pseudo(&self) -> bool {
        matches!(self.0.as_slice(), [only] if only == "url")
    }
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Lenient {
        Text(String),
        Int(i64),
        Float(f64),
        Flag(bool),
        Null(()),
    }

    Ok(match Lenient::deserialize(deserializer)? {
        Lenient::Text(s) => s,
        Lenient::Int(n) => n.to_string(),
        Lenient::Float(n) => n.to_string(),
        Lenient::Flag(b) => b.to_string(),
        Lenient::Null(()) => String::new(),
    })
}
