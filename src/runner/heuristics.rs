//! Text heuristics used by the click protocol. These are guesses based on
//! selector and URL text, not guarantees.

use crate::parser::types::SelectorSet;

const SUBMIT_KEYWORDS: [&str; 4] = ["sign in", "login", "submit", "button"];

const AUTH_URL_MARKER: &str = "auth";

/// Selectors probed for a visible error message after a failed login
pub const ERROR_INDICATORS: [&str; 5] = [
    ".error",
    ".alert",
    "[role='alert']",
    ".form-error",
    ".message",
];

/// Whether a click on this selector set probably submits a form and may
/// trigger a navigation
pub fn is_submit_control(selectors: &SelectorSet) -> bool {
    selectors.candidates().any(|s| {
        let lower = s.to_lowercase();
        SUBMIT_KEYWORDS.iter().any(|k| lower.contains(k))
    })
}

/// Whether the URL looks like an authentication page
pub fn is_auth_page(url: &str) -> bool {
    url.to_lowercase().contains(AUTH_URL_MARKER)
}
