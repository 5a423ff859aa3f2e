use super::types::{Action, Step, TestSuite};

/// Make every test start from the base URL.
///
/// Tests that do not begin with `navigate` get one prepended; a leading
/// `navigate` with an empty or relative target is resolved against `base_url`.
pub fn apply_base_url(suite: &mut TestSuite, base_url: &str) {
    for test in &mut suite.tests {
        match test.steps.first_mut() {
            Some(first) if first.action == Action::Navigate => {
                if first.value.is_empty() {
                    first.value = base_url.to_string();
                } else if !is_absolute_url(&first.value) {
                    first.value = join_url(base_url, &first.value);
                }
            }
            _ => test.steps.insert(0, Step::navigate(base_url)),
        }
    }
}

pub fn is_absolute_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

fn join_url(base: &str, relative: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        relative.trim_start_matches('/')
    )
}
