use std::path::{Path, PathBuf};

/// Runtime information shared by the executor and the step interpreter
pub struct TestContext {
    /// Output directory for screenshots and reports
    pub output_dir: PathBuf,
}

impl TestContext {
    pub fn new(output_dir: &Path) -> Self {
        // Always ensure output directory exists
        let _ = std::fs::create_dir_all(output_dir);

        Self {
            output_dir: output_dir.to_path_buf(),
        }
    }

    /// Get output path for a file
    pub fn output_path(&self, filename: &str) -> PathBuf {
        self.output_dir.join(filename)
    }

    /// `error_<name>_<attempt>.png`, captured when an attempt fails
    pub fn error_screenshot_path(&self, test_name: &str, attempt: u32) -> PathBuf {
        self.output_path(&format!("error_{}_{}.png", artifact_stem(test_name), attempt))
    }

    /// `auth_debug_<name>.png`, captured when a login submit does not navigate
    pub fn auth_debug_screenshot_path(&self, test_name: &str) -> PathBuf {
        self.output_path(&format!("auth_debug_{}.png", artifact_stem(test_name)))
    }
}

/// Test name as a single file name component
fn artifact_stem(test_name: &str) -> String {
    test_name.replace([' ', '/', '\\'], "_")
}
