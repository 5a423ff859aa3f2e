pub mod driver;
pub mod error;
pub mod parser;
pub mod report;
pub mod runner;
pub mod utils;

// Re-export common items
pub use error::{EngineError, EngineResult};
pub use parser::load_suite;
pub use report::generate_report;
pub use runner::{execute_suite, run_tests};
pub use utils::EngineConfig;
