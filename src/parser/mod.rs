pub mod loader;
pub mod normalize;
pub mod types;

pub use loader::load_suite;
pub use types::{Action, SelectorSet, Step, TestCase, TestSuite};
