pub mod driver;

pub use driver::{WebDriverConfig, WebPage, WebRuntime};
