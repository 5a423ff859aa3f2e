pub mod config;

pub use config::{BrowserType, EngineConfig};
