pub mod config;
pub mod error;
pub mod log;
pub mod session;
pub mod storage;

// Re-export common types
pub use config::PlaygroundConfig;
pub use error::{PlaygroundError, Result};
