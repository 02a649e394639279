//! Unified path management for playground files.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/playground/        # Config directory
//! ├── config.toml              # Client configuration
//! └── logs/                    # Application logs
//!     └── playground.log.YYYY-MM-DD
//!
//! ~/.local/share/playground/   # Data directory
//! └── store.json               # Durable key/value store
//! ```

use std::path::PathBuf;

const APP_DIR: &str = "playground";

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Home directory could not be determined.
    HomeDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::HomeDirNotFound => write!(f, "Cannot find home directory"),
        }
    }
}

impl std::error::Error for PathError {}

/// Platform paths (XDG on Linux, the usual locations elsewhere).
pub struct PlaygroundPaths;

impl PlaygroundPaths {
    /// Returns the playground configuration directory.
    pub fn config_dir() -> Result<PathBuf, PathError> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or(PathError::HomeDirNotFound)
    }

    /// Returns the playground data directory.
    pub fn data_dir() -> Result<PathBuf, PathError> {
        dirs::data_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or(PathError::HomeDirNotFound)
    }

    /// Returns the path to the main configuration file.
    pub fn config_file() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Returns the path of the durable key/value store inside `data_dir`.
    pub fn store_file_in(data_dir: impl Into<PathBuf>) -> PathBuf {
        data_dir.into().join("store.json")
    }

    /// Returns the path of the default durable key/value store.
    pub fn store_file() -> Result<PathBuf, PathError> {
        Ok(Self::store_file_in(Self::data_dir()?))
    }

    /// Returns the path to the logs directory.
    pub fn logs_dir() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("logs"))
    }
}
