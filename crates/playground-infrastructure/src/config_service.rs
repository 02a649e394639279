//! Configuration loading.
//!
//! Priority (highest first): explicit overrides from the caller,
//! environment variables, `config.toml`, built-in defaults.

use crate::paths::PlaygroundPaths;
use playground_core::config::PlaygroundConfig;
use playground_core::error::{PlaygroundError, Result};
use std::fs;
use std::path::{Path, PathBuf};

pub const ENV_BASE_URL: &str = "PLAYGROUND_BASE_URL";
pub const ENV_TIMEOUT_SECS: &str = "PLAYGROUND_TIMEOUT_SECS";

/// Loads `PlaygroundConfig` from a TOML file.
#[derive(Debug, Clone)]
pub struct ConfigService {
    path: PathBuf,
}

impl ConfigService {
    /// Uses the default location (`~/.config/playground/config.toml`).
    pub fn new() -> Result<Self> {
        let path = PlaygroundPaths::config_file().map_err(|e| PlaygroundError::config(e.to_string()))?;
        Ok(Self { path })
    }

    /// Uses a custom path (for `--config` and tests).
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the file; a missing or empty file yields the defaults.
    pub fn load(&self) -> Result<PlaygroundConfig> {
        if !self.path.exists() {
            tracing::debug!(path = %self.path.display(), "no config file, using defaults");
            return Ok(PlaygroundConfig::default());
        }

        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(PlaygroundConfig::default());
        }

        PlaygroundConfig::from_toml_str(&content)
    }

    /// Reads the file and applies the process environment on top.
    pub fn load_with_env(&self) -> Result<PlaygroundConfig> {
        let config = self.load()?;
        apply_env_overrides(config, |name| std::env::var(name).ok())
    }
}

/// Applies `PLAYGROUND_*` overrides looked up through `lookup`.
pub fn apply_env_overrides<F>(mut config: PlaygroundConfig, lookup: F) -> Result<PlaygroundConfig>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(base_url) = lookup(ENV_BASE_URL).filter(|v| !v.trim().is_empty()) {
        config.base_url = base_url;
    }

    if let Some(timeout) = lookup(ENV_TIMEOUT_SECS) {
        config.request_timeout_secs = timeout.trim().parse().map_err(|_| {
            PlaygroundError::config(format!("{ENV_TIMEOUT_SECS} must be an integer, got '{timeout}'"))
        })?;
    }

    config.validate()?;
    Ok(config)
}
