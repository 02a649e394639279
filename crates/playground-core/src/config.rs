//! Client configuration.
//!
//! Every field has a default, so an empty or partial `config.toml` is valid.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{PlaygroundError, Result};

pub const DEFAULT_BASE_URL: &str = "http://localhost:5050";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_STORAGE_PREFIX: &str = "playground";
/// Browser storage quotas are usually around 5 MiB per origin.
pub const DEFAULT_STORAGE_CAPACITY_BYTES: usize = 5 * 1024 * 1024;

/// Upper bound on the persisted message log.
pub const MAX_MESSAGES: usize = 1000;
/// Upper bound on the persisted prompt history.
pub const MAX_HISTORY: usize = 200;
/// Number of trailing messages sent with each request.
pub const MAX_HISTORY_SEND: usize = 40;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaygroundConfig {
    /// Base URL of the chat backend; `/main` and `/reset` are appended.
    pub base_url: String,
    pub request_timeout_secs: u64,
    /// Prefix of every account-scoped storage key.
    pub storage_prefix: String,
    pub max_messages: usize,
    pub max_history: usize,
    pub max_history_send: usize,
    /// `None` disables the capacity check.
    pub storage_capacity_bytes: Option<usize>,
}

impl Default for PlaygroundConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            storage_prefix: DEFAULT_STORAGE_PREFIX.to_string(),
            max_messages: MAX_MESSAGES,
            max_history: MAX_HISTORY,
            max_history_send: MAX_HISTORY_SEND,
            storage_capacity_bytes: Some(DEFAULT_STORAGE_CAPACITY_BYTES),
        }
    }
}

impl PlaygroundConfig {
    /// Parses a TOML document. Missing keys fall back to defaults.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects values that would make the client unusable.
    pub fn validate(&self) -> Result<()> {
        if self.base_url.trim().is_empty() {
            return Err(PlaygroundError::config("base_url must not be empty"));
        }
        if self.request_timeout_secs == 0 {
            return Err(PlaygroundError::config(
                "request_timeout_secs must be greater than zero",
            ));
        }
        if self.storage_prefix.contains(':') {
            return Err(PlaygroundError::config(
                "storage_prefix must not contain ':'",
            ));
        }
        if self.max_messages == 0 || self.max_history == 0 {
            return Err(PlaygroundError::config(
                "max_messages and max_history must be greater than zero",
            ));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Endpoint for chat requests.
    pub fn chat_url(&self) -> String {
        format!("{}/main", self.base_url.trim_end_matches('/'))
    }

    /// Endpoint for the logout notification.
    pub fn reset_url(&self) -> String {
        format!("{}/reset", self.base_url.trim_end_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_documented_limits() {
        let config = PlaygroundConfig::default();
        assert_eq!(config.max_messages, 1000);
        assert_eq!(config.max_history, 200);
        assert_eq!(config.max_history_send, 40);
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert_eq!(config.chat_url(), "http://localhost:5050/main");
        assert_eq!(config.reset_url(), "http://localhost:5050/reset");
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = PlaygroundConfig::from_toml_str("base_url = \"http://example.test/\"\n")
            .expect("valid config");
        assert_eq!(config.chat_url(), "http://example.test/main");
        assert_eq!(config.storage_prefix, DEFAULT_STORAGE_PREFIX);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let err = PlaygroundConfig::from_toml_str("request_timeout_secs = 0\n").unwrap_err();
        assert!(err.is_config());

        let err = PlaygroundConfig::from_toml_str("storage_prefix = \"a:b\"\n").unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn test_malformed_toml_is_serialization_error() {
        let err = PlaygroundConfig::from_toml_str("base_url = [").unwrap_err();
        assert!(err.is_serialization());
    }
}
