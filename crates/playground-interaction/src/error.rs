//! Errors of the chat request path and of login.

use playground_core::PlaygroundError;
use std::time::Duration;
use thiserror::Error;

/// Why a chat request produced no reply.
///
/// The `Display` text ends up verbatim in the assistant error message, so
/// each variant reads as a short user-facing sentence.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChatError {
    /// No response within the deadline; the request was aborted.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// Connection, DNS or transport failure.
    #[error("network error: {0}")]
    Network(String),

    /// The server answered with a status outside 2xx.
    #[error("HTTP {0}")]
    Status(u16),

    /// The response body was not valid JSON.
    #[error("invalid response body: {0}")]
    Decode(String),
}

impl ChatError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status(code) => Some(*code),
            _ => None,
        }
    }
}

#[derive(Error, Debug, Clone)]
pub enum AuthError {
    #[error("invalid email or password")]
    InvalidCredentials,

    /// Credentials matched but the login record could not be stored.
    #[error("failed to persist login: {0}")]
    Persist(#[from] PlaygroundError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_distinguish_causes() {
        let timeout = ChatError::Timeout(Duration::from_secs(30));
        assert_eq!(timeout.to_string(), "request timed out after 30s");
        assert!(timeout.is_timeout());

        let status = ChatError::Status(503);
        assert_eq!(status.to_string(), "HTTP 503");
        assert_eq!(status.status_code(), Some(503));
        assert!(!status.is_timeout());
    }
}
