//! Conversation message types.
//!
//! `Message` is what the client stores locally; `OutgoingMessage` is the
//! `{role, text}` projection that goes over the wire.

use serde::{Deserialize, Serialize};

/// Greeting shown when an account has no stored conversation.
pub const DEFAULT_GREETING: &str = "This is the playground. Ask me anything!";

/// Represents the role of a message in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// Message typed by the user.
    User,
    /// Reply from the backend, or a locally generated error notice.
    Assistant,
}

/// A single entry of the local message log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub text: String,
    /// Local-only marker for assistant messages that report a failed send.
    /// Never part of the request payload.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_error: bool,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            text: text.into(),
            is_error: false,
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            text: text.into(),
            is_error: false,
        }
    }

    /// An assistant message that reports a failure in the chat log.
    pub fn assistant_error(text: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            text: text.into(),
            is_error: true,
        }
    }

    pub fn greeting() -> Self {
        Self::assistant(DEFAULT_GREETING)
    }

    /// The log a fresh (or freshly logged-out) account starts with.
    pub fn initial_log() -> Vec<Message> {
        vec![Self::greeting()]
    }
}

/// Wire shape of a history entry in a chat request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutgoingMessage {
    pub role: MessageRole,
    pub text: String,
}

impl From<&Message> for OutgoingMessage {
    fn from(message: &Message) -> Self {
        Self {
            role: message.role,
            text: message.text.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_role_serializes_lowercase() {
        let value = serde_json::to_value(Message::user("hi")).unwrap();
        assert_eq!(value, json!({"role": "user", "text": "hi"}));
    }

    #[test]
    fn test_error_flag_is_persisted_only_when_set() {
        let value = serde_json::to_value(Message::assistant_error("Error: HTTP 500")).unwrap();
        assert_eq!(value["is_error"], json!(true));

        let decoded: Message =
            serde_json::from_value(json!({"role": "assistant", "text": "ok"})).unwrap();
        assert!(!decoded.is_error);
    }

    #[test]
    fn test_outgoing_projection_drops_local_fields() {
        let message = Message::assistant_error("boom");
        let outgoing = OutgoingMessage::from(&message);
        let value = serde_json::to_value(&outgoing).unwrap();
        assert_eq!(value, json!({"role": "assistant", "text": "boom"}));
    }

    #[test]
    fn test_unknown_role_fails_to_decode() {
        let result = serde_json::from_value::<Message>(json!({"role": "system", "text": "x"}));
        assert!(result.is_err());
    }
}
