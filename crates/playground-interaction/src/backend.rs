//! Chat backend - the remote `/main` and `/reset` endpoints.

use async_trait::async_trait;
use playground_core::PlaygroundConfig;
use playground_core::session::{OutgoingMessage, SessionIdentity};
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ChatError;

pub const USER_ID_HEADER: &str = "X-User-Id";
pub const ACCOUNT_ID_HEADER: &str = "X-Account-Id";

/// Body of a chat request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    pub history: Vec<OutgoingMessage>,
}

/// Decoded body of a successful chat response.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChatReply {
    /// `None` when the body carried no usable `reply` field.
    pub reply: Option<String>,
}

impl ChatReply {
    /// Extracts `reply` from a decoded body.
    ///
    /// Strings are taken as-is; other non-null values keep their JSON text;
    /// a missing or null field yields `None`.
    pub fn from_body(body: &Value) -> Self {
        let reply = match body.get("reply") {
            None | Some(Value::Null) => None,
            Some(Value::String(text)) => Some(text.clone()),
            Some(other) => Some(other.to_string()),
        };
        Self { reply }
    }
}

/// The remote side of a chat session.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Sends one chat request and decodes the reply.
    async fn send_chat(
        &self,
        identity: &SessionIdentity,
        request: &ChatRequest,
    ) -> Result<ChatReply, ChatError>;

    /// Tells the server to drop its conversation state for `identity`.
    async fn notify_reset(&self, identity: &SessionIdentity) -> Result<(), ChatError>;
}

/// `ChatBackend` over HTTP with reqwest.
#[derive(Clone)]
pub struct HttpChatBackend {
    client: Client,
    chat_url: String,
    reset_url: String,
}

impl HttpChatBackend {
    pub fn new(config: &PlaygroundConfig) -> Self {
        Self::with_client(Client::new(), config)
    }

    pub fn with_client(client: Client, config: &PlaygroundConfig) -> Self {
        Self {
            client,
            chat_url: config.chat_url(),
            reset_url: config.reset_url(),
        }
    }

    fn with_identity(builder: RequestBuilder, identity: &SessionIdentity) -> RequestBuilder {
        builder
            .header(USER_ID_HEADER, identity.user_id.as_str())
            .header(ACCOUNT_ID_HEADER, identity.account.email())
    }
}

fn map_transport_error(err: reqwest::Error) -> ChatError {
    if err.is_decode() {
        ChatError::Decode(err.to_string())
    } else {
        ChatError::Network(err.to_string())
    }
}

#[async_trait]
impl ChatBackend for HttpChatBackend {
    async fn send_chat(
        &self,
        identity: &SessionIdentity,
        request: &ChatRequest,
    ) -> Result<ChatReply, ChatError> {
        tracing::debug!(
            url = %self.chat_url,
            history_len = request.history.len(),
            "sending chat request"
        );

        let response = Self::with_identity(self.client.post(&self.chat_url), identity)
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ChatError::Status(status.as_u16()));
        }

        let bytes = response.bytes().await.map_err(map_transport_error)?;
        let body: Value =
            serde_json::from_slice(&bytes).map_err(|err| ChatError::Decode(err.to_string()))?;

        Ok(ChatReply::from_body(&body))
    }

    async fn notify_reset(&self, identity: &SessionIdentity) -> Result<(), ChatError> {
        Self::with_identity(self.client.post(&self.reset_url), identity)
            .send()
            .await
            .map_err(map_transport_error)?;
        Ok(())
    }
}
