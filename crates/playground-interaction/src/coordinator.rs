//! Request coordination for one chat session.
//!
//! `ChatCoordinator` owns the in-memory message log, prompt history and
//! input buffer of a mounted session, persists every mutation through the
//! account's `ScopedStore`, and allows at most one chat request in flight.
//!
//! ```text
//! Idle --send(text)--> Sending --reply--> Idle
//!                         \----error/timeout--> Idle
//! ```
//!
//! The state lock is never held across an await point, so a second `send`
//! issued while the first is awaiting the network observes `Sending` and
//! returns `SendOutcome::Ignored`.

use playground_core::PlaygroundConfig;
use playground_core::log::{
    append_message, build_outgoing_history, cap_messages, filter_history, normalize_history,
    push_history,
};
use playground_core::session::{Message, SessionIdentity};
use playground_core::storage::{ScopedKey, ScopedStore};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use crate::backend::{ChatBackend, ChatReply, ChatRequest};
use crate::error::ChatError;

/// Assistant text used when a successful response carries no reply.
pub const NO_RESPONSE_PLACEHOLDER: &str = "(no response from server)";
/// What "save current input" records when the input buffer is empty.
pub const EMPTY_INPUT_PLACEHOLDER: &str = "New query";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendState {
    Idle,
    Sending,
}

/// Result of one `send` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// Blank input, or another send was in flight. Nothing changed.
    Ignored,
    /// The backend replied; the assistant message has been appended.
    Replied(Message),
    /// The request failed; an assistant error message has been appended.
    Failed(ChatError),
    /// The session was reset while the request was in flight; the reply was dropped.
    Discarded,
}

#[derive(Debug, Clone, Copy)]
struct Limits {
    max_messages: usize,
    max_history: usize,
    max_history_send: usize,
}

#[derive(Debug)]
struct ChatState {
    messages: Vec<Message>,
    history: Vec<String>,
    input: String,
    sending: bool,
    /// Bumped by `reset`; replies for an older generation are discarded.
    generation: u64,
}

struct PendingSend {
    request: ChatRequest,
    generation: u64,
}

pub struct ChatCoordinator {
    backend: Arc<dyn ChatBackend>,
    identity: SessionIdentity,
    store: ScopedStore,
    limits: Limits,
    request_timeout: Duration,
    state: Mutex<ChatState>,
}

impl ChatCoordinator {
    /// Creates the coordinator and loads the account's logs once.
    pub fn new(
        backend: Arc<dyn ChatBackend>,
        identity: SessionIdentity,
        store: ScopedStore,
        config: &PlaygroundConfig,
    ) -> Self {
        let limits = Limits {
            max_messages: config.max_messages,
            max_history: config.max_history,
            max_history_send: config.max_history_send,
        };

        let messages = cap_messages(
            store.get_or_else(ScopedKey::Messages, Message::initial_log),
            limits.max_messages,
        );
        let history = normalize_history(
            store.get(ScopedKey::History, Vec::new()),
            limits.max_history,
        );

        tracing::info!(
            account = %identity.account,
            messages = messages.len(),
            history = history.len(),
            "chat session loaded"
        );

        Self {
            backend,
            identity,
            store,
            limits,
            request_timeout: config.request_timeout(),
            state: Mutex::new(ChatState {
                messages,
                history,
                input: String::new(),
                sending: false,
                generation: 0,
            }),
        }
    }

    /// Overrides the request deadline taken from the config.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn identity(&self) -> &SessionIdentity {
        &self.identity
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    fn lock(&self) -> MutexGuard<'_, ChatState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    // ============================================================================
    // Observable state
    // ============================================================================

    pub fn messages(&self) -> Vec<Message> {
        self.lock().messages.clone()
    }

    pub fn history(&self) -> Vec<String> {
        self.lock().history.clone()
    }

    /// History entries matching `query`, case-insensitively, in log order.
    pub fn filtered_history(&self, query: &str) -> Vec<String> {
        let state = self.lock();
        filter_history(&state.history, query)
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    pub fn input(&self) -> String {
        self.lock().input.clone()
    }

    pub fn state(&self) -> SendState {
        if self.lock().sending {
            SendState::Sending
        } else {
            SendState::Idle
        }
    }

    pub fn is_sending(&self) -> bool {
        self.state() == SendState::Sending
    }

    /// Whether the send action is enabled: idle and non-blank input.
    pub fn can_send(&self) -> bool {
        let state = self.lock();
        !state.sending && !state.input.trim().is_empty()
    }

    // ============================================================================
    // Input buffer and history panel
    // ============================================================================

    pub fn set_input(&self, text: impl Into<String>) {
        self.lock().input = text.into();
    }

    /// Records `text` in the prompt history.
    pub fn push_history(&self, text: &str) {
        let mut state = self.lock();
        let history = std::mem::take(&mut state.history);
        state.history = push_history(history, text, self.limits.max_history);
        self.store.set(ScopedKey::History, &state.history);
    }

    /// Saves the current input (or a placeholder when empty) to the history.
    pub fn save_input_to_history(&self) {
        let input = self.input();
        let text = if input.is_empty() {
            EMPTY_INPUT_PLACEHOLDER
        } else {
            input.as_str()
        };
        self.push_history(text);
    }

    pub fn clear_history(&self) {
        let mut state = self.lock();
        state.history.clear();
        self.store.set(ScopedKey::History, &state.history);
    }

    /// Copies entry `index` of the filtered history into the input buffer.
    pub fn recall_history(&self, query: &str, index: usize) -> Option<String> {
        let mut state = self.lock();
        let entry = filter_history(&state.history, query)
            .get(index)
            .map(|entry| entry.to_string())?;
        state.input = entry.clone();
        Some(entry)
    }

    // ============================================================================
    // Sending
    // ============================================================================

    /// Sends the current input buffer.
    pub async fn send_input(&self) -> SendOutcome {
        let input = self.input();
        self.send(&input).await
    }

    /// Sends `text` to the backend.
    ///
    /// The user message, the history entry and the cleared input are
    /// applied before the request is issued. Every failure is reported as an
    /// assistant message in the log; the coordinator is `Idle` again when
    /// this returns, and also if the returned future is dropped early.
    pub async fn send(&self, text: &str) -> SendOutcome {
        let Some(pending) = self.begin_send(text) else {
            return SendOutcome::Ignored;
        };
        let _in_flight = InFlight {
            coordinator: self,
            generation: pending.generation,
        };

        let result = self.dispatch(&pending.request).await;
        self.finish_send(pending.generation, result)
    }

    fn begin_send(&self, text: &str) -> Option<PendingSend> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        let mut state = self.lock();
        if state.sending {
            tracing::debug!("a chat request is already in flight, ignoring send");
            return None;
        }

        // Payload history is the log as it was before this message.
        let history = build_outgoing_history(&state.messages, self.limits.max_history_send);

        let messages = std::mem::take(&mut state.messages);
        state.messages = append_message(messages, Message::user(text), self.limits.max_messages);
        state.input.clear();
        state.sending = true;
        let prompts = std::mem::take(&mut state.history);
        state.history = push_history(prompts, text, self.limits.max_history);

        self.store.set(ScopedKey::Messages, &state.messages);
        self.store.set(ScopedKey::History, &state.history);

        Some(PendingSend {
            request: ChatRequest {
                message: text.to_string(),
                history,
            },
            generation: state.generation,
        })
    }

    async fn dispatch(&self, request: &ChatRequest) -> Result<ChatReply, ChatError> {
        let call = self.backend.send_chat(&self.identity, request);
        match tokio::time::timeout(self.request_timeout, call).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(timeout = ?self.request_timeout, "chat request timed out");
                Err(ChatError::Timeout(self.request_timeout))
            }
        }
    }

    fn finish_send(&self, generation: u64, result: Result<ChatReply, ChatError>) -> SendOutcome {
        let mut state = self.lock();
        if state.generation != generation {
            tracing::info!("session was reset during the request, dropping the reply");
            return SendOutcome::Discarded;
        }

        let (message, outcome) = match result {
            Ok(reply) => {
                let text = reply
                    .reply
                    .unwrap_or_else(|| NO_RESPONSE_PLACEHOLDER.to_string());
                let message = Message::assistant(text);
                (message.clone(), SendOutcome::Replied(message))
            }
            Err(err) => {
                tracing::warn!(error = %err, "chat request failed");
                (
                    Message::assistant_error(format!("Error: {err}")),
                    SendOutcome::Failed(err),
                )
            }
        };

        let messages = std::mem::take(&mut state.messages);
        state.messages = append_message(messages, message, self.limits.max_messages);
        self.store.set(ScopedKey::Messages, &state.messages);
        outcome
    }

    // ============================================================================
    // Teardown
    // ============================================================================

    /// Removes the account's persisted logs and returns the in-memory state
    /// to a fresh session. Any in-flight reply will be discarded.
    pub(crate) fn reset_after_logout(&self) {
        self.store.remove(ScopedKey::Messages);
        self.store.remove(ScopedKey::History);

        let mut state = self.lock();
        state.messages = Message::initial_log();
        state.history.clear();
        state.input.clear();
        state.sending = false;
        state.generation += 1;
    }
}

/// Returns the coordinator to `Idle` when the send completes or is dropped.
struct InFlight<'a> {
    coordinator: &'a ChatCoordinator,
    generation: u64,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        let mut state = self.coordinator.lock();
        if state.generation == self.generation {
            state.sending = false;
        }
    }
}
