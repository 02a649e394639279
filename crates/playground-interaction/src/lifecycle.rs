//! Login and logout.
//!
//! `SessionLifecycle` decides when a chat session exists: `login` writes the
//! session record, `start_session` resolves identity and mounts a
//! `ChatCoordinator`, `logout` tears the account's state down again.

use playground_core::PlaygroundConfig;
use playground_core::session::{IdentityResolver, SessionRecord, authenticate};
use playground_core::storage::{
    KeyValueStore, SESSION_RECORD_KEY, ScopedStore, TOKEN_KEY, read_json, write_json,
};
use std::sync::Arc;

use crate::backend::ChatBackend;
use crate::coordinator::ChatCoordinator;
use crate::error::{AuthError, ChatError};

/// Where the front end should go next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Login,
    Chat,
}

pub struct SessionLifecycle {
    /// Durable medium (local storage).
    store: Arc<dyn KeyValueStore>,
    /// Per-run medium (session storage), wiped on logout.
    session_store: Arc<dyn KeyValueStore>,
    backend: Arc<dyn ChatBackend>,
    config: PlaygroundConfig,
}

impl SessionLifecycle {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        session_store: Arc<dyn KeyValueStore>,
        backend: Arc<dyn ChatBackend>,
        config: PlaygroundConfig,
    ) -> Self {
        Self {
            store,
            session_store,
            backend,
            config,
        }
    }

    pub fn config(&self) -> &PlaygroundConfig {
        &self.config
    }

    /// The stored login record, if it decodes.
    pub fn current_record(&self) -> Option<SessionRecord> {
        read_json(self.store.as_ref(), SESSION_RECORD_KEY)
    }

    /// The view to show on startup.
    pub fn initial_view(&self) -> View {
        if self.current_record().is_some() {
            View::Chat
        } else {
            View::Login
        }
    }

    /// Checks the credentials against the allow-list and stores the record.
    ///
    /// Nothing is written when the credentials do not match.
    pub fn login(&self, email: &str, password: &str) -> Result<View, AuthError> {
        let Some(record) = authenticate(email, password) else {
            tracing::info!(email, "login rejected");
            return Err(AuthError::InvalidCredentials);
        };

        write_json(self.store.as_ref(), SESSION_RECORD_KEY, &record)?;
        tracing::info!(email = %record.email, role = %record.role, "logged in");
        Ok(View::Chat)
    }

    /// Resolves the session identity and mounts a chat coordinator for it.
    pub fn start_session(&self) -> ChatCoordinator {
        let resolver = IdentityResolver::new(self.store.clone(), self.config.storage_prefix.clone());
        let identity = resolver.resolve();
        let scoped = ScopedStore::new(
            self.store.clone(),
            self.config.storage_prefix.clone(),
            identity.account.clone(),
        );
        ChatCoordinator::new(self.backend.clone(), identity, scoped, &self.config)
    }

    /// Logs out of `chat`'s account.
    ///
    /// Local cleanup happens first and unconditionally; the server is then
    /// notified on a best-effort basis, bounded by the request timeout, and
    /// any failure is only logged.
    pub async fn logout(&self, chat: &ChatCoordinator) -> View {
        chat.reset_after_logout();
        self.clear_ambient_storage();
        tracing::info!(account = %chat.identity().account, "logged out");

        let notify = self.backend.notify_reset(chat.identity());
        let result = match tokio::time::timeout(chat.request_timeout(), notify).await {
            Ok(result) => result,
            Err(_) => Err(ChatError::Timeout(chat.request_timeout())),
        };
        if let Err(err) = result {
            tracing::warn!(error = %err, "reset notification failed, ignoring");
        }

        View::Login
    }

    fn clear_ambient_storage(&self) {
        for key in [TOKEN_KEY, SESSION_RECORD_KEY] {
            if let Err(err) = self.store.remove(key) {
                tracing::warn!(key, error = %err, "failed to remove stored value");
            }
        }
        if let Err(err) = self.session_store.clear() {
            tracing::warn!(error = %err, "failed to clear session storage");
        }
    }
}
