//! Key/value persistence and its account-scoped view.
//!
//! # Key layout
//!
//! ```text
//! user                              # SessionRecord (unscoped)
//! token                             # ambient auth token (unscoped)
//! {prefix}:{email}:user_id          # UserInstanceId
//! {prefix}:{email}:messages         # Vec<Message>
//! {prefix}:{email}:history          # Vec<String>, most recent first
//! ```
//!
//! All values are JSON text.

mod scoped;

pub use scoped::{ScopedKey, ScopedStore};

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::Result;

/// Key of the persisted login record.
pub const SESSION_RECORD_KEY: &str = "user";
/// Key of the ambient auth token cleared on logout.
pub const TOKEN_KEY: &str = "token";

/// A durable string-to-string medium, the moral equivalent of browser
/// local storage.
///
/// Implementations report failures; callers that must not fail (the scoped
/// store, identity resolution) decide how to degrade.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&self, key: &str, value: &str) -> Result<()>;

    fn remove(&self, key: &str) -> Result<()>;

    /// Removes every key.
    fn clear(&self) -> Result<()>;
}

/// Reads and decodes a JSON value, failing closed.
///
/// Missing keys, read errors and undecodable values all yield `None`.
pub fn read_json<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Option<T> {
    let raw = match store.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(err) => {
            tracing::warn!(key, error = %err, "storage read failed");
            return None;
        }
    };

    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(err) => {
            tracing::warn!(key, error = %err, "ignoring undecodable stored value");
            None
        }
    }
}

/// Encodes and writes a JSON value.
pub fn write_json<T: Serialize + ?Sized>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<()> {
    let raw = serde_json::to_string(value)?;
    store.set(key, &raw)
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::error::PlaygroundError;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Minimal in-crate store; the real implementations live in
    /// `playground-infrastructure`.
    #[derive(Default)]
    pub struct TestStore {
        pub entries: Mutex<HashMap<String, String>>,
        pub fail_writes: bool,
    }

    impl TestStore {
        pub fn failing_writes() -> Self {
            Self {
                fail_writes: true,
                ..Self::default()
            }
        }

        pub fn raw(&self, key: &str) -> Option<String> {
            self.entries.lock().unwrap().get(key).cloned()
        }

        pub fn put_raw(&self, key: &str, value: &str) {
            self.entries
                .lock()
                .unwrap()
                .insert(key.to_string(), value.to_string());
        }
    }

    impl KeyValueStore for TestStore {
        fn get(&self, key: &str) -> Result<Option<String>> {
            Ok(self.raw(key))
        }

        fn set(&self, key: &str, value: &str) -> Result<()> {
            if self.fail_writes {
                return Err(PlaygroundError::storage("quota exceeded"));
            }
            self.put_raw(key, value);
            Ok(())
        }

        fn remove(&self, key: &str) -> Result<()> {
            self.entries.lock().unwrap().remove(key);
            Ok(())
        }

        fn clear(&self) -> Result<()> {
            self.entries.lock().unwrap().clear();
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::TestStore;
    use super::*;
    use crate::session::SessionRecord;

    #[test]
    fn test_read_json_fails_closed_on_garbage() {
        let store = TestStore::default();
        store.put_raw(SESSION_RECORD_KEY, "{\"email\":");

        let record: Option<SessionRecord> = read_json(&store, SESSION_RECORD_KEY);
        assert!(record.is_none());
    }

    #[test]
    fn test_write_then_read_json() {
        let store = TestStore::default();
        let record = SessionRecord {
            email: "admin@admin".to_string(),
            role: "admin".to_string(),
        };
        write_json(&store, SESSION_RECORD_KEY, &record).unwrap();

        let loaded: Option<SessionRecord> = read_json(&store, SESSION_RECORD_KEY);
        assert_eq!(loaded, Some(record));
    }
}
